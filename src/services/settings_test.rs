use super::*;

#[test]
fn closing_day_bounds() {
    assert_eq!(validate_closing_day(1).unwrap(), 1);
    assert_eq!(validate_closing_day(28).unwrap(), 28);
    assert!(matches!(validate_closing_day(0), Err(SettingsError::InvalidClosingDay(0))));
    assert!(matches!(validate_closing_day(29), Err(SettingsError::InvalidClosingDay(29))));
    assert!(matches!(validate_closing_day(31), Err(SettingsError::InvalidClosingDay(31))));
    assert!(matches!(validate_closing_day(u32::MAX), Err(SettingsError::InvalidClosingDay(_))));
}

#[test]
fn error_code() {
    assert_eq!(SettingsError::InvalidClosingDay(40).error_code(), "E_INVALID_CLOSING_DAY");
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn settings_default_then_persist_then_reset() {
    let pool = crate::db::integration_pool().await;
    let user_id = crate::db::seed_user(&pool, "settings@example.com").await;

    assert_eq!(get_settings(&pool, user_id).await.expect("get"), LedgerSettings::default());

    set_initial_balances(&pool, user_id, 10_000, 5_000).await.expect("balances");
    let saved = set_card_closing_day(&pool, user_id, 10).await.expect("closing day");
    assert_eq!(saved.initial_balance_cents, 10_000);
    assert_eq!(saved.initial_investment_cents, 5_000);
    assert_eq!(saved.card_closing_day, 10);

    reset_all(&pool, user_id).await.expect("reset");
    assert_eq!(get_settings(&pool, user_id).await.expect("get"), LedgerSettings::default());
}
