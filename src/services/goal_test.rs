use super::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
}

fn input() -> GoalInput {
    GoalInput { name: " Viagem ".into(), target_cents: 500_000, deadline: Some(d(2026, 1, 1)), ..GoalInput::default() }
}

#[test]
fn validate_trims_name_and_requires_fields() {
    let input = input();
    let (name, deadline) = input.validate().unwrap();
    assert_eq!(name, "Viagem");
    assert_eq!(deadline, d(2026, 1, 1));

    assert!(matches!(GoalInput { name: "".into(), ..self::input() }.validate(), Err(GoalError::EmptyName)));
    assert!(matches!(GoalInput { target_cents: 0, ..self::input() }.validate(), Err(GoalError::InvalidTarget)));
    assert!(matches!(GoalInput { deadline: None, ..self::input() }.validate(), Err(GoalError::MissingDeadline)));
}

#[test]
fn blank_descriptions_default_by_direction() {
    assert_eq!(movement_description(100, "  "), DEPOSIT_DESCRIPTION);
    assert_eq!(movement_description(-100, ""), WITHDRAWAL_DESCRIPTION);
    assert_eq!(movement_description(-100, " resgate "), "resgate");
}

#[test]
fn input_accepts_sources() {
    let parsed: GoalInput = serde_json::from_value(serde_json::json!({
        "name": "Carro",
        "target_cents": 1_000_000,
        "deadline": "2027-06-30",
        "is_ai_generated": true,
        "ai_sources": [{"title": "Tabela FIPE", "uri": "https://example.com"}]
    }))
    .unwrap();
    assert!(parsed.is_ai_generated);
    assert_eq!(parsed.ai_sources.len(), 1);
}

#[test]
fn progress_uses_row_fields() {
    let goal = GoalRow {
        id: Uuid::nil(),
        name: "Reserva".into(),
        target_cents: 1_000,
        current_cents: 250,
        deadline: d(2025, 12, 31),
        creation_date: d(2025, 1, 1),
        icon: String::new(),
        custom_icon: None,
        is_ai_generated: false,
        ai_breakdown: None,
        ai_sources: Vec::new(),
    };
    let p = goal.progress(d(2025, 6, 1));
    assert!((p.progress_pct - 25.0).abs() < 1e-9);
    assert_eq!(p.remaining_cents, 750);
    assert!(!p.completed);
}

#[test]
fn insufficient_funds_code() {
    let err = GoalError::InsufficientFunds { requested: 10, available: 5 };
    assert_eq!(err.error_code(), "E_INSUFFICIENT_FUNDS");
    assert!(err.to_string().contains("exceeds"));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn add_value_keeps_cache_equal_to_ledger() {
    let pool = crate::db::integration_pool().await;
    let user_id = crate::db::seed_user(&pool, "goal@example.com").await;
    let today = d(2025, 6, 1);
    let goal = create_goal(&pool, user_id, &input(), today).await.expect("create goal");
    assert_eq!(goal.current_cents, 0);

    let (after_deposit, entry) = add_value(&pool, user_id, goal.id, 30_000, "", today).await.expect("deposit");
    assert_eq!(after_deposit.current_cents, 30_000);
    assert_eq!(entry.description, DEPOSIT_DESCRIPTION);

    let overdraw = add_value(&pool, user_id, goal.id, -40_000, "", today).await;
    assert!(matches!(overdraw, Err(GoalError::InsufficientFunds { available: 30_000, .. })));

    let (after_withdrawal, _) = add_value(&pool, user_id, goal.id, -10_000, "", today).await.expect("withdraw");
    assert_eq!(after_withdrawal.current_cents, 20_000);

    let ledger = list_goal_transactions(&pool, user_id, Some(goal.id)).await.expect("ledger");
    assert_eq!(ledger.iter().map(|t| t.amount_cents).sum::<i64>(), 20_000);

    assert!(matches!(add_value(&pool, user_id, goal.id, 0, "", today).await, Err(GoalError::ZeroAmount)));
    delete_goal(&pool, user_id, goal.id).await.expect("delete");
    assert!(list_goal_transactions(&pool, user_id, None).await.expect("ledger").is_empty());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn sources_are_stored_and_read_back() {
    let pool = crate::db::integration_pool().await;
    let user_id = crate::db::seed_user(&pool, "goal-sources@example.com").await;
    let sources = vec![GoalSource { title: "Tabela FIPE".into(), uri: "https://example.com/fipe".into() }];
    let goal_input = GoalInput { is_ai_generated: true, ai_sources: sources.clone(), ..input() };
    let created = create_goal(&pool, user_id, &goal_input, d(2025, 6, 1)).await.expect("create goal");
    assert_eq!(created.ai_sources, sources);

    let listed = list_goals(&pool, user_id).await.expect("list goals");
    let stored = listed.iter().find(|g| g.id == created.id).expect("goal listed");
    assert_eq!(stored.ai_sources, sources);
}
