//! Per-user settings: opening balances and the card closing day.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::finance::LedgerSettings;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("closing day must be between 1 and 28, got {0}")]
    InvalidClosingDay(u32),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidClosingDay(_) => "E_INVALID_CLOSING_DAY",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// Later days would fall past the end of February.
const MAX_CLOSING_DAY: i32 = 28;

fn validate_closing_day(day: u32) -> Result<i32, SettingsError> {
    match i32::try_from(day) {
        Ok(d @ 1..=MAX_CLOSING_DAY) => Ok(d),
        _ => Err(SettingsError::InvalidClosingDay(day)),
    }
}

/// Stored settings, or the defaults for a user who never saved any.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_settings(pool: &PgPool, user_id: Uuid) -> Result<LedgerSettings, SettingsError> {
    let row = sqlx::query(
        "SELECT initial_balance_cents, initial_investment_cents, card_closing_day
         FROM user_settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map_or_else(LedgerSettings::default, |r| {
        let day: i32 = r.get("card_closing_day");
        LedgerSettings {
            initial_balance_cents: r.get("initial_balance_cents"),
            initial_investment_cents: r.get("initial_investment_cents"),
            card_closing_day: u32::try_from(day).unwrap_or(crate::finance::DEFAULT_CARD_CLOSING_DAY),
        }
    }))
}

/// # Errors
///
/// Returns a database error if the upsert fails.
pub async fn set_initial_balances(
    pool: &PgPool,
    user_id: Uuid,
    initial_balance_cents: i64,
    initial_investment_cents: i64,
) -> Result<LedgerSettings, SettingsError> {
    sqlx::query(
        "INSERT INTO user_settings (user_id, initial_balance_cents, initial_investment_cents)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) DO UPDATE
         SET initial_balance_cents = EXCLUDED.initial_balance_cents,
             initial_investment_cents = EXCLUDED.initial_investment_cents,
             updated_at = now()",
    )
    .bind(user_id)
    .bind(initial_balance_cents)
    .bind(initial_investment_cents)
    .execute(pool)
    .await?;
    get_settings(pool, user_id).await
}

/// # Errors
///
/// Returns `InvalidClosingDay` outside `1..=28`.
pub async fn set_card_closing_day(pool: &PgPool, user_id: Uuid, day: u32) -> Result<LedgerSettings, SettingsError> {
    let day = validate_closing_day(day)?;
    sqlx::query(
        "INSERT INTO user_settings (user_id, card_closing_day)
         VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE
         SET card_closing_day = EXCLUDED.card_closing_day, updated_at = now()",
    )
    .bind(user_id)
    .bind(day)
    .execute(pool)
    .await?;
    get_settings(pool, user_id).await
}

/// Delete every row the user owns except the account and its sessions.
///
/// # Errors
///
/// Returns a database error; nothing is deleted when any statement fails.
pub async fn reset_all(pool: &PgPool, user_id: Uuid) -> Result<(), SettingsError> {
    let mut tx = pool.begin().await?;
    for table in ["goal_transactions", "goals", "transactions", "categories", "payment_methods", "user_settings"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::warn!(%user_id, "all user data reset");
    Ok(())
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
