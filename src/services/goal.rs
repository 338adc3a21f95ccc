//! Savings goals and their deposit ledger.
//!
//! DESIGN
//! ======
//! `current_cents` is a cached sum of the goal's ledger. Every movement
//! inserts a ledger row and adjusts the cache in one DB transaction, with the
//! non-negative check done by the `UPDATE` itself so concurrent withdrawals
//! cannot overdraw a goal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::finance::goals::{GoalProgress, goal_progress};

pub const DEPOSIT_DESCRIPTION: &str = "Aporte na meta";
pub const WITHDRAWAL_DESCRIPTION: &str = "Retirada da meta";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("goal not found: {0}")]
    NotFound(Uuid),
    #[error("goal name must not be empty")]
    EmptyName,
    #[error("target must be positive")]
    InvalidTarget,
    #[error("deadline is required")]
    MissingDeadline,
    #[error("amount must not be zero")]
    ZeroAmount,
    #[error("withdrawal of {requested} exceeds the {available} saved")]
    InsufficientFunds { requested: i64, available: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for GoalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_GOAL_NOT_FOUND",
            Self::EmptyName => "E_INVALID_NAME",
            Self::InvalidTarget => "E_INVALID_TARGET",
            Self::MissingDeadline => "E_MISSING_DEADLINE",
            Self::ZeroAmount => "E_INVALID_AMOUNT",
            Self::InsufficientFunds { .. } => "E_INSUFFICIENT_FUNDS",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// A web page cited by an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalRow {
    pub id: Uuid,
    pub name: String,
    pub target_cents: i64,
    pub current_cents: i64,
    pub deadline: NaiveDate,
    pub creation_date: NaiveDate,
    pub icon: String,
    pub custom_icon: Option<String>,
    pub is_ai_generated: bool,
    pub ai_breakdown: Option<String>,
    pub ai_sources: Vec<GoalSource>,
}

impl GoalRow {
    #[must_use]
    pub fn progress(&self, today: NaiveDate) -> GoalProgress {
        goal_progress(self.target_cents, self.current_cents, self.creation_date, self.deadline, today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct GoalTransactionRow {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub description: String,
}

/// Fields set on create. Updates only touch name, target, deadline and icons.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoalInput {
    pub name: String,
    pub target_cents: i64,
    pub deadline: Option<NaiveDate>,
    pub icon: String,
    pub custom_icon: Option<String>,
    pub is_ai_generated: bool,
    pub ai_breakdown: Option<String>,
    pub ai_sources: Vec<GoalSource>,
}

impl GoalInput {
    fn validate(&self) -> Result<(&str, NaiveDate), GoalError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(GoalError::EmptyName);
        }
        if self.target_cents <= 0 {
            return Err(GoalError::InvalidTarget);
        }
        let deadline = self.deadline.ok_or(GoalError::MissingDeadline)?;
        Ok((name, deadline))
    }
}

const SELECT_COLUMNS: &str = "id, name, target_cents, current_cents, deadline, creation_date, icon, custom_icon,
        is_ai_generated, ai_breakdown, ai_sources";

fn goal_from_row(row: &PgRow) -> GoalRow {
    let sources: Json<Vec<GoalSource>> = row.get("ai_sources");
    GoalRow {
        id: row.get("id"),
        name: row.get("name"),
        target_cents: row.get("target_cents"),
        current_cents: row.get("current_cents"),
        deadline: row.get("deadline"),
        creation_date: row.get("creation_date"),
        icon: row.get("icon"),
        custom_icon: row.get("custom_icon"),
        is_ai_generated: row.get("is_ai_generated"),
        ai_breakdown: row.get("ai_breakdown"),
        ai_sources: sources.0,
    }
}

/// Ledger description, defaulting by direction when blank.
fn movement_description(amount_cents: i64, description: &str) -> String {
    let trimmed = description.trim();
    if !trimmed.is_empty() {
        trimmed.to_owned()
    } else if amount_cents > 0 {
        DEPOSIT_DESCRIPTION.to_owned()
    } else {
        WITHDRAWAL_DESCRIPTION.to_owned()
    }
}

// =============================================================================
// CRUD
// =============================================================================

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_goals(pool: &PgPool, user_id: Uuid) -> Result<Vec<GoalRow>, GoalError> {
    let rows = sqlx::query(&format!(
        "SELECT {SELECT_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY deadline, created_at"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(goal_from_row).collect())
}

/// Create a goal starting at zero saved.
///
/// # Errors
///
/// Returns a validation error or a database error if the insert fails.
pub async fn create_goal(pool: &PgPool, user_id: Uuid, input: &GoalInput, today: NaiveDate) -> Result<GoalRow, GoalError> {
    let (name, deadline) = input.validate()?;
    let row = sqlx::query(&format!(
        "INSERT INTO goals (user_id, name, target_cents, deadline, creation_date, icon, custom_icon,
                            is_ai_generated, ai_breakdown, ai_sources)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(name)
    .bind(input.target_cents)
    .bind(deadline)
    .bind(today)
    .bind(&input.icon)
    .bind(&input.custom_icon)
    .bind(input.is_ai_generated)
    .bind(&input.ai_breakdown)
    .bind(Json(&input.ai_sources))
    .fetch_one(pool)
    .await?;
    Ok(goal_from_row(&row))
}

/// # Errors
///
/// Returns `NotFound` when the goal does not belong to the user.
pub async fn update_goal(pool: &PgPool, user_id: Uuid, id: Uuid, input: &GoalInput) -> Result<GoalRow, GoalError> {
    let (name, deadline) = input.validate()?;
    let row = sqlx::query(&format!(
        "UPDATE goals
         SET name = $3, target_cents = $4, deadline = $5, icon = $6, custom_icon = $7
         WHERE id = $1 AND user_id = $2
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(input.target_cents)
    .bind(deadline)
    .bind(&input.icon)
    .bind(&input.custom_icon)
    .fetch_optional(pool)
    .await?
    .ok_or(GoalError::NotFound(id))?;
    Ok(goal_from_row(&row))
}

/// Delete a goal and, by cascade, its ledger.
///
/// # Errors
///
/// Returns `NotFound` when the goal does not belong to the user.
pub async fn delete_goal(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), GoalError> {
    let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(GoalError::NotFound(id));
    }
    Ok(())
}

// =============================================================================
// LEDGER
// =============================================================================

/// Deposit (positive) or withdraw (negative) from a goal.
///
/// # Errors
///
/// Returns `ZeroAmount`, `InsufficientFunds` when a withdrawal exceeds the
/// saved amount, or `NotFound`.
pub async fn add_value(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    amount_cents: i64,
    description: &str,
    today: NaiveDate,
) -> Result<(GoalRow, GoalTransactionRow), GoalError> {
    if amount_cents == 0 {
        return Err(GoalError::ZeroAmount);
    }

    let mut tx = pool.begin().await?;
    let updated = sqlx::query(&format!(
        "UPDATE goals
         SET current_cents = current_cents + $3
         WHERE id = $1 AND user_id = $2 AND current_cents + $3 >= 0
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(goal_id)
    .bind(user_id)
    .bind(amount_cents)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(goal_row) = updated else {
        let available: Option<i64> = sqlx::query_scalar("SELECT current_cents FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        return Err(match available {
            Some(available) => GoalError::InsufficientFunds { requested: -amount_cents, available },
            None => GoalError::NotFound(goal_id),
        });
    };

    let entry = sqlx::query_as::<_, GoalTransactionRow>(
        "INSERT INTO goal_transactions (goal_id, user_id, amount_cents, date, description)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, goal_id, amount_cents, date, description",
    )
    .bind(goal_id)
    .bind(user_id)
    .bind(amount_cents)
    .bind(today)
    .bind(movement_description(amount_cents, description))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(%user_id, %goal_id, amount_cents, "goal balance moved");
    Ok((goal_from_row(&goal_row), entry))
}

/// Ledger rows for the user's goals, newest first; one goal when `goal_id` is set.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_goal_transactions(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Option<Uuid>,
) -> Result<Vec<GoalTransactionRow>, GoalError> {
    let rows = sqlx::query_as::<_, GoalTransactionRow>(
        "SELECT id, goal_id, amount_cents, date, description
         FROM goal_transactions
         WHERE user_id = $1 AND ($2::uuid IS NULL OR goal_id = $2)
         ORDER BY date DESC, created_at DESC",
    )
    .bind(user_id)
    .bind(goal_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
#[path = "goal_test.rs"]
mod tests;
