//! Goal routes — CRUD, deposits and withdrawals, and the goal ledger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::today;
use crate::finance::goals::GoalProgress;
use crate::routes::auth::AuthUser;
use crate::services::goal::{self, GoalError, GoalInput, GoalRow, GoalTransactionRow};
use crate::state::AppState;

/// A goal with its progress as of today.
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: GoalRow,
    pub progress: GoalProgress,
}

fn to_response(goal: GoalRow) -> GoalResponse {
    let progress = goal.progress(today());
    GoalResponse { goal, progress }
}

/// `GET /api/goals` — ordered by deadline.
pub async fn list_goals(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<GoalResponse>>, StatusCode> {
    let rows = goal::list_goals(&state.pool, auth.user.id)
        .await
        .map_err(goal_error_to_status)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// `POST /api/goals`
pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GoalInput>,
) -> Result<(StatusCode, Json<GoalResponse>), StatusCode> {
    let row = goal::create_goal(&state.pool, auth.user.id, &input, today())
        .await
        .map_err(goal_error_to_status)?;
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

/// `PUT /api/goals/:id`
pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<GoalInput>,
) -> Result<Json<GoalResponse>, StatusCode> {
    let row = goal::update_goal(&state.pool, auth.user.id, id, &input)
        .await
        .map_err(goal_error_to_status)?;
    Ok(Json(to_response(row)))
}

/// `DELETE /api/goals/:id` — the goal's ledger goes with it.
pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    goal::delete_goal(&state.pool, auth.user.id, id)
        .await
        .map_err(goal_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct AddValueBody {
    /// Negative for a withdrawal.
    pub amount_cents: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize)]
pub struct AddValueResponse {
    pub goal: GoalResponse,
    pub entry: GoalTransactionRow,
}

/// `POST /api/goals/:id/values`
pub async fn add_value(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddValueBody>,
) -> Result<Json<AddValueResponse>, StatusCode> {
    let (row, entry) = goal::add_value(&state.pool, auth.user.id, id, body.amount_cents, &body.description, today())
        .await
        .map_err(goal_error_to_status)?;
    Ok(Json(AddValueResponse { goal: to_response(row), entry }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    pub goal_id: Option<Uuid>,
}

/// `GET /api/goal-transactions?goal_id=..` — newest first.
pub async fn list_goal_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<GoalTransactionRow>>, StatusCode> {
    let rows = goal::list_goal_transactions(&state.pool, auth.user.id, query.goal_id)
        .await
        .map_err(goal_error_to_status)?;
    Ok(Json(rows))
}

pub(crate) fn goal_error_to_status(err: GoalError) -> StatusCode {
    match err {
        GoalError::NotFound(_) => StatusCode::NOT_FOUND,
        GoalError::EmptyName | GoalError::InvalidTarget | GoalError::MissingDeadline | GoalError::ZeroAmount => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GoalError::InsufficientFunds { .. } => StatusCode::CONFLICT,
        GoalError::Database(e) => {
            tracing::error!(error = %e, "goal query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "goals_test.rs"]
mod tests;
