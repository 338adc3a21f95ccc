//! Transaction routes — list, create, edit and delete, with series handling.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::today;
use crate::finance::filter::PeriodFilter;
use crate::routes::auth::AuthUser;
use crate::services::transaction::{self, TransactionError, TransactionInput, TransactionRow};
use crate::state::AppState;

/// `?period=current_month|next_month|six_months|all|custom&start=..&end=..&q=..`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub period: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub q: Option<String>,
}

impl ListQuery {
    /// An unknown period, or `custom` without both bounds, is a bad request.
    pub(crate) fn period_filter(&self) -> Option<PeriodFilter> {
        match self.period.as_deref().map(str::trim) {
            None | Some("" | "current_month") => Some(PeriodFilter::CurrentMonth),
            Some("next_month") => Some(PeriodFilter::NextMonth),
            Some("six_months") => Some(PeriodFilter::SixMonths),
            Some("all") => Some(PeriodFilter::All),
            Some("custom") => Some(PeriodFilter::Custom { start: self.start?, end: self.end? }),
            Some(_) => None,
        }
    }
}

/// `GET /api/transactions` — filtered list, newest first.
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TransactionRow>>, StatusCode> {
    let period = query.period_filter().ok_or(StatusCode::BAD_REQUEST)?;
    let rows = transaction::list_transactions(&state.pool, auth.user.id, period, query.q.as_deref(), today())
        .await
        .map_err(transaction_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/transactions/:id`
pub async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionRow>, StatusCode> {
    let row = transaction::get_transaction(&state.pool, auth.user.id, id)
        .await
        .map_err(transaction_error_to_status)?;
    Ok(Json(row))
}

/// `POST /api/transactions` — returns every inserted row (one per occurrence).
pub async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Vec<TransactionRow>>), StatusCode> {
    let rows = transaction::create_transaction(&state.pool, auth.user.id, &input)
        .await
        .map_err(transaction_error_to_status)?;
    Ok((StatusCode::CREATED, Json(rows)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    #[serde(default)]
    pub apply_to_future: bool,
}

/// `PUT /api/transactions/:id?apply_to_future=true`
pub async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<UpdateQuery>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<TransactionRow>, StatusCode> {
    let row = transaction::update_transaction(&state.pool, auth.user.id, id, &input, query.apply_to_future)
        .await
        .map_err(transaction_error_to_status)?;
    Ok(Json(row))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub delete_all_future: bool,
}

/// `DELETE /api/transactions/:id?delete_all_future=true`
pub async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let deleted = transaction::delete_transaction(&state.pool, auth.user.id, id, query.delete_all_future)
        .await
        .map_err(transaction_error_to_status)?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

pub(crate) fn transaction_error_to_status(err: TransactionError) -> StatusCode {
    match err {
        TransactionError::NotFound(_) => StatusCode::NOT_FOUND,
        TransactionError::InvalidAmount
        | TransactionError::EmptyDescription
        | TransactionError::IncompleteRecurrence
        | TransactionError::EndBeforeStart { .. }
        | TransactionError::UnknownCategory(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TransactionError::NoSurplus => StatusCode::CONFLICT,
        TransactionError::InvalidRow(e) => {
            tracing::error!(error = %e, "stored transaction is malformed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        TransactionError::Database(e) => {
            tracing::error!(error = %e, "transaction query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "transactions_test.rs"]
mod tests;
