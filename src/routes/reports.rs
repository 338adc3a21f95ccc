//! Read-only figures computed from the ledger: dashboard, projection,
//! period reports and credit-card bill tools.
//!
//! DESIGN
//! ======
//! Every handler loads the user's ledger and settings once and hands them to
//! the pure functions in `finance`. Nothing here writes except the bill
//! adjustment, which inserts one fee transaction.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::settings::settings_error_to_status;
use super::today;
use super::transactions::transaction_error_to_status;
use crate::finance::balance::{total_balance, total_invested};
use crate::finance::billing::{BillReconciliation, StatementHint, billing_hint};
use crate::finance::calendar::{month_end, month_start_offset};
use crate::finance::dashboard::{DashboardSummary, dashboard};
use crate::finance::projection::{DEFAULT_PROJECTION_MONTHS, Projection, project};
use crate::finance::report::{
    CategoryTotal, DateRange, EvolutionPoint, Granularity, NetWorthPoint, SortDirection, SortKey, category_summary,
    evolution, net_worth,
};
use crate::finance::{Entry, LedgerSettings, TransactionKind};
use crate::routes::auth::AuthUser;
use crate::routes::categories::category_error_to_status;
use crate::services::category;
use crate::services::settings;
use crate::services::transaction::{self, TransactionRow};
use crate::state::AppState;

/// Months covered by a report when no range is given, the current one included.
const DEFAULT_REPORT_MONTHS: i32 = 6;

async fn load_ledger(state: &AppState, user_id: Uuid) -> Result<(Vec<Entry>, LedgerSettings), StatusCode> {
    let settings = settings::get_settings(&state.pool, user_id)
        .await
        .map_err(settings_error_to_status)?;
    let entries = transaction::ledger(&state.pool, user_id)
        .await
        .map_err(transaction_error_to_status)?;
    Ok((entries, settings))
}

// =============================================================================
// DASHBOARD & PROJECTION
// =============================================================================

/// `GET /api/dashboard`
pub async fn get_dashboard(State(state): State<AppState>, auth: AuthUser) -> Result<Json<DashboardSummary>, StatusCode> {
    let (entries, settings) = load_ledger(&state, auth.user.id).await?;
    Ok(Json(dashboard(&entries, &settings, today())))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectionQuery {
    pub months: Option<u32>,
}

/// `GET /api/projection?months=12`
pub async fn get_projection(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<Projection>, StatusCode> {
    let (entries, settings) = load_ledger(&state, auth.user.id).await?;
    let today = today();
    let balance = total_balance(&entries, &settings, today);
    let invested = total_invested(&entries, settings.initial_investment_cents, today);
    let months = query.months.unwrap_or(DEFAULT_PROJECTION_MONTHS);
    Ok(Json(project(&entries, balance, invested, settings.card_closing_day, today, months)))
}

// =============================================================================
// REPORTS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub accumulated: bool,
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl ReportQuery {
    /// Defaults to the last six months through the end of this one.
    pub(crate) fn range(&self, today: NaiveDate) -> Result<DateRange, StatusCode> {
        let start = self.start.unwrap_or_else(|| month_start_offset(today, 1 - DEFAULT_REPORT_MONTHS));
        let end = self.end.unwrap_or_else(|| month_end(today));
        if end < start {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(DateRange { start, end })
    }
}

/// `GET /api/reports/evolution`
pub async fn get_evolution(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<EvolutionPoint>>, StatusCode> {
    let range = query.range(today())?;
    let (entries, settings) = load_ledger(&state, auth.user.id).await?;
    Ok(Json(evolution(&entries, range, query.granularity, query.accumulated, settings.card_closing_day)))
}

/// `GET /api/reports/net-worth`
pub async fn get_net_worth(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<NetWorthPoint>>, StatusCode> {
    let range = query.range(today())?;
    let (entries, settings) = load_ledger(&state, auth.user.id).await?;
    Ok(Json(net_worth(
        &entries,
        settings.initial_balance_cents,
        range,
        query.granularity,
        settings.card_closing_day,
    )))
}

/// `GET /api/reports/categories?kind=expense&sort=value&direction=desc`
pub async fn get_category_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<CategoryTotal>>, StatusCode> {
    let range = query.range(today())?;
    let (entries, settings) = load_ledger(&state, auth.user.id).await?;
    let names = category::category_names(&state.pool, auth.user.id)
        .await
        .map_err(category_error_to_status)?;
    let kind = query.kind.unwrap_or(TransactionKind::Expense);
    Ok(Json(category_summary(
        &entries,
        &names,
        range,
        kind,
        (query.sort, query.direction),
        settings.card_closing_day,
    )))
}

// =============================================================================
// CREDIT-CARD BILL
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct HintResponse {
    pub date: NaiveDate,
    pub statement: StatementHint,
}

/// `GET /api/billing/hint?date=2025-06-26` — which statement a card purchase lands on.
pub async fn get_billing_hint(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HintQuery>,
) -> Result<Json<HintResponse>, StatusCode> {
    let settings = settings::get_settings(&state.pool, auth.user.id)
        .await
        .map_err(settings_error_to_status)?;
    let date = query.date.unwrap_or_else(today);
    Ok(Json(HintResponse { date, statement: billing_hint(date, settings.card_closing_day) }))
}

#[derive(Debug, Deserialize)]
pub struct BillBody {
    pub payment_date: NaiveDate,
    pub paid_cents: i64,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// `POST /api/billing/reconcile` — compare a bill payment with the statement.
pub async fn reconcile_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BillBody>,
) -> Result<Json<BillReconciliation>, StatusCode> {
    let settings = settings::get_settings(&state.pool, auth.user.id)
        .await
        .map_err(settings_error_to_status)?;
    let reconciliation = transaction::reconcile_payment(
        &state.pool,
        auth.user.id,
        body.payment_date,
        body.paid_cents,
        settings.card_closing_day,
    )
    .await
    .map_err(transaction_error_to_status)?;
    Ok(Json(reconciliation))
}

/// `POST /api/billing/adjustment` — book the overpaid part of a bill as fees.
pub async fn create_bill_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BillBody>,
) -> Result<(StatusCode, Json<TransactionRow>), StatusCode> {
    let settings = settings::get_settings(&state.pool, auth.user.id)
        .await
        .map_err(settings_error_to_status)?;
    let row = transaction::create_bill_adjustment(
        &state.pool,
        auth.user.id,
        body.payment_date,
        body.paid_cents,
        body.payment_method,
        settings.card_closing_day,
        today(),
    )
    .await
    .map_err(transaction_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;
