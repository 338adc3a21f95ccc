//! Settings routes — initial balances, card closing day, full reset.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::finance::LedgerSettings;
use crate::routes::auth::AuthUser;
use crate::services::settings::{self, SettingsError};
use crate::state::AppState;

/// `GET /api/settings`
pub async fn get_settings(State(state): State<AppState>, auth: AuthUser) -> Result<Json<LedgerSettings>, StatusCode> {
    let settings = settings::get_settings(&state.pool, auth.user.id)
        .await
        .map_err(settings_error_to_status)?;
    Ok(Json(settings))
}

#[derive(Deserialize)]
pub struct BalancesBody {
    pub initial_balance_cents: i64,
    pub initial_investment_cents: i64,
}

/// `PUT /api/settings/balances`
pub async fn set_initial_balances(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BalancesBody>,
) -> Result<Json<LedgerSettings>, StatusCode> {
    let settings = settings::set_initial_balances(
        &state.pool,
        auth.user.id,
        body.initial_balance_cents,
        body.initial_investment_cents,
    )
    .await
    .map_err(settings_error_to_status)?;
    Ok(Json(settings))
}

#[derive(Deserialize)]
pub struct ClosingDayBody {
    pub card_closing_day: u32,
}

/// `PUT /api/settings/closing-day`
pub async fn set_card_closing_day(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ClosingDayBody>,
) -> Result<Json<LedgerSettings>, StatusCode> {
    let settings = settings::set_card_closing_day(&state.pool, auth.user.id, body.card_closing_day)
        .await
        .map_err(settings_error_to_status)?;
    Ok(Json(settings))
}

/// `POST /api/settings/reset` — delete every transaction, goal, category,
/// payment method and setting the user owns. The account stays.
pub async fn reset_all(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode, StatusCode> {
    settings::reset_all(&state.pool, auth.user.id)
        .await
        .map_err(settings_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn settings_error_to_status(err: SettingsError) -> StatusCode {
    match err {
        SettingsError::InvalidClosingDay(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SettingsError::Database(e) => {
            tracing::error!(error = %e, "settings query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
