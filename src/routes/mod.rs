//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API under `/api`, a `/healthz` probe, and an
//! optional static directory (`STATIC_DIR`) that serves the SPA bundle for
//! every other path. All `/api` routes except the auth endpoints require a
//! session cookie through the [`auth::AuthUser`] extractor.

pub mod ai;
pub mod auth;
pub mod categories;
pub mod goals;
pub mod reports;
pub mod settings;
pub mod transactions;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use chrono::NaiveDate;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::env::env_string;
use crate::state::AppState;

/// Calendar day used for every "today"-relative figure.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/email/request-code", post(auth::request_email_code))
        .route("/api/auth/email/verify-code", post(auth::verify_email_code))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route(
            "/api/payment-methods",
            get(categories::list_payment_methods).post(categories::create_payment_method),
        )
        .route(
            "/api/payment-methods/{id}",
            put(categories::update_payment_method).delete(categories::delete_payment_method),
        )
        .route("/api/goals", get(goals::list_goals).post(goals::create_goal))
        .route("/api/goals/{id}", put(goals::update_goal).delete(goals::delete_goal))
        .route("/api/goals/{id}/values", post(goals::add_value))
        .route("/api/goal-transactions", get(goals::list_goal_transactions))
        .route("/api/settings", get(settings::get_settings))
        .route("/api/settings/balances", put(settings::set_initial_balances))
        .route("/api/settings/closing-day", put(settings::set_card_closing_day))
        .route("/api/settings/reset", post(settings::reset_all))
        .route("/api/dashboard", get(reports::get_dashboard))
        .route("/api/projection", get(reports::get_projection))
        .route("/api/reports/evolution", get(reports::get_evolution))
        .route("/api/reports/net-worth", get(reports::get_net_worth))
        .route("/api/reports/categories", get(reports::get_category_summary))
        .route("/api/billing/hint", get(reports::get_billing_hint))
        .route("/api/billing/reconcile", post(reports::reconcile_bill))
        .route("/api/billing/adjustment", post(reports::create_bill_adjustment))
        .route("/api/ai/chat", post(ai::chat))
        .route("/api/ai/transcribe", post(ai::transcribe))
        .route("/api/ai/receipt", post(ai::extract_receipt))
        .route("/api/ai/goal-estimate", post(ai::estimate_goal))
        .route("/api/ai/goal-questions", post(ai::goal_questions))
        .route("/healthz", get(healthz))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = api_routes();
    if let Some(dir) = env_string("STATIC_DIR") {
        tracing::info!(%dir, "serving static files");
        router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    router
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
