//! Category and payment-method routes.
//!
//! Both lists are seeded with defaults on first read. Deleting either moves
//! the affected transactions to the fallback entry before the row goes away.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::category::{self, CategoryError, CategoryInput, CategoryRow};
use crate::services::payment_method::{self, PaymentMethodError, PaymentMethodInput, PaymentMethodRow};
use crate::state::AppState;

// =============================================================================
// CATEGORIES
// =============================================================================

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<CategoryRow>>, StatusCode> {
    let rows = category::list_categories(&state.pool, auth.user.id)
        .await
        .map_err(category_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryRow>), StatusCode> {
    let row = category::create_category(&state.pool, auth.user.id, &input)
        .await
        .map_err(category_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PUT /api/categories/:id`
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<CategoryRow>, StatusCode> {
    let row = category::update_category(&state.pool, auth.user.id, id, &input)
        .await
        .map_err(category_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/categories/:id`
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    category::delete_category(&state.pool, auth.user.id, id)
        .await
        .map_err(category_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn category_error_to_status(err: CategoryError) -> StatusCode {
    match err {
        CategoryError::NotFound(_) => StatusCode::NOT_FOUND,
        CategoryError::EmptyName => StatusCode::UNPROCESSABLE_ENTITY,
        CategoryError::Protected => StatusCode::CONFLICT,
        CategoryError::Database(e) => {
            tracing::error!(error = %e, "category query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// =============================================================================
// PAYMENT METHODS
// =============================================================================

/// `GET /api/payment-methods`
pub async fn list_payment_methods(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PaymentMethodRow>>, StatusCode> {
    let rows = payment_method::list_payment_methods(&state.pool, auth.user.id)
        .await
        .map_err(payment_method_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/payment-methods`
pub async fn create_payment_method(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<PaymentMethodInput>,
) -> Result<(StatusCode, Json<PaymentMethodRow>), StatusCode> {
    let row = payment_method::create_payment_method(&state.pool, auth.user.id, &input)
        .await
        .map_err(payment_method_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PUT /api/payment-methods/:id` — a rename is carried over to transactions.
pub async fn update_payment_method(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<PaymentMethodInput>,
) -> Result<Json<PaymentMethodRow>, StatusCode> {
    let row = payment_method::update_payment_method(&state.pool, auth.user.id, id, &input)
        .await
        .map_err(payment_method_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/payment-methods/:id`
pub async fn delete_payment_method(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    payment_method::delete_payment_method(&state.pool, auth.user.id, id)
        .await
        .map_err(payment_method_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn payment_method_error_to_status(err: PaymentMethodError) -> StatusCode {
    match err {
        PaymentMethodError::NotFound(_) => StatusCode::NOT_FOUND,
        PaymentMethodError::EmptyName => StatusCode::UNPROCESSABLE_ENTITY,
        PaymentMethodError::DuplicateName | PaymentMethodError::Protected | PaymentMethodError::FallbackRenamed => {
            StatusCode::CONFLICT
        }
        PaymentMethodError::Database(e) => {
            tracing::error!(error = %e, "payment method query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
