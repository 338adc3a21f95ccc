//! Payment method service.
//!
//! Transactions reference payment methods by name, so a rename is carried
//! over to every transaction of the user in the same DB transaction and a
//! delete moves them to `Outro`. PIX, Dinheiro and `Outro` cannot be deleted,
//! and `Outro` keeps its name. Whether a method is a credit card drives
//! billing-cycle attribution.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ErrorCode;

pub const FALLBACK_METHOD: &str = "Outro";
pub const CREDIT_CARD_METHOD: &str = "Cartão de Crédito";

/// Seeded methods that cannot be deleted.
pub const PROTECTED_METHODS: [&str; 3] = ["PIX", "Dinheiro", FALLBACK_METHOD];

/// `(name, icon, color, is_credit_card)` of the seeded payment methods.
pub const DEFAULT_PAYMENT_METHODS: [(&str, &str, &str, bool); 6] = [
    ("PIX", "BoltIcon", "#3b82f6", false),
    ("Dinheiro", "CashIcon", "#22c55e", false),
    (CREDIT_CARD_METHOD, "TicketIcon", "#f97316", true),
    ("Cartão de Débito", "TicketIcon", "#6366f1", false),
    ("Boleto", "ReceiptPercentIcon", "#ca8a04", false),
    (FALLBACK_METHOD, "DotsHorizontalIcon", "#9ca3af", false),
];

const DEFAULT_TEXT_COLOR: &str = "#ffffff";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum PaymentMethodError {
    #[error("payment method not found: {0}")]
    NotFound(Uuid),
    #[error("payment method name must not be empty")]
    EmptyName,
    #[error("a payment method with this name already exists")]
    DuplicateName,
    #[error("this payment method cannot be deleted")]
    Protected,
    #[error("the fallback payment method cannot be renamed")]
    FallbackRenamed,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for PaymentMethodError {
    fn from(err: sqlx::Error) -> Self {
        let duplicate = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == UNIQUE_VIOLATION);
        if duplicate { Self::DuplicateName } else { Self::Database(err) }
    }
}

impl ErrorCode for PaymentMethodError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PAYMENT_METHOD_NOT_FOUND",
            Self::EmptyName => "E_INVALID_NAME",
            Self::DuplicateName => "E_DUPLICATE_NAME",
            Self::Protected | Self::FallbackRenamed => "E_PAYMENT_METHOD_PROTECTED",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PaymentMethodRow {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub text_color: String,
    pub custom_icon: Option<String>,
    pub is_credit_card: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentMethodInput {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub text_color: String,
    pub custom_icon: Option<String>,
    pub is_credit_card: bool,
}

impl PaymentMethodInput {
    fn validated_name(&self) -> Result<&str, PaymentMethodError> {
        let name = self.name.trim();
        if name.is_empty() { Err(PaymentMethodError::EmptyName) } else { Ok(name) }
    }

    fn text_color(&self) -> &str {
        if self.text_color.trim().is_empty() { DEFAULT_TEXT_COLOR } else { &self.text_color }
    }
}

fn check_delete(name: &str) -> Result<(), PaymentMethodError> {
    if PROTECTED_METHODS.contains(&name) { Err(PaymentMethodError::Protected) } else { Ok(()) }
}

/// Transactions are reassigned to `Outro` by name, so it must keep it.
fn check_rename(old_name: &str, new_name: &str) -> Result<(), PaymentMethodError> {
    if old_name == FALLBACK_METHOD && new_name != FALLBACK_METHOD {
        Err(PaymentMethodError::FallbackRenamed)
    } else {
        Ok(())
    }
}

const SELECT_COLUMNS: &str = "id, name, icon, color, text_color, custom_icon, is_credit_card";

/// List payment methods by name, seeding the defaults for a user who has none.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn list_payment_methods(pool: &PgPool, user_id: Uuid) -> Result<Vec<PaymentMethodRow>, PaymentMethodError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_methods WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if existing == 0 {
        for (name, icon, color, is_credit_card) in DEFAULT_PAYMENT_METHODS {
            sqlx::query(
                "INSERT INTO payment_methods (user_id, name, icon, color, text_color, is_credit_card)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (user_id, name) DO NOTHING",
            )
            .bind(user_id)
            .bind(name)
            .bind(icon)
            .bind(color)
            .bind(DEFAULT_TEXT_COLOR)
            .bind(is_credit_card)
            .execute(pool)
            .await?;
        }
        tracing::info!(%user_id, "seeded default payment methods");
    }

    let rows = sqlx::query_as::<_, PaymentMethodRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM payment_methods WHERE user_id = $1 ORDER BY name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `EmptyName`, `DuplicateName`, or a database error.
pub async fn create_payment_method(
    pool: &PgPool,
    user_id: Uuid,
    input: &PaymentMethodInput,
) -> Result<PaymentMethodRow, PaymentMethodError> {
    let name = input.validated_name()?;
    let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
        "INSERT INTO payment_methods (user_id, name, icon, color, text_color, custom_icon, is_credit_card)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(name)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(input.text_color())
    .bind(&input.custom_icon)
    .bind(input.is_credit_card)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Update a payment method; a rename is applied to the user's transactions.
///
/// # Errors
///
/// Returns `NotFound` when the method does not belong to the user and
/// `FallbackRenamed` when `Outro` would be renamed.
pub async fn update_payment_method(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &PaymentMethodInput,
) -> Result<PaymentMethodRow, PaymentMethodError> {
    let name = input.validated_name()?;
    let mut tx = pool.begin().await?;

    let old_name: String = sqlx::query_scalar("SELECT name FROM payment_methods WHERE id = $1 AND user_id = $2 FOR UPDATE")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PaymentMethodError::NotFound(id))?;
    check_rename(&old_name, name)?;

    let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
        "UPDATE payment_methods
         SET name = $3, icon = $4, color = $5, text_color = $6, custom_icon = $7, is_credit_card = $8
         WHERE id = $1 AND user_id = $2
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(input.text_color())
    .bind(&input.custom_icon)
    .bind(input.is_credit_card)
    .fetch_one(&mut *tx)
    .await?;

    if old_name != row.name {
        let renamed = sqlx::query("UPDATE transactions SET payment_method = $3 WHERE user_id = $1 AND payment_method = $2")
            .bind(user_id)
            .bind(&old_name)
            .bind(&row.name)
            .execute(&mut *tx)
            .await?;
        tracing::info!(%user_id, from = %old_name, to = %row.name, transactions = renamed.rows_affected(), "payment method renamed");
    }

    tx.commit().await?;
    Ok(row)
}

/// Delete a payment method, moving its transactions to `Outro`.
///
/// # Errors
///
/// Returns `Protected` for PIX, Dinheiro and `Outro`, and `NotFound` when the method
/// does not belong to the user.
pub async fn delete_payment_method(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), PaymentMethodError> {
    let mut tx = pool.begin().await?;

    let name: String = sqlx::query_scalar("SELECT name FROM payment_methods WHERE id = $1 AND user_id = $2 FOR UPDATE")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PaymentMethodError::NotFound(id))?;
    check_delete(&name)?;

    sqlx::query("UPDATE transactions SET payment_method = $3 WHERE user_id = $1 AND payment_method = $2")
        .bind(user_id)
        .bind(&name)
        .bind(FALLBACK_METHOD)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM payment_methods WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "payment_method_test.rs"]
mod tests;
