//! Category service — per-user categories with seeded defaults.
//!
//! DESIGN
//! ======
//! A user's first listing seeds the ten default categories. Seeded rows carry
//! a stable `slug` so code can find "bank fees" or the fallback category even
//! after the user renames them. Deleting a category moves its transactions to
//! the fallback (slug `others`, else the category named `Outro`). The fallback
//! and the categories the ledger math relies on (salary, card bill,
//! investments) cannot be deleted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::ErrorCode;

pub const FALLBACK_SLUG: &str = "others";
pub const FALLBACK_NAME: &str = "Outro";
pub const BANK_FEES_SLUG: &str = "bank_fees";

/// Seeded categories that cannot be deleted.
pub const PROTECTED_SLUGS: [&str; 4] = ["salary", "card_bill", "investments", FALLBACK_SLUG];
/// Lowercase names that mark a category as protected when it has no slug.
const PROTECTED_NAMES: [&str; 6] =
    ["salário", "fatura do cartão", "fatura de cartão", "investimentos", "outro", "outros"];

/// `(slug, name, icon, color)` of the seeded categories.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 10] = [
    ("salary", "Salário", "BriefcaseIcon", "#22c55e"),
    ("food", "Alimentação", "UtensilsIcon", "#f97316"),
    ("housing", "Moradia", "HomeIcon", "#3b82f6"),
    ("transport", "Transporte", "BusIcon", "#6366f1"),
    ("investments", "Investimentos", "TrendingUpIcon", "#0ea5e9"),
    ("card_bill", "Fatura do Cartão", "ReceiptPercentIcon", "#f97316"),
    (BANK_FEES_SLUG, "Taxas bancárias", "ReceiptPercentIcon", "#f87171"),
    ("leisure", "Lazer", "TicketIcon", "#a855f7"),
    ("health", "Saúde", "HeartIcon", "#ef4444"),
    (FALLBACK_SLUG, FALLBACK_NAME, "DotsHorizontalIcon", "#6b7280"),
];

const DEFAULT_TEXT_COLOR: &str = "#ffffff";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("category not found: {0}")]
    NotFound(Uuid),
    #[error("category name must not be empty")]
    EmptyName,
    #[error("this category cannot be deleted")]
    Protected,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for CategoryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CATEGORY_NOT_FOUND",
            Self::EmptyName => "E_INVALID_NAME",
            Self::Protected => "E_CATEGORY_PROTECTED",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub slug: Option<String>,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub text_color: String,
    pub custom_icon: Option<String>,
}

impl CategoryRow {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        match &self.slug {
            Some(slug) => slug == FALLBACK_SLUG,
            None => self.name == FALLBACK_NAME,
        }
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        is_protected(self.slug.as_deref(), &self.name)
    }
}

fn is_protected(slug: Option<&str>, name: &str) -> bool {
    slug.is_some_and(|s| PROTECTED_SLUGS.contains(&s)) || PROTECTED_NAMES.contains(&name.trim().to_lowercase().as_str())
}

/// Fields a user may set on a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryInput {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub text_color: String,
    pub custom_icon: Option<String>,
}

impl CategoryInput {
    fn validated_name(&self) -> Result<&str, CategoryError> {
        let name = self.name.trim();
        if name.is_empty() { Err(CategoryError::EmptyName) } else { Ok(name) }
    }

    fn text_color(&self) -> &str {
        if self.text_color.trim().is_empty() { DEFAULT_TEXT_COLOR } else { &self.text_color }
    }
}

const SELECT_COLUMNS: &str = "id, slug, name, icon, color, text_color, custom_icon";

// =============================================================================
// QUERIES
// =============================================================================

/// Insert any missing default categories for `user_id`.
///
/// # Errors
///
/// Returns a database error if an insert fails.
pub async fn seed_defaults(pool: &PgPool, user_id: Uuid) -> Result<(), CategoryError> {
    for (slug, name, icon, color) in DEFAULT_CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (user_id, slug, name, icon, color, text_color)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, slug) DO NOTHING",
        )
        .bind(user_id)
        .bind(slug)
        .bind(name)
        .bind(icon)
        .bind(color)
        .bind(DEFAULT_TEXT_COLOR)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// List categories by name, seeding the defaults for a user who has none.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_categories(pool: &PgPool, user_id: Uuid) -> Result<Vec<CategoryRow>, CategoryError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if existing == 0 {
        seed_defaults(pool, user_id).await?;
        tracing::info!(%user_id, "seeded default categories");
    }

    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Category names keyed by ID, for reports.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn category_names(pool: &PgPool, user_id: Uuid) -> Result<HashMap<Uuid, String>, CategoryError> {
    let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM categories WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}

/// # Errors
///
/// Returns `EmptyName` for a blank name or a database error if the insert fails.
pub async fn create_category(pool: &PgPool, user_id: Uuid, input: &CategoryInput) -> Result<CategoryRow, CategoryError> {
    let name = input.validated_name()?;
    let row = sqlx::query_as::<_, CategoryRow>(&format!(
        "INSERT INTO categories (user_id, name, icon, color, text_color, custom_icon)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(name)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(input.text_color())
    .bind(&input.custom_icon)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `NotFound` if the category does not belong to the user.
pub async fn update_category(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &CategoryInput,
) -> Result<CategoryRow, CategoryError> {
    let name = input.validated_name()?;
    sqlx::query_as::<_, CategoryRow>(&format!(
        "UPDATE categories
         SET name = $3, icon = $4, color = $5, text_color = $6, custom_icon = $7
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
    .fetch_optional(pool)
    .await?
    .ok_or(CategoryError::NotFound(id))
}

/// ID of the user's fallback category, if it exists.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn fallback_category_id<'e>(exec: impl PgExecutor<'e>, user_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM categories
         WHERE user_id = $1 AND (slug = $2 OR (slug IS NULL AND name = $3))
         ORDER BY (slug = $2) DESC NULLS LAST, created_at
         LIMIT 1",
    )
    .bind(user_id)
    .bind(FALLBACK_SLUG)
    .bind(FALLBACK_NAME)
    .fetch_optional(exec)
    .await
}

/// First existing category among `slugs` (in order), else any category.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn category_by_preference(pool: &PgPool, user_id: Uuid, slugs: &[&str]) -> Result<Option<Uuid>, sqlx::Error> {
    for slug in slugs {
        let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM categories WHERE user_id = $1 AND slug = $2")
            .bind(user_id)
            .bind(*slug)
            .fetch_optional(pool)
            .await?;
        if found.is_some() {
            return Ok(found);
        }
    }
    sqlx::query_scalar("SELECT id FROM categories WHERE user_id = $1 ORDER BY created_at LIMIT 1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Whether `id` names one of the user's categories.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn category_exists(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)")
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Delete a category, moving its transactions to the fallback category.
///
/// # Errors
///
/// Returns `Protected` for the fallback and the other seeded system
/// categories, and `NotFound` when the category does not belong to the user.
pub async fn delete_category(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), CategoryError> {
    let mut tx = pool.begin().await?;

    let (slug, name): (Option<String>, String) =
        sqlx::query_as("SELECT slug, name FROM categories WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CategoryError::NotFound(id))?;
    let fallback = fallback_category_id(&mut *tx, user_id).await?;
    if fallback == Some(id) || is_protected(slug.as_deref(), &name) {
        return Err(CategoryError::Protected);
    }

    sqlx::query("UPDATE transactions SET category_id = $3 WHERE user_id = $1 AND category_id = $2")
        .bind(user_id)
        .bind(id)
        .bind(fallback)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "category_test.rs"]
mod tests;
