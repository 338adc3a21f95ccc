//! Transaction service — ledger CRUD, recurring series, bill adjustments.
//!
//! DESIGN
//! ======
//! Recurring transactions are stored expanded: one row per occurrence, all
//! sharing a `recurring_id`, inserted in a single statement. Series edits
//! and deletes address "this occurrence and every later one" by comparing
//! dates against the targeted row.
//!
//! `ledger` is the bridge to `finance`: it loads the user's rows as
//! [`Entry`] values, resolving whether each payment method is a credit card.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use super::category::{self, BANK_FEES_SLUG, FALLBACK_SLUG};
use super::payment_method::CREDIT_CARD_METHOD;
use crate::error::ErrorCode;
use crate::finance::billing::{ADJUSTMENT_DESCRIPTION, BillReconciliation, reconcile_bill};
use crate::finance::filter::{self, Listable, Listing, PeriodFilter};
use crate::finance::recurrence::{self, Frequency};
use crate::finance::{Entry, TransactionKind};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("transaction not found: {0}")]
    NotFound(Uuid),
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("recurring transactions need a frequency and an end date")]
    IncompleteRecurrence,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("unknown category: {0}")]
    UnknownCategory(Uuid),
    #[error("bill payment does not exceed the statement total")]
    NoSurplus,
    #[error("stored row is invalid: {0}")]
    InvalidRow(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for TransactionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_TRANSACTION_NOT_FOUND",
            Self::InvalidAmount => "E_INVALID_AMOUNT",
            Self::EmptyDescription => "E_INVALID_DESCRIPTION",
            Self::IncompleteRecurrence | Self::EndBeforeStart { .. } => "E_INVALID_RECURRENCE",
            Self::UnknownCategory(_) => "E_UNKNOWN_CATEGORY",
            Self::NoSurplus => "E_NO_SURPLUS",
            Self::InvalidRow(_) => "E_INVALID_ROW",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// A stored transaction with its category name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub description: String,
    pub amount_cents: i64,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub date: NaiveDate,
    pub payment_method: Option<String>,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub end_date: Option<NaiveDate>,
    pub recurring_id: Option<Uuid>,
    pub is_card_bill_payment: bool,
    pub is_investment_withdrawal: bool,
    pub created_at: DateTime<Utc>,
}

impl Listable for TransactionRow {
    fn listing(&self) -> Listing<'_> {
        Listing {
            date: self.date,
            description: &self.description,
            category: self.category_name.as_deref(),
            payment_method: self.payment_method.as_deref(),
            amount_cents: self.amount_cents,
        }
    }
}

/// Fields written on create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub description: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_card_bill_payment: bool,
    #[serde(default)]
    pub is_investment_withdrawal: bool,
}

impl TransactionInput {
    /// Trim text, drop flags that do not apply to the kind, and check bounds.
    fn normalized(&self) -> Result<Self, TransactionError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(TransactionError::EmptyDescription);
        }
        if self.amount_cents <= 0 {
            return Err(TransactionError::InvalidAmount);
        }

        let (frequency, end_date) = if self.is_recurring {
            let (Some(frequency), Some(end)) = (self.frequency, self.end_date) else {
                return Err(TransactionError::IncompleteRecurrence);
            };
            if end < self.date {
                return Err(TransactionError::EndBeforeStart { start: self.date, end });
            }
            (Some(frequency), Some(end))
        } else {
            (None, None)
        };

        let payment_method = self
            .payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned);

        Ok(Self {
            kind: self.kind,
            description: description.to_owned(),
            amount_cents: self.amount_cents,
            category_id: self.category_id,
            date: self.date,
            payment_method,
            is_recurring: self.is_recurring,
            frequency,
            end_date,
            is_card_bill_payment: self.is_card_bill_payment && self.kind == TransactionKind::Expense,
            is_investment_withdrawal: self.is_investment_withdrawal && self.kind == TransactionKind::Investment,
        })
    }

    /// Occurrence dates this input expands to.
    fn occurrence_dates(&self) -> Vec<NaiveDate> {
        match (self.is_recurring, self.frequency, self.end_date) {
            (true, Some(frequency), Some(end)) => recurrence::expand(self.date, end, frequency),
            _ => vec![self.date],
        }
    }
}

const SELECT_JOINED: &str = "SELECT t.id, t.kind, t.description, t.amount_cents, t.category_id, c.name AS category_name,
        t.date, t.payment_method, t.is_recurring, t.frequency, t.end_date, t.recurring_id,
        t.is_card_bill_payment, t.is_investment_withdrawal, t.created_at";

fn transaction_from_row(row: &PgRow) -> Result<TransactionRow, TransactionError> {
    let kind: String = row.get("kind");
    let kind = TransactionKind::parse(&kind).ok_or(TransactionError::InvalidRow(kind))?;
    let frequency: Option<String> = row.get("frequency");
    let frequency = match frequency {
        Some(raw) => Some(Frequency::parse(&raw).ok_or(TransactionError::InvalidRow(raw))?),
        None => None,
    };

    Ok(TransactionRow {
        id: row.get("id"),
        kind,
        description: row.get("description"),
        amount_cents: row.get("amount_cents"),
        category_id: row.get("category_id"),
        category_name: row.get("category_name"),
        date: row.get("date"),
        payment_method: row.get("payment_method"),
        is_recurring: row.get("is_recurring"),
        frequency,
        end_date: row.get("end_date"),
        recurring_id: row.get("recurring_id"),
        is_card_bill_payment: row.get("is_card_bill_payment"),
        is_investment_withdrawal: row.get("is_investment_withdrawal"),
        created_at: row.get("created_at"),
    })
}

async fn ensure_category(pool: &PgPool, user_id: Uuid, category_id: Option<Uuid>) -> Result<(), TransactionError> {
    match category_id {
        Some(id) if !category::category_exists(pool, user_id, id).await? => Err(TransactionError::UnknownCategory(id)),
        _ => Ok(()),
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// List transactions newest first, narrowed by period and free-text search.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_transactions(
    pool: &PgPool,
    user_id: Uuid,
    period: PeriodFilter,
    query: Option<&str>,
    today: NaiveDate,
) -> Result<Vec<TransactionRow>, TransactionError> {
    let rows = sqlx::query(&format!(
        "{SELECT_JOINED}
         FROM transactions t
         LEFT JOIN categories c ON c.id = t.category_id
         WHERE t.user_id = $1
         ORDER BY t.date DESC, t.created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let items = rows.iter().map(transaction_from_row).collect::<Result<Vec<_>, _>>()?;
    Ok(filter::apply(items, period, query, today))
}

/// # Errors
///
/// Returns `NotFound` if the transaction does not belong to the user.
pub async fn get_transaction(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<TransactionRow, TransactionError> {
    let row = sqlx::query(&format!(
        "{SELECT_JOINED}
         FROM transactions t
         LEFT JOIN categories c ON c.id = t.category_id
         WHERE t.id = $1 AND t.user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(TransactionError::NotFound(id))?;
    transaction_from_row(&row)
}

/// Create a transaction, expanding a recurring one into its whole series.
///
/// Returns the inserted rows in date order.
///
/// # Errors
///
/// Returns a validation error for bad input or a database error if the
/// insert fails.
pub async fn create_transaction(
    pool: &PgPool,
    user_id: Uuid,
    input: &TransactionInput,
) -> Result<Vec<TransactionRow>, TransactionError> {
    let input = input.normalized()?;
    ensure_category(pool, user_id, input.category_id).await?;

    let dates = input.occurrence_dates();
    let recurring_id = input.is_recurring.then(Uuid::new_v4);

    let mut builder = QueryBuilder::new(
        "WITH inserted AS (
            INSERT INTO transactions (user_id, kind, description, amount_cents, category_id, date,
                payment_method, is_recurring, frequency, end_date, recurring_id,
                is_card_bill_payment, is_investment_withdrawal) ",
    );
    builder.push_values(&dates, |mut b, date| {
        b.push_bind(user_id)
            .push_bind(input.kind.as_str())
            .push_bind(&input.description)
            .push_bind(input.amount_cents)
            .push_bind(input.category_id)
            .push_bind(*date)
            .push_bind(&input.payment_method)
            .push_bind(input.is_recurring)
            .push_bind(input.frequency.map(Frequency::as_str))
            .push_bind(input.end_date)
            .push_bind(recurring_id)
            .push_bind(input.is_card_bill_payment)
            .push_bind(input.is_investment_withdrawal);
    });
    builder.push(" RETURNING *) ");
    builder.push(SELECT_JOINED);
    builder.push(" FROM inserted t LEFT JOIN categories c ON c.id = t.category_id ORDER BY t.date");

    let rows = builder.build().fetch_all(pool).await?;
    tracing::info!(%user_id, count = rows.len(), recurring = input.is_recurring, "transactions created");
    rows.iter().map(transaction_from_row).collect()
}

/// Update a transaction.
///
/// With `apply_to_future` on a series member, every later occurrence in the
/// series (`date >=` the row's original date) also receives the new values,
/// except the date, which only the targeted row takes.
///
/// # Errors
///
/// Returns `NotFound` when the transaction does not belong to the user.
pub async fn update_transaction(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &TransactionInput,
    apply_to_future: bool,
) -> Result<TransactionRow, TransactionError> {
    let input = input.normalized()?;
    ensure_category(pool, user_id, input.category_id).await?;

    let mut tx = pool.begin().await?;
    let current = sqlx::query_as::<_, (NaiveDate, Option<Uuid>)>(
        "SELECT date, recurring_id FROM transactions WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(TransactionError::NotFound(id))?;
    let (original_date, recurring_id) = current;

    sqlx::query(
        "UPDATE transactions
         SET kind = $3, description = $4, amount_cents = $5, category_id = $6, payment_method = $7,
             is_recurring = $8, frequency = $9, end_date = $10,
             is_card_bill_payment = $11, is_investment_withdrawal = $12, date = $13
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .bind(input.kind.as_str())
    .bind(&input.description)
    .bind(input.amount_cents)
    .bind(input.category_id)
    .bind(&input.payment_method)
    .bind(input.is_recurring)
    .bind(input.frequency.map(Frequency::as_str))
    .bind(input.end_date)
    .bind(input.is_card_bill_payment)
    .bind(input.is_investment_withdrawal)
    .bind(input.date)
    .execute(&mut *tx)
    .await?;

    if let (true, Some(series)) = (apply_to_future, recurring_id) {
        let updated = sqlx::query(
            "UPDATE transactions
             SET kind = $4, description = $5, amount_cents = $6, category_id = $7, payment_method = $8,
                 is_recurring = $9, frequency = $10, end_date = $11,
                 is_card_bill_payment = $12, is_investment_withdrawal = $13
             WHERE user_id = $1 AND recurring_id = $2 AND id <> $3 AND date >= $14",
        )
        .bind(user_id)
        .bind(series)
        .bind(id)
        .bind(input.kind.as_str())
        .bind(&input.description)
        .bind(input.amount_cents)
        .bind(input.category_id)
        .bind(&input.payment_method)
        .bind(input.is_recurring)
        .bind(input.frequency.map(Frequency::as_str))
        .bind(input.end_date)
        .bind(input.is_card_bill_payment)
        .bind(input.is_investment_withdrawal)
        .bind(original_date)
        .execute(&mut *tx)
        .await?;
        tracing::info!(%user_id, recurring_id = %series, rows = updated.rows_affected(), "series updated");
    }

    tx.commit().await?;
    get_transaction(pool, user_id, id).await
}

/// Delete a transaction, or it and every later occurrence of its series.
///
/// Returns the number of rows removed.
///
/// # Errors
///
/// Returns `NotFound` when the transaction does not belong to the user.
pub async fn delete_transaction(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    delete_all_future: bool,
) -> Result<u64, TransactionError> {
    let (date, recurring_id) = sqlx::query_as::<_, (NaiveDate, Option<Uuid>)>(
        "SELECT date, recurring_id FROM transactions WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(TransactionError::NotFound(id))?;

    let result = match (delete_all_future, recurring_id) {
        (true, Some(series)) => {
            sqlx::query("DELETE FROM transactions WHERE user_id = $1 AND recurring_id = $2 AND date >= $3")
                .bind(user_id)
                .bind(series)
                .bind(date)
                .execute(pool)
                .await?
        }
        _ => {
            sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?
        }
    };
    Ok(result.rows_affected())
}

/// Load the user's ledger for the `finance` calculations.
///
/// A transaction counts as a card purchase when its payment method is flagged
/// as a credit card; without a matching method the default card name is used.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn ledger(pool: &PgPool, user_id: Uuid) -> Result<Vec<Entry>, TransactionError> {
    let rows = sqlx::query(
        "SELECT t.id, t.kind, t.amount_cents, t.date, t.category_id,
                COALESCE(pm.is_credit_card, t.payment_method = $2, FALSE) AS credit_card,
                t.is_card_bill_payment, t.is_investment_withdrawal
         FROM transactions t
         LEFT JOIN payment_methods pm ON pm.user_id = t.user_id AND pm.name = t.payment_method
         WHERE t.user_id = $1
         ORDER BY t.date",
    )
    .bind(user_id)
    .bind(CREDIT_CARD_METHOD)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let kind: String = row.get("kind");
            Ok(Entry {
                id: row.get("id"),
                kind: TransactionKind::parse(&kind).ok_or(TransactionError::InvalidRow(kind))?,
                amount_cents: row.get("amount_cents"),
                date: row.get("date"),
                category_id: row.get("category_id"),
                credit_card: row.get("credit_card"),
                card_bill_payment: row.get("is_card_bill_payment"),
                investment_withdrawal: row.get("is_investment_withdrawal"),
            })
        })
        .collect()
}

// =============================================================================
// BILL RECONCILIATION
// =============================================================================

/// Compare a bill payment with the statement it pays.
///
/// # Errors
///
/// Returns a database error if the ledger cannot be loaded.
pub async fn reconcile_payment(
    pool: &PgPool,
    user_id: Uuid,
    payment_date: NaiveDate,
    paid_cents: i64,
    closing_day: u32,
) -> Result<BillReconciliation, TransactionError> {
    let entries = ledger(pool, user_id).await?;
    Ok(reconcile_bill(&entries, payment_date, paid_cents, closing_day))
}

/// Record the surplus of a bill payment over its statement as a fee expense.
///
/// The expense goes to the bank-fees category (else the fallback, else any
/// category) and is dated `today`.
///
/// # Errors
///
/// Returns `NoSurplus` when the payment does not exceed the statement total.
pub async fn create_bill_adjustment(
    pool: &PgPool,
    user_id: Uuid,
    payment_date: NaiveDate,
    paid_cents: i64,
    payment_method: Option<String>,
    closing_day: u32,
    today: NaiveDate,
) -> Result<TransactionRow, TransactionError> {
    let reconciliation = reconcile_payment(pool, user_id, payment_date, paid_cents, closing_day).await?;
    if reconciliation.diff_cents <= 0 {
        return Err(TransactionError::NoSurplus);
    }

    let category_id = category::category_by_preference(pool, user_id, &[BANK_FEES_SLUG, FALLBACK_SLUG]).await?;
    let input = TransactionInput {
        kind: TransactionKind::Expense,
        description: ADJUSTMENT_DESCRIPTION.to_owned(),
        amount_cents: reconciliation.diff_cents,
        category_id,
        date: today,
        payment_method,
        is_recurring: false,
        frequency: None,
        end_date: None,
        is_card_bill_payment: false,
        is_investment_withdrawal: false,
    };

    let mut created = create_transaction(pool, user_id, &input).await?;
    tracing::info!(%user_id, diff_cents = reconciliation.diff_cents, "bill adjustment recorded");
    created.pop().ok_or(TransactionError::InvalidRow("adjustment insert returned no row".into()))
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
