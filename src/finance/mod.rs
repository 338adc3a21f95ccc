//! Finance — pure calculations over a user's ledger.
//!
//! DESIGN
//! ======
//! Every figure the service shows (balance, dashboard, reports, projection,
//! bill reconciliation) is computed here from a flat list of [`Entry`] values
//! loaded once per request. Nothing in this module touches the database or
//! the clock; callers pass `today` explicitly so the arithmetic is testable.
//!
//! Money is integer cents (`i64`). Dates are calendar days (`NaiveDate`).

pub mod balance;
pub mod billing;
pub mod calendar;
pub mod dashboard;
pub mod filter;
pub mod goals;
pub mod projection;
pub mod recurrence;
pub mod report;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TRANSACTION KIND
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Investment,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Investment => "investment",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" | "receita" => Some(Self::Income),
            "expense" | "despesa" => Some(Self::Expense),
            "investment" | "investimento" => Some(Self::Investment),
            _ => None,
        }
    }
}

// =============================================================================
// LEDGER ENTRY
// =============================================================================

/// The slice of a transaction the calculations need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub category_id: Option<Uuid>,
    /// Paid with a payment method flagged as a credit card.
    pub credit_card: bool,
    pub card_bill_payment: bool,
    pub investment_withdrawal: bool,
}

impl Entry {
    /// Expense charged to a credit card (attributed to a billing cycle).
    #[must_use]
    pub fn is_card_purchase(&self) -> bool {
        self.kind == TransactionKind::Expense && self.credit_card
    }

    /// Signed investment movement: contributions positive, withdrawals negative.
    #[must_use]
    pub fn investment_net(&self) -> i64 {
        if self.investment_withdrawal { -self.amount_cents } else { self.amount_cents }
    }
}

/// User-level parameters that every balance figure depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    pub initial_balance_cents: i64,
    pub initial_investment_cents: i64,
    pub card_closing_day: u32,
}

pub const DEFAULT_CARD_CLOSING_DAY: u32 = 25;

impl Default for LedgerSettings {
    fn default() -> Self {
        Self { initial_balance_cents: 0, initial_investment_cents: 0, card_closing_day: DEFAULT_CARD_CLOSING_DAY }
    }
}

// =============================================================================
// MONEY
// =============================================================================

/// Convert a currency amount (e.g. `12.5`) to cents, rounding half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cents_from_units(units: f64) -> Option<i64> {
    if !units.is_finite() {
        return None;
    }
    let cents = (units * 100.0).round();
    if cents.abs() > 9.0e15 {
        return None;
    }
    Some(cents as i64)
}

/// Render cents as a plain decimal (`1250` -> `"12.50"`).
#[must_use]
pub fn format_units(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Render cents as Brazilian currency (`123456` -> `"R$ 1.234,56"`).
#[must_use]
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}R$ {grouped},{:02}", abs % 100)
}

/// Percentage change from `previous` to `current`, relative to `|previous|`.
///
/// Returns 0 when `previous` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn variation_pct(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (current - previous) as f64 / previous.unsigned_abs() as f64 * 100.0
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
