//! Credit-card billing cycles.
//!
//! DESIGN
//! ======
//! A statement for month `m` covers card purchases in
//! `[closing(m - 1), closing(m))`, where `closing(m)` is the configured
//! closing day of month `m` clamped to the month length. A purchase made on
//! or after the closing date therefore lands on next month's statement.
//!
//! Bill payments are reconciled against the statement they settle: a payment
//! made before the closing date pays the previous month's statement.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::Entry;
use super::calendar::{clamped_date, closing_date, shift_month};

/// Description used for the expense that absorbs a bill surplus.
pub const ADJUSTMENT_DESCRIPTION: &str = "Ajuste Fatura (Taxas/Anuidade)";

// =============================================================================
// CYCLES
// =============================================================================

/// Half-open date interval `[start, end)` of one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingCycle {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Last calendar day inside the cycle.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.end.checked_sub_days(Days::new(1)).unwrap_or(self.end)
    }
}

/// Statement cycle for `(year, month)`.
#[must_use]
pub fn billing_cycle(year: i32, month: u32, closing_day: u32) -> BillingCycle {
    let (py, pm) = shift_month(year, month, -1);
    BillingCycle { start: closing_date(py, pm, closing_day), end: closing_date(year, month, closing_day) }
}

/// The `(year, month)` statement a purchase on `date` belongs to.
#[must_use]
pub fn statement_month(date: NaiveDate, closing_day: u32) -> (i32, u32) {
    if date < closing_date(date.year(), date.month(), closing_day) {
        (date.year(), date.month())
    } else {
        shift_month(date.year(), date.month(), 1)
    }
}

/// The next statement closing on or after `today` (today itself excluded).
#[must_use]
pub fn next_closing_date(today: NaiveDate, closing_day: u32) -> NaiveDate {
    let this_month = closing_date(today.year(), today.month(), closing_day);
    if today < this_month {
        this_month
    } else {
        let (y, m) = shift_month(today.year(), today.month(), 1);
        closing_date(y, m, closing_day)
    }
}

/// Date an entry counts on in reports and projections.
///
/// Card purchases made on or after the month's closing date move to the 1st of
/// the following month, when their statement comes due.
#[must_use]
pub fn effective_date(entry: &Entry, closing_day: u32) -> NaiveDate {
    if entry.is_card_purchase() && entry.date >= closing_date(entry.date.year(), entry.date.month(), closing_day) {
        let (y, m) = shift_month(entry.date.year(), entry.date.month(), 1);
        clamped_date(y, m, 1)
    } else {
        entry.date
    }
}

// =============================================================================
// HINTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementHint {
    CurrentMonth,
    NextMonth,
}

/// Which statement a card purchase on `date` will show up on.
#[must_use]
pub fn billing_hint(date: NaiveDate, closing_day: u32) -> StatementHint {
    if statement_month(date, closing_day) == (date.year(), date.month()) {
        StatementHint::CurrentMonth
    } else {
        StatementHint::NextMonth
    }
}

// =============================================================================
// RECONCILIATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStatus {
    Match,
    Higher,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillReconciliation {
    pub statement_year: i32,
    pub statement_month: u32,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub sum_cents: i64,
    /// `paid - sum`. Positive means fees or interest were charged.
    pub diff_cents: i64,
    pub count: usize,
    pub status: ReconcileStatus,
    pub transaction_ids: Vec<Uuid>,
}

/// Compare a bill payment against the card purchases of the statement it pays.
#[must_use]
pub fn reconcile_bill(entries: &[Entry], payment_date: NaiveDate, paid_cents: i64, closing_day: u32) -> BillReconciliation {
    let (year, month) = if payment_date < closing_date(payment_date.year(), payment_date.month(), closing_day) {
        shift_month(payment_date.year(), payment_date.month(), -1)
    } else {
        (payment_date.year(), payment_date.month())
    };
    let cycle = billing_cycle(year, month, closing_day);

    let in_cycle: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.is_card_purchase() && cycle.contains(e.date))
        .collect();
    let sum_cents: i64 = in_cycle.iter().map(|e| e.amount_cents).sum();
    let diff_cents = paid_cents - sum_cents;
    let status = match diff_cents {
        0 => ReconcileStatus::Match,
        d if d > 0 => ReconcileStatus::Higher,
        _ => ReconcileStatus::Lower,
    };

    BillReconciliation {
        statement_year: year,
        statement_month: month,
        cycle_start: cycle.start,
        cycle_end: cycle.last_day(),
        sum_cents,
        diff_cents,
        count: in_cycle.len(),
        status,
        transaction_ids: in_cycle.iter().map(|e| e.id).collect(),
    }
}

#[cfg(test)]
#[path = "billing_test.rs"]
mod tests;
