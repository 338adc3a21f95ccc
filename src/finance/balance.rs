//! Account balance and invested capital.

use chrono::NaiveDate;

use super::billing::next_closing_date;
use super::{Entry, LedgerSettings, TransactionKind};

/// Spendable balance as of `today`.
///
/// Card purchases count against the balance once they are part of a closed
/// or currently open statement; purchases dated on or after the next closing
/// date are left out. Bill payments are skipped because the purchases they
/// settle were already subtracted.
#[must_use]
pub fn total_balance(entries: &[Entry], settings: &LedgerSettings, today: NaiveDate) -> i64 {
    let next_closing = next_closing_date(today, settings.card_closing_day);
    let sum: i64 = entries
        .iter()
        .filter(|e| e.date <= today)
        .map(|e| match e.kind {
            TransactionKind::Income => e.amount_cents,
            TransactionKind::Expense if e.credit_card => {
                if e.date >= next_closing {
                    0
                } else {
                    -e.amount_cents
                }
            }
            TransactionKind::Expense if e.card_bill_payment => 0,
            TransactionKind::Expense => -e.amount_cents,
            TransactionKind::Investment => -e.investment_net(),
        })
        .sum();
    settings.initial_balance_cents + sum
}

/// Invested capital as of `as_of`: initial investment plus net contributions.
#[must_use]
pub fn total_invested(entries: &[Entry], initial_investment_cents: i64, as_of: NaiveDate) -> i64 {
    initial_investment_cents
        + entries
            .iter()
            .filter(|e| e.kind == TransactionKind::Investment && e.date <= as_of)
            .map(Entry::investment_net)
            .sum::<i64>()
}

/// Cash balance used as the month-over-month baseline.
///
/// Income adds and every expense except bill payments subtracts; investment
/// movements are ignored.
#[must_use]
pub fn cash_balance_as_of(entries: &[Entry], initial_balance_cents: i64, as_of: NaiveDate) -> i64 {
    initial_balance_cents
        + entries
            .iter()
            .filter(|e| e.date <= as_of)
            .map(|e| match e.kind {
                TransactionKind::Income => e.amount_cents,
                TransactionKind::Expense if !e.card_bill_payment => -e.amount_cents,
                _ => 0,
            })
            .sum::<i64>()
}

#[cfg(test)]
#[path = "balance_test.rs"]
mod tests;
