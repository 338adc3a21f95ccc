//! Current-month dashboard.
//!
//! Figures carry the IDs they summed so a client can open the detail list
//! behind any card without recomputing the filters.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::balance::{cash_balance_as_of, total_balance, total_invested};
use super::calendar::{closing_date_offset, long_month_label, month_end, month_end_offset, month_start};
use super::{Entry, LedgerSettings, TransactionKind, variation_pct};

/// A summed figure and the transactions behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Figure {
    pub total_cents: i64,
    pub transaction_ids: Vec<Uuid>,
}

impl Figure {
    fn collect<'a>(entries: impl Iterator<Item = &'a Entry>, value: impl Fn(&Entry) -> i64) -> Self {
        let mut figure = Self::default();
        for e in entries {
            figure.total_cents += value(e);
            figure.transaction_ids.push(e.id);
        }
        figure
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total_balance_cents: i64,
    pub total_invested_cents: i64,
    pub balance_variation_pct: f64,
    pub investment_variation_pct: f64,
    pub month_income: Figure,
    pub month_expenses: Figure,
    pub month_investments: Figure,
    pub current_card_bill: Figure,
    pub pending_income: Figure,
    pub pending_expenses: Figure,
    pub pending_investments: Figure,
    pub planning_card_bill: Figure,
}

/// Cash expense: not charged to a card and not a card-bill payment.
fn is_cash_expense(e: &Entry) -> bool {
    e.kind == TransactionKind::Expense && !e.credit_card && !e.card_bill_payment
}

#[must_use]
pub fn dashboard(entries: &[Entry], settings: &LedgerSettings, today: NaiveDate) -> DashboardSummary {
    let first = month_start(today);
    let last = month_end(today);
    let closing_day = settings.card_closing_day;
    let current_closing = closing_date_offset(today, 0, closing_day);
    let previous_closing = closing_date_offset(today, -1, closing_day);
    let previous_month_end = month_end_offset(today, -1);

    let this_month = move || entries.iter().filter(move |e| e.date >= first && e.date <= last);
    let future = move || entries.iter().filter(move |e| e.date > today);

    let balance = total_balance(entries, settings, today);
    let previous_balance = cash_balance_as_of(entries, settings.initial_balance_cents, previous_month_end);
    let invested = total_invested(entries, settings.initial_investment_cents, today);
    let previous_invested = total_invested(entries, settings.initial_investment_cents, previous_month_end);

    DashboardSummary {
        year: today.year(),
        month: today.month(),
        label: long_month_label(today.year(), today.month()),
        total_balance_cents: balance,
        total_invested_cents: invested,
        balance_variation_pct: variation_pct(balance, previous_balance),
        investment_variation_pct: variation_pct(invested, previous_invested),
        month_income: Figure::collect(this_month().filter(|e| e.kind == TransactionKind::Income), |e| e.amount_cents),
        month_expenses: Figure::collect(this_month().filter(|e| is_cash_expense(e)), |e| e.amount_cents),
        month_investments: Figure::collect(
            this_month().filter(|e| e.kind == TransactionKind::Investment),
            Entry::investment_net,
        ),
        current_card_bill: Figure::collect(
            entries
                .iter()
                .filter(|e| e.is_card_purchase() && e.date >= previous_closing && e.date < current_closing),
            |e| e.amount_cents,
        ),
        pending_income: Figure::collect(future().filter(|e| e.kind == TransactionKind::Income), |e| e.amount_cents),
        pending_expenses: Figure::collect(future().filter(|e| is_cash_expense(e)), |e| e.amount_cents),
        pending_investments: Figure::collect(
            future().filter(|e| e.kind == TransactionKind::Investment),
            Entry::investment_net,
        ),
        planning_card_bill: Figure::collect(
            entries
                .iter()
                .filter(|e| e.is_card_purchase() && e.date >= current_closing),
            |e| e.amount_cents,
        ),
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
