//! Month-by-month cash projection.
//!
//! DESIGN
//! ======
//! The projection starts from today's balance and walks forward one calendar
//! month at a time using the transactions already on the books (recurring
//! series are stored expanded, so they appear naturally). Entries are placed
//! at their effective date, so late-cycle card purchases hit the month their
//! statement is paid.
//!
//! Month 0 only adds what is still to come this month; the part already
//! elapsed is in the starting balance.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::billing::effective_date;
use super::calendar::{shift_month, short_month_label};
use super::{Entry, TransactionKind};

pub const DEFAULT_PROJECTION_MONTHS: u32 = 12;
pub const MAX_PROJECTION_MONTHS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionMonth {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub income_cents: i64,
    pub expense_cents: i64,
    pub investment_cents: i64,
    pub balance_cents: i64,
    pub invested_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionTotals {
    pub income_cents: i64,
    pub expense_cents: i64,
    pub investment_cents: i64,
    pub final_balance_cents: i64,
    pub final_invested_cents: i64,
    pub balance_on_period_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub months: Vec<ProjectionMonth>,
    pub totals: ProjectionTotals,
}

#[derive(Default)]
struct Flows {
    income: i64,
    expense: i64,
    investment: i64,
}

impl Flows {
    fn add(&mut self, e: &Entry) {
        match e.kind {
            TransactionKind::Income => self.income += e.amount_cents,
            TransactionKind::Expense => self.expense += e.amount_cents,
            TransactionKind::Investment => self.investment += e.investment_net(),
        }
    }

    fn net(&self) -> i64 {
        self.income - self.expense - self.investment
    }
}

/// Project `months` months starting with the current one.
///
/// `months` is clamped to `1..=MAX_PROJECTION_MONTHS`.
#[must_use]
pub fn project(
    entries: &[Entry],
    total_balance_cents: i64,
    total_invested_cents: i64,
    closing_day: u32,
    today: NaiveDate,
    months: u32,
) -> Projection {
    let months = months.clamp(1, MAX_PROJECTION_MONTHS);
    let dated: Vec<(NaiveDate, &Entry)> = entries.iter().map(|e| (effective_date(e, closing_day), e)).collect();

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = total_balance_cents;
    let mut invested = total_invested_cents;

    for offset in 0..months {
        let (year, month) = shift_month(today.year(), today.month(), i32::try_from(offset).unwrap_or(i32::MAX));
        let in_month = || {
            dated
                .iter()
                .filter(move |(date, _)| date.year() == year && date.month() == month)
        };

        let mut flows = Flows::default();
        in_month().for_each(|(_, e)| flows.add(e));

        if offset == 0 {
            let mut pending = Flows::default();
            in_month()
                .filter(|(date, _)| *date > today)
                .for_each(|(_, e)| pending.add(e));
            balance = total_balance_cents + pending.net();
            invested = total_invested_cents + pending.investment;
        } else {
            balance += flows.net();
            invested += flows.investment;
        }

        rows.push(ProjectionMonth {
            year,
            month,
            label: short_month_label(year, month),
            income_cents: flows.income,
            expense_cents: flows.expense,
            investment_cents: flows.investment,
            balance_cents: balance,
            invested_cents: invested,
        });
    }

    let income_cents: i64 = rows.iter().map(|r| r.income_cents).sum();
    let expense_cents: i64 = rows.iter().map(|r| r.expense_cents).sum();
    let investment_cents: i64 = rows.iter().map(|r| r.investment_cents).sum();
    let totals = ProjectionTotals {
        income_cents,
        expense_cents,
        investment_cents,
        final_balance_cents: rows.last().map_or(total_balance_cents, |r| r.balance_cents),
        final_invested_cents: rows.last().map_or(total_invested_cents, |r| r.invested_cents),
        balance_on_period_cents: income_cents - expense_cents - investment_cents,
    };

    Projection { months: rows, totals }
}

#[cfg(test)]
#[path = "projection_test.rs"]
mod tests;
