//! Period reports: evolution, net worth and category breakdown.
//!
//! All three place entries at their effective date and group them into
//! buckets of the requested granularity. Buckets are keyed by their first
//! day so output is always chronological.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::effective_date;
use super::calendar::{clamped_date, short_month_label};
use super::filter::fold_text;
use super::{Entry, TransactionKind};

/// Category label for entries whose category no longer exists.
pub const UNCATEGORIZED: &str = "Outros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// First day of the bucket containing `date`.
    #[must_use]
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => date
                .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
                .unwrap_or(date),
            Self::Monthly => clamped_date(date.year(), date.month(), 1),
            Self::Quarterly => clamped_date(date.year(), (date.month() - 1) / 3 * 3 + 1, 1),
            Self::Yearly => clamped_date(date.year(), 1, 1),
        }
    }

    /// Display label of the bucket starting at `start`.
    #[must_use]
    pub fn label(self, start: NaiveDate) -> String {
        match self {
            Self::Daily => start.format("%d/%m/%y").to_string(),
            Self::Weekly => {
                let week = start.iso_week();
                format!("Sem {}/{:02}", week.week(), week.year().rem_euclid(100))
            }
            Self::Monthly => short_month_label(start.year(), start.month()),
            Self::Quarterly => format!("T{} {}", (start.month() - 1) / 3 + 1, start.year()),
            Self::Yearly => start.year().to_string(),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// =============================================================================
// EVOLUTION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvolutionPoint {
    pub label: String,
    pub start: NaiveDate,
    pub income_cents: i64,
    pub expense_cents: i64,
    pub investment_cents: i64,
}

/// Income, expenses and net investment per bucket. Bill payments are skipped.
#[must_use]
pub fn evolution(
    entries: &[Entry],
    range: DateRange,
    granularity: Granularity,
    accumulated: bool,
    closing_day: u32,
) -> Vec<EvolutionPoint> {
    let mut buckets: BTreeMap<NaiveDate, (i64, i64, i64)> = BTreeMap::new();
    for e in entries.iter().filter(|e| !e.card_bill_payment) {
        let date = effective_date(e, closing_day);
        if !range.contains(date) {
            continue;
        }
        let slot = buckets.entry(granularity.bucket_start(date)).or_default();
        match e.kind {
            TransactionKind::Income => slot.0 += e.amount_cents,
            TransactionKind::Expense => slot.1 += e.amount_cents,
            TransactionKind::Investment => slot.2 += e.investment_net(),
        }
    }

    let mut running = (0, 0, 0);
    buckets
        .into_iter()
        .map(|(start, (income, expense, investment))| {
            let (income, expense, investment) = if accumulated {
                running = (running.0 + income, running.1 + expense, running.2 + investment);
                running
            } else {
                (income, expense, investment)
            };
            EvolutionPoint {
                label: granularity.label(start),
                start,
                income_cents: income,
                expense_cents: expense,
                investment_cents: investment,
            }
        })
        .collect()
}

// =============================================================================
// NET WORTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetWorthPoint {
    pub label: String,
    pub start: NaiveDate,
    pub net_worth_cents: i64,
}

/// Running cash net worth, sampled at the last entry of each bucket in range.
///
/// The running total starts at the initial balance and covers the whole
/// ledger, so the first bucket already includes everything before
/// `range.start`.
#[must_use]
pub fn net_worth(
    entries: &[Entry],
    initial_balance_cents: i64,
    range: DateRange,
    granularity: Granularity,
    closing_day: u32,
) -> Vec<NetWorthPoint> {
    let mut dated: Vec<(NaiveDate, &Entry)> = entries.iter().map(|e| (effective_date(e, closing_day), e)).collect();
    dated.sort_by_key(|(date, _)| *date);

    let mut running = initial_balance_cents;
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (date, e) in dated {
        match e.kind {
            TransactionKind::Income => running += e.amount_cents,
            TransactionKind::Expense if !e.card_bill_payment => running -= e.amount_cents,
            _ => {}
        }
        if range.contains(date) {
            buckets.insert(granularity.bucket_start(date), running);
        }
    }

    buckets
        .into_iter()
        .map(|(start, net_worth_cents)| NetWorthPoint { label: granularity.label(start), start, net_worth_cents })
        .collect()
}

// =============================================================================
// CATEGORY SUMMARY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Value,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total_cents: i64,
    pub share_pct: f64,
}

/// Totals per category name for one transaction kind.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn category_summary(
    entries: &[Entry],
    category_names: &HashMap<Uuid, String>,
    range: DateRange,
    kind: TransactionKind,
    sort: (SortKey, SortDirection),
    closing_day: u32,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for e in entries
        .iter()
        .filter(|e| e.kind == kind && !e.card_bill_payment && range.contains(effective_date(e, closing_day)))
    {
        let name = e
            .category_id
            .and_then(|id| category_names.get(&id))
            .map_or(UNCATEGORIZED, String::as_str);
        *totals.entry(name).or_default() += e.amount_cents;
    }

    let grand_total: i64 = totals.values().sum();
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, total_cents)| CategoryTotal {
            name: name.to_owned(),
            total_cents,
            share_pct: if grand_total == 0 { 0.0 } else { total_cents as f64 / grand_total as f64 * 100.0 },
        })
        .collect();

    let (key, direction) = sort;
    rows.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Value => a.total_cents.cmp(&b.total_cents),
            SortKey::Name => fold_text(&a.name).cmp(&fold_text(&b.name)),
        };
        let ordering = ordering.then_with(|| a.name.cmp(&b.name));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
