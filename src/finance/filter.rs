//! Transaction listing filters: period windows and free-text search.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::{month_end_offset, month_start};
use super::report::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "period")]
pub enum PeriodFilter {
    #[default]
    CurrentMonth,
    /// Current month plus the next one.
    NextMonth,
    /// Current month plus the next six.
    SixMonths,
    All,
    Custom {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl PeriodFilter {
    /// Inclusive window relative to `today`; `None` means unbounded.
    #[must_use]
    pub fn range(self, today: NaiveDate) -> Option<DateRange> {
        let start = month_start(today);
        match self {
            Self::CurrentMonth => Some(DateRange { start, end: month_end_offset(today, 0) }),
            Self::NextMonth => Some(DateRange { start, end: month_end_offset(today, 1) }),
            Self::SixMonths => Some(DateRange { start, end: month_end_offset(today, 6) }),
            Self::All => None,
            Self::Custom { start, end } => Some(DateRange { start, end }),
        }
    }
}

/// The searchable face of a listed transaction.
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    pub date: NaiveDate,
    pub description: &'a str,
    pub category: Option<&'a str>,
    pub payment_method: Option<&'a str>,
    pub amount_cents: i64,
}

pub trait Listable {
    fn listing(&self) -> Listing<'_>;
}

/// Keep the items inside `period` that match `query`, newest first.
#[must_use]
pub fn apply<T: Listable>(mut items: Vec<T>, period: PeriodFilter, query: Option<&str>, today: NaiveDate) -> Vec<T> {
    let window = period.range(today);
    let needle = query.map(|q| fold_text(q.trim())).filter(|q| !q.is_empty());
    items.retain(|item| {
        let listing = item.listing();
        window.is_none_or(|w| w.contains(listing.date))
            && needle.as_deref().is_none_or(|q| matches_search(&listing, q))
    });
    items.sort_by(|a, b| b.listing().date.cmp(&a.listing().date));
    items
}

/// `needle` must already be folded with [`fold_text`].
#[must_use]
pub fn matches_search(listing: &Listing<'_>, needle: &str) -> bool {
    fold_text(listing.description).contains(needle)
        || listing.category.is_some_and(|c| fold_text(c).contains(needle))
        || listing.payment_method.is_some_and(|p| fold_text(p).contains(needle))
        || units_text(listing.amount_cents).contains(needle)
}

/// Amount in currency units without trailing zeros: 1250 -> "12.5", 10000 -> "100".
#[must_use]
pub fn units_text(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let (units, frac) = (abs / 100, abs % 100);
    match frac {
        0 => format!("{sign}{units}"),
        f if f % 10 == 0 => format!("{sign}{units}.{}", f / 10),
        f => format!("{sign}{units}.{f:02}"),
    }
}

/// Lowercase and strip the diacritics used in Portuguese and other Latin scripts.
#[must_use]
pub fn fold_text(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
