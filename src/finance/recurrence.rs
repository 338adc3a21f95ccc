//! Recurring transaction expansion.
//!
//! A recurring transaction is stored as one row per occurrence, all sharing a
//! `recurring_id`. Monthly series are anchored on the start day, so a series
//! starting on the 31st lands on the last day of shorter months and returns
//! to the 31st afterwards.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::calendar::add_months;

/// Upper bound on occurrences generated for a single series.
pub const MAX_OCCURRENCES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" | "diaria" => Some(Self::Daily),
            "weekly" | "semanal" => Some(Self::Weekly),
            "monthly" | "mensal" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// The `index`-th occurrence counted from `start`.
    fn nth(self, start: NaiveDate, index: usize) -> Option<NaiveDate> {
        let index = u64::try_from(index).ok()?;
        match self {
            Self::Daily => start.checked_add_days(Days::new(index)),
            Self::Weekly => start.checked_add_days(Days::new(index.checked_mul(7)?)),
            Self::Monthly => Some(add_months(start, i32::try_from(index).ok()?)),
        }
    }
}

/// Expand `[start, end]` into occurrence dates, capped at [`MAX_OCCURRENCES`].
#[must_use]
pub fn expand(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for index in 0..MAX_OCCURRENCES {
        let Some(date) = frequency.nth(start, index) else {
            break;
        };
        if date > end {
            break;
        }
        dates.push(date);
    }
    dates
}

#[cfg(test)]
#[path = "recurrence_test.rs"]
mod tests;
