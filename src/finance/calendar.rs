//! Month arithmetic for billing cycles, recurrences and report buckets.
//!
//! Months are 1-based. Days that do not exist in a target month (31 Feb,
//! closing day 31 in April) clamp to the month's last day.

use chrono::{Datelike, NaiveDate};

/// Month names as shown to users (pt-BR).
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub const MONTH_ABBREVIATIONS: [&str; 12] =
    ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez"];

/// `"Mmm/yy"` label for a month, e.g. `Out/26`.
#[must_use]
pub fn short_month_label(year: i32, month: u32) -> String {
    let idx = usize::try_from(month.clamp(1, 12) - 1).unwrap_or(0);
    format!("{}/{:02}", MONTH_ABBREVIATIONS[idx], year.rem_euclid(100))
}

/// `"Month/yyyy"` label for a month, e.g. `Outubro/2026`.
#[must_use]
pub fn long_month_label(year: i32, month: u32) -> String {
    let idx = usize::try_from(month.clamp(1, 12) - 1).unwrap_or(0);
    format!("{}/{year}", MONTH_NAMES[idx])
}

/// Number of days in `month` of `year`.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

/// Move `(year, month)` by `delta` months.
#[must_use]
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let y = zero_based.div_euclid(12);
    let m = zero_based.rem_euclid(12) + 1;
    (i32::try_from(y).unwrap_or(if y < 0 { i32::MIN } else { i32::MAX }), u32::try_from(m).unwrap_or(1))
}

/// Build a date, clamping `day` into the month. Saturates at chrono's range.
#[must_use]
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    clamped_date(date.year(), date.month(), 1)
}

#[must_use]
pub fn month_end(date: NaiveDate) -> NaiveDate {
    clamped_date(date.year(), date.month(), 31)
}

/// First day of the month `delta` months away from `date`'s month.
#[must_use]
pub fn month_start_offset(date: NaiveDate, delta: i32) -> NaiveDate {
    let (y, m) = shift_month(date.year(), date.month(), delta);
    clamped_date(y, m, 1)
}

/// Last day of the month `delta` months away from `date`'s month.
#[must_use]
pub fn month_end_offset(date: NaiveDate, delta: i32) -> NaiveDate {
    let (y, m) = shift_month(date.year(), date.month(), delta);
    clamped_date(y, m, 31)
}

/// Same day-of-month `n` months later (or earlier), clamped to month length.
#[must_use]
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let (y, m) = shift_month(date.year(), date.month(), n);
    clamped_date(y, m, date.day())
}

/// The card statement closing date of `(year, month)`.
#[must_use]
pub fn closing_date(year: i32, month: u32, closing_day: u32) -> NaiveDate {
    clamped_date(year, month, closing_day)
}

/// Closing date of the month `delta` months away from `date`'s month.
#[must_use]
pub fn closing_date_offset(date: NaiveDate, delta: i32, closing_day: u32) -> NaiveDate {
    let (y, m) = shift_month(date.year(), date.month(), delta);
    closing_date(y, m, closing_day)
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
