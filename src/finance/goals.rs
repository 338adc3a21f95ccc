//! Savings-goal progress.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub progress_pct: f64,
    pub time_progress_pct: f64,
    /// Negative once the deadline has passed.
    pub days_left: i64,
    pub remaining_cents: i64,
    pub completed: bool,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn goal_progress(
    target_cents: i64,
    current_cents: i64,
    creation_date: NaiveDate,
    deadline: NaiveDate,
    today: NaiveDate,
) -> GoalProgress {
    let progress_pct = if target_cents <= 0 {
        100.0
    } else {
        (current_cents as f64 / target_cents as f64 * 100.0).clamp(0.0, 100.0)
    };

    let window = (deadline - creation_date).num_days();
    let elapsed = (today - creation_date).num_days();
    let time_progress_pct = if window <= 0 {
        if today >= deadline { 100.0 } else { 0.0 }
    } else {
        (elapsed as f64 / window as f64 * 100.0).clamp(0.0, 100.0)
    };

    GoalProgress {
        progress_pct,
        time_progress_pct,
        days_left: (deadline - today).num_days(),
        remaining_cents: (target_cents - current_cents).max(0),
        completed: current_cents >= target_cents,
    }
}

#[cfg(test)]
#[path = "goals_test.rs"]
mod tests;
