use super::*;
use crate::finance::fixtures::d;

#[test]
fn halfway_goal() {
    let p = goal_progress(100_000, 50_000, d(2025, 1, 1), d(2025, 1, 11), d(2025, 1, 6));
    assert!((p.progress_pct - 50.0).abs() < 1e-9);
    assert!((p.time_progress_pct - 50.0).abs() < 1e-9);
    assert_eq!(p.days_left, 5);
    assert_eq!(p.remaining_cents, 50_000);
    assert!(!p.completed);
}

#[test]
fn progress_is_capped_and_completed() {
    let p = goal_progress(10_000, 15_000, d(2025, 1, 1), d(2025, 2, 1), d(2025, 1, 2));
    assert!((p.progress_pct - 100.0).abs() < 1e-9);
    assert_eq!(p.remaining_cents, 0);
    assert!(p.completed);
}

#[test]
fn zero_target_counts_as_full() {
    let p = goal_progress(0, 0, d(2025, 1, 1), d(2025, 2, 1), d(2025, 1, 2));
    assert!((p.progress_pct - 100.0).abs() < 1e-9);
    assert!(p.completed);
}

#[test]
fn overdue_goal_has_negative_days_left() {
    let p = goal_progress(10_000, 0, d(2025, 1, 1), d(2025, 1, 10), d(2025, 1, 15));
    assert_eq!(p.days_left, -5);
    assert!((p.time_progress_pct - 100.0).abs() < 1e-9);
}

#[test]
fn zero_length_window() {
    let same = d(2025, 3, 1);
    assert!((goal_progress(1, 0, same, same, same).time_progress_pct - 100.0).abs() < 1e-9);
    assert!(goal_progress(1, 0, same, same, d(2025, 2, 28)).time_progress_pct.abs() < 1e-9);
}
