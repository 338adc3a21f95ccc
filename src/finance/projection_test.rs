use super::*;
use crate::finance::fixtures::{card, d, expense, income, invest};

#[test]
fn month_zero_adds_only_pending_entries() {
    let today = d(2025, 6, 15);
    let entries = vec![
        income(100_000, d(2025, 6, 5)),
        income(40_000, d(2025, 6, 20)),
        expense(10_000, d(2025, 6, 28)),
        invest(5_000, d(2025, 6, 30)),
    ];
    let p = project(&entries, 100_000, 0, 25, today, 1);
    assert_eq!(p.months.len(), 1);
    let m0 = &p.months[0];
    assert_eq!(m0.label, "Jun/25");
    assert_eq!(m0.income_cents, 140_000);
    assert_eq!(m0.expense_cents, 10_000);
    assert_eq!(m0.balance_cents, 100_000 + 40_000 - 10_000 - 5_000);
    assert_eq!(m0.invested_cents, 5_000);
}

#[test]
fn later_months_accumulate() {
    let today = d(2025, 6, 15);
    let entries = vec![
        income(300_000, d(2025, 7, 5)),
        expense(100_000, d(2025, 7, 10)),
        income(300_000, d(2025, 8, 5)),
        invest(50_000, d(2025, 8, 6)),
    ];
    let p = project(&entries, 10_000, 1_000, 25, today, 3);
    assert_eq!(p.months[1].balance_cents, 10_000 + 200_000);
    assert_eq!(p.months[2].balance_cents, 10_000 + 200_000 + 250_000);
    assert_eq!(p.months[2].invested_cents, 51_000);
    assert_eq!(p.totals.final_balance_cents, 460_000);
    assert_eq!(p.totals.balance_on_period_cents, 600_000 - 100_000 - 50_000);
}

#[test]
fn late_card_purchase_counts_next_month() {
    let today = d(2025, 6, 1);
    let entries = vec![card(7_000, d(2025, 6, 26))];
    let p = project(&entries, 0, 0, 25, today, 2);
    assert_eq!(p.months[0].expense_cents, 0);
    assert_eq!(p.months[1].expense_cents, 7_000);
    assert_eq!(p.months[1].balance_cents, -7_000);
}

#[test]
fn projection_crosses_year_end() {
    let p = project(&[], 0, 0, 25, d(2025, 11, 3), 4);
    let labels: Vec<&str> = p.months.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["Nov/25", "Dez/25", "Jan/26", "Fev/26"]);
}

#[test]
fn months_are_clamped() {
    assert_eq!(project(&[], 0, 0, 25, d(2025, 1, 1), 0).months.len(), 1);
    assert_eq!(project(&[], 0, 0, 25, d(2025, 1, 1), 10_000).months.len(), MAX_PROJECTION_MONTHS as usize);
}
