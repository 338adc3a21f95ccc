use super::*;
use crate::finance::fixtures::{bill_payment, card, d, expense, income, invest, withdraw};

fn settings() -> LedgerSettings {
    LedgerSettings { initial_balance_cents: 0, initial_investment_cents: 0, card_closing_day: 25 }
}

#[test]
fn month_figures_split_cash_card_and_bills() {
    let today = d(2025, 6, 15);
    let entries = vec![
        income(500_000, d(2025, 6, 5)),
        expense(10_000, d(2025, 6, 6)),
        card(20_000, d(2025, 6, 7)),
        bill_payment(30_000, d(2025, 6, 10)),
        invest(50_000, d(2025, 6, 11)),
        withdraw(5_000, d(2025, 6, 12)),
        income(1, d(2025, 5, 31)),
    ];
    let summary = dashboard(&entries, &settings(), today);

    assert_eq!(summary.label, "Junho/2025");
    assert_eq!(summary.month_income.total_cents, 500_000);
    assert_eq!(summary.month_income.transaction_ids, vec![entries[0].id]);
    assert_eq!(summary.month_expenses.total_cents, 10_000);
    assert_eq!(summary.month_investments.total_cents, 45_000);
}

#[test]
fn card_bill_uses_closing_window() {
    let today = d(2025, 6, 15);
    let entries = vec![
        card(1_000, d(2025, 5, 24)),
        card(2_000, d(2025, 5, 25)),
        card(3_000, d(2025, 6, 24)),
        card(4_000, d(2025, 6, 25)),
        card(5_000, d(2025, 7, 3)),
    ];
    let summary = dashboard(&entries, &settings(), today);
    assert_eq!(summary.current_card_bill.total_cents, 5_000);
    assert_eq!(summary.planning_card_bill.total_cents, 9_000);
}

#[test]
fn pending_figures_only_count_future() {
    let today = d(2025, 6, 15);
    let entries = vec![
        income(1_000, d(2025, 6, 15)),
        income(2_000, d(2025, 6, 16)),
        expense(3_000, d(2025, 8, 1)),
        card(9_999, d(2025, 8, 1)),
        invest(4_000, d(2025, 7, 1)),
    ];
    let summary = dashboard(&entries, &settings(), today);
    assert_eq!(summary.pending_income.total_cents, 2_000);
    assert_eq!(summary.pending_expenses.total_cents, 3_000);
    assert_eq!(summary.pending_investments.total_cents, 4_000);
}

#[test]
fn variation_compares_with_previous_month_end() {
    let today = d(2025, 6, 15);
    let entries = vec![income(100_000, d(2025, 5, 10)), income(50_000, d(2025, 6, 1))];
    let summary = dashboard(&entries, &settings(), today);
    assert_eq!(summary.total_balance_cents, 150_000);
    assert!((summary.balance_variation_pct - 50.0).abs() < 1e-9);
}

#[test]
fn variation_is_zero_without_history() {
    let summary = dashboard(&[income(100, d(2025, 6, 1))], &settings(), d(2025, 6, 15));
    assert!(summary.balance_variation_pct.abs() < f64::EPSILON);
    assert!(summary.investment_variation_pct.abs() < f64::EPSILON);
}

#[test]
fn investment_variation() {
    let s = LedgerSettings { initial_investment_cents: 10_000, ..settings() };
    let entries = vec![invest(5_000, d(2025, 6, 2))];
    let summary = dashboard(&entries, &s, d(2025, 6, 15));
    assert_eq!(summary.total_invested_cents, 15_000);
    assert!((summary.investment_variation_pct - 50.0).abs() < 1e-9);
}
