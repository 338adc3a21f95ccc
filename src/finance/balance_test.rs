use super::*;
use crate::finance::fixtures::{bill_payment, card, d, expense, income, invest, withdraw};

fn settings(initial: i64, closing_day: u32) -> LedgerSettings {
    LedgerSettings { initial_balance_cents: initial, initial_investment_cents: 0, card_closing_day: closing_day }
}

#[test]
fn empty_ledger_is_initial_balance() {
    assert_eq!(total_balance(&[], &settings(12_345, 25), d(2025, 6, 1)), 12_345);
}

#[test]
fn income_and_plain_expense() {
    let entries = vec![income(100_000, d(2025, 6, 1)), expense(30_000, d(2025, 6, 2))];
    assert_eq!(total_balance(&entries, &settings(0, 25), d(2025, 6, 10)), 70_000);
}

#[test]
fn future_entries_are_ignored() {
    let entries = vec![income(100_000, d(2025, 6, 11)), expense(30_000, d(2025, 6, 10))];
    assert_eq!(total_balance(&entries, &settings(0, 25), d(2025, 6, 10)), -30_000);
}

#[test]
fn bill_payment_is_excluded() {
    let entries = vec![income(50_000, d(2025, 6, 1)), bill_payment(20_000, d(2025, 6, 5))];
    assert_eq!(total_balance(&entries, &settings(0, 25), d(2025, 6, 10)), 50_000);
}

#[test]
fn card_purchases_before_next_closing_count() {
    // today before closing: next closing is 2025-06-25, so every past purchase counts.
    let entries = vec![card(1_000, d(2025, 5, 30)), card(2_000, d(2025, 6, 9))];
    assert_eq!(total_balance(&entries, &settings(0, 25), d(2025, 6, 10)), -3_000);
}

#[test]
fn card_purchase_on_closing_day_counts() {
    let entries = vec![card(1_000, d(2025, 6, 25))];
    assert_eq!(total_balance(&entries, &settings(0, 25), d(2025, 6, 25)), -1_000);
}

#[test]
fn investments_move_cash() {
    let entries = vec![invest(10_000, d(2025, 6, 1)), withdraw(4_000, d(2025, 6, 2))];
    assert_eq!(total_balance(&entries, &settings(20_000, 25), d(2025, 6, 10)), 14_000);
}

#[test]
fn total_invested_includes_initial_and_net() {
    let entries = vec![
        invest(10_000, d(2025, 1, 1)),
        withdraw(3_000, d(2025, 2, 1)),
        invest(5_000, d(2025, 12, 1)),
        income(99_999, d(2025, 1, 1)),
    ];
    assert_eq!(total_invested(&entries, 1_000, d(2025, 6, 1)), 8_000);
}

#[test]
fn cash_balance_ignores_investments_and_bill_payments() {
    let entries = vec![
        income(10_000, d(2025, 1, 1)),
        expense(2_000, d(2025, 1, 2)),
        card(1_000, d(2025, 1, 3)),
        bill_payment(1_000, d(2025, 1, 20)),
        invest(5_000, d(2025, 1, 4)),
        income(7_000, d(2025, 2, 1)),
    ];
    assert_eq!(cash_balance_as_of(&entries, 500, d(2025, 1, 31)), 7_500);
}
