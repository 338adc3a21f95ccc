use super::*;
use crate::finance::fixtures::{bill_payment, card, d, expense};

// =============================================================================
// cycles
// =============================================================================

#[test]
fn cycle_spans_previous_to_current_closing() {
    let cycle = billing_cycle(2025, 3, 25);
    assert_eq!(cycle.start, d(2025, 2, 25));
    assert_eq!(cycle.end, d(2025, 3, 25));
    assert!(cycle.contains(d(2025, 2, 25)));
    assert!(cycle.contains(d(2025, 3, 24)));
    assert!(!cycle.contains(d(2025, 3, 25)));
    assert_eq!(cycle.last_day(), d(2025, 3, 24));
}

#[test]
fn cycle_crosses_year_boundary() {
    let cycle = billing_cycle(2025, 1, 10);
    assert_eq!(cycle.start, d(2024, 12, 10));
    assert_eq!(cycle.end, d(2025, 1, 10));
}

#[test]
fn cycle_clamps_closing_day_31() {
    let cycle = billing_cycle(2025, 3, 31);
    assert_eq!(cycle.start, d(2025, 2, 28));
    assert_eq!(cycle.end, d(2025, 3, 31));
}

#[test]
fn purchase_before_closing_goes_to_this_statement() {
    assert_eq!(statement_month(d(2025, 3, 24), 25), (2025, 3));
    assert_eq!(statement_month(d(2025, 3, 25), 25), (2025, 4));
    assert_eq!(statement_month(d(2025, 12, 30), 25), (2026, 1));
}

#[test]
fn statement_month_agrees_with_cycle() {
    for day in 1..=28 {
        let date = d(2025, 2, day);
        let (y, m) = statement_month(date, 31);
        assert!(billing_cycle(y, m, 31).contains(date), "{date} not inside its own cycle");
    }
}

#[test]
fn next_closing_date_rolls_on_closing_day() {
    assert_eq!(next_closing_date(d(2025, 5, 24), 25), d(2025, 5, 25));
    assert_eq!(next_closing_date(d(2025, 5, 25), 25), d(2025, 6, 25));
    assert_eq!(next_closing_date(d(2025, 12, 31), 25), d(2026, 1, 25));
}

#[test]
fn billing_hint_reflects_statement() {
    assert_eq!(billing_hint(d(2025, 7, 3), 10), StatementHint::CurrentMonth);
    assert_eq!(billing_hint(d(2025, 7, 10), 10), StatementHint::NextMonth);
}

// =============================================================================
// effective_date
// =============================================================================

#[test]
fn late_card_purchase_moves_to_next_month() {
    let e = card(1000, d(2025, 1, 27));
    assert_eq!(effective_date(&e, 25), d(2025, 2, 1));
}

#[test]
fn early_card_purchase_keeps_date() {
    let e = card(1000, d(2025, 1, 24));
    assert_eq!(effective_date(&e, 25), d(2025, 1, 24));
}

#[test]
fn non_card_expense_keeps_date() {
    let e = expense(1000, d(2025, 1, 27));
    assert_eq!(effective_date(&e, 25), d(2025, 1, 27));
}

#[test]
fn december_card_purchase_moves_to_january() {
    let e = card(1000, d(2025, 12, 26));
    assert_eq!(effective_date(&e, 25), d(2026, 1, 1));
}

// =============================================================================
// reconcile_bill
// =============================================================================

#[test]
fn payment_before_closing_settles_previous_statement() {
    let entries = vec![
        card(10_000, d(2025, 3, 26)),
        card(5_000, d(2025, 4, 24)),
        card(7_000, d(2025, 4, 25)),
        card(9_000, d(2025, 3, 20)),
        expense(1_234, d(2025, 4, 1)),
        bill_payment(15_000, d(2025, 4, 10)),
    ];
    let rec = reconcile_bill(&entries, d(2025, 5, 5), 15_000, 25);
    assert_eq!((rec.statement_year, rec.statement_month), (2025, 4));
    assert_eq!(rec.cycle_start, d(2025, 3, 25));
    assert_eq!(rec.cycle_end, d(2025, 4, 24));
    assert_eq!(rec.sum_cents, 15_000);
    assert_eq!(rec.count, 2);
    assert_eq!(rec.diff_cents, 0);
    assert_eq!(rec.status, ReconcileStatus::Match);
}

#[test]
fn payment_after_closing_settles_current_statement() {
    let entries = vec![card(8_000, d(2025, 5, 1))];
    let rec = reconcile_bill(&entries, d(2025, 5, 26), 8_500, 25);
    assert_eq!((rec.statement_year, rec.statement_month), (2025, 5));
    assert_eq!(rec.diff_cents, 500);
    assert_eq!(rec.status, ReconcileStatus::Higher);
}

#[test]
fn underpayment_is_lower() {
    let entries = vec![card(8_000, d(2025, 5, 1))];
    let rec = reconcile_bill(&entries, d(2025, 5, 26), 7_000, 25);
    assert_eq!(rec.diff_cents, -1_000);
    assert_eq!(rec.status, ReconcileStatus::Lower);
    assert_eq!(rec.transaction_ids, vec![entries[0].id]);
}

#[test]
fn empty_cycle_reports_zero_sum() {
    let rec = reconcile_bill(&[], d(2025, 5, 26), 100, 25);
    assert_eq!(rec.sum_cents, 0);
    assert_eq!(rec.count, 0);
    assert_eq!(rec.status, ReconcileStatus::Higher);
}
