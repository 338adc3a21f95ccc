use super::*;

#[test]
fn kind_parse_accepts_english_and_portuguese() {
    assert_eq!(TransactionKind::parse("income"), Some(TransactionKind::Income));
    assert_eq!(TransactionKind::parse("Despesa"), Some(TransactionKind::Expense));
    assert_eq!(TransactionKind::parse(" investimento "), Some(TransactionKind::Investment));
    assert_eq!(TransactionKind::parse("transfer"), None);
}

#[test]
fn kind_serde_is_lowercase() {
    let json = serde_json::to_string(&TransactionKind::Investment).unwrap();
    assert_eq!(json, "\"investment\"");
}

#[test]
fn cents_from_units_rounds() {
    assert_eq!(cents_from_units(12.5), Some(1250));
    assert_eq!(cents_from_units(0.1 + 0.2), Some(30));
    assert_eq!(cents_from_units(19.999), Some(2000));
    assert_eq!(cents_from_units(f64::NAN), None);
    assert_eq!(cents_from_units(f64::INFINITY), None);
}

#[test]
fn format_units_pads_cents() {
    assert_eq!(format_units(1250), "12.50");
    assert_eq!(format_units(5), "0.05");
    assert_eq!(format_units(-1999), "-19.99");
}

#[test]
fn format_brl_groups_thousands() {
    assert_eq!(format_brl(123_456), "R$ 1.234,56");
    assert_eq!(format_brl(100), "R$ 1,00");
    assert_eq!(format_brl(123_456_789), "R$ 1.234.567,89");
    assert_eq!(format_brl(-50), "-R$ 0,50");
}

#[test]
fn variation_relative_to_absolute_previous() {
    assert!((variation_pct(150, 100) - 50.0).abs() < 1e-9);
    assert!((variation_pct(-50, -100) - 50.0).abs() < 1e-9);
    assert!((variation_pct(10, 0)).abs() < f64::EPSILON);
}

#[test]
fn investment_net_sign() {
    let mut e = Entry {
        id: Uuid::new_v4(),
        kind: TransactionKind::Investment,
        amount_cents: 300,
        date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        category_id: None,
        credit_card: false,
        card_bill_payment: false,
        investment_withdrawal: false,
    };
    assert_eq!(e.investment_net(), 300);
    e.investment_withdrawal = true;
    assert_eq!(e.investment_net(), -300);
}
