//! Ledger builders for finance tests.

use chrono::NaiveDate;
use uuid::Uuid;

use super::{Entry, TransactionKind};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
}

fn entry(kind: TransactionKind, amount_cents: i64, date: NaiveDate) -> Entry {
    Entry {
        id: Uuid::new_v4(),
        kind,
        amount_cents,
        date,
        category_id: None,
        credit_card: false,
        card_bill_payment: false,
        investment_withdrawal: false,
    }
}

pub fn income(amount_cents: i64, date: NaiveDate) -> Entry {
    entry(TransactionKind::Income, amount_cents, date)
}

pub fn expense(amount_cents: i64, date: NaiveDate) -> Entry {
    entry(TransactionKind::Expense, amount_cents, date)
}

pub fn card(amount_cents: i64, date: NaiveDate) -> Entry {
    Entry { credit_card: true, ..entry(TransactionKind::Expense, amount_cents, date) }
}

pub fn bill_payment(amount_cents: i64, date: NaiveDate) -> Entry {
    Entry { card_bill_payment: true, ..entry(TransactionKind::Expense, amount_cents, date) }
}

pub fn invest(amount_cents: i64, date: NaiveDate) -> Entry {
    entry(TransactionKind::Investment, amount_cents, date)
}

pub fn withdraw(amount_cents: i64, date: NaiveDate) -> Entry {
    Entry { investment_withdrawal: true, ..entry(TransactionKind::Investment, amount_cents, date) }
}

pub fn with_category(mut e: Entry, category_id: Uuid) -> Entry {
    e.category_id = Some(category_id);
    e
}
