use super::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn daily_includes_end_date() {
    let dates = expand(d(2025, 3, 1), d(2025, 3, 5), Frequency::Daily);
    assert_eq!(dates.len(), 5);
    assert_eq!(dates.first(), Some(&d(2025, 3, 1)));
    assert_eq!(dates.last(), Some(&d(2025, 3, 5)));
}

#[test]
fn weekly_steps_seven_days() {
    let dates = expand(d(2025, 1, 1), d(2025, 1, 31), Frequency::Weekly);
    assert_eq!(dates, vec![d(2025, 1, 1), d(2025, 1, 8), d(2025, 1, 15), d(2025, 1, 22), d(2025, 1, 29)]);
}

#[test]
fn monthly_anchors_on_start_day() {
    let dates = expand(d(2025, 1, 31), d(2025, 5, 31), Frequency::Monthly);
    assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 31), d(2025, 4, 30), d(2025, 5, 31)]);
}

#[test]
fn end_before_start_is_empty() {
    assert!(expand(d(2025, 5, 2), d(2025, 5, 1), Frequency::Daily).is_empty());
}

#[test]
fn same_day_start_and_end_is_single() {
    assert_eq!(expand(d(2025, 5, 2), d(2025, 5, 2), Frequency::Monthly), vec![d(2025, 5, 2)]);
}

#[test]
fn long_series_is_capped() {
    let dates = expand(d(2020, 1, 1), d(2030, 1, 1), Frequency::Daily);
    assert_eq!(dates.len(), MAX_OCCURRENCES);
    assert_eq!(dates[MAX_OCCURRENCES - 1], d(2021, 5, 14));
}

#[test]
fn frequency_parse_aliases() {
    assert_eq!(Frequency::parse("mensal"), Some(Frequency::Monthly));
    assert_eq!(Frequency::parse("Weekly"), Some(Frequency::Weekly));
    assert_eq!(Frequency::parse("diaria"), Some(Frequency::Daily));
    assert_eq!(Frequency::parse("yearly"), None);
}
