use chrono::NaiveDate;

use cohort::{
    AsOfDate, CohortEntry, CohortError, CohortQuery, LabelRecord, StateRecord, resolve_cohort,
};

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn label(entity_id: i64, as_of_date: &str, name: &str) -> LabelRecord {
    LabelRecord::new(entity_id, as_of_date, "1 month", name, "binary", 0)
}

fn state(entity_id: i64, as_of_date: &str, one: bool, two: bool) -> StateRecord {
    StateRecord::sparse(entity_id, day(as_of_date), one, two)
}

fn dates(values: &[&str]) -> Vec<AsOfDate> {
    values.iter().map(|value| AsOfDate::from(day(value))).collect()
}

fn entry(entity_id: i64, as_of_date: &str) -> CohortEntry {
    CohortEntry {
        entity_id,
        as_of_date: day(as_of_date),
    }
}

fn booking_query() -> CohortQuery {
    CohortQuery::new("booking", "binary", "1 month")
}

#[test]
fn booking_binary_one_month_scenario() {
    let labels = vec![LabelRecord::new(
        1,
        "2016-02-01",
        "1 month",
        "booking",
        "binary",
        0,
    )];
    let states = vec![state(1, "2016-02-01", true, true)];
    let as_of_dates = dates(&["2016-02-01"]);

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);

    // Flipping either state flag empties the cohort.
    for (one, two) in [(false, true), (true, false)] {
        let states = vec![state(1, "2016-02-01", one, two)];
        let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
        assert!(cohort.is_empty());
    }
}

#[test]
fn label_name_filter_excludes_other_names() {
    let labels = vec![
        label(1, "2016-02-01", "booking"),
        label(2, "2016-02-01", "inspection"),
    ];
    let states = vec![
        state(1, "2016-02-01", true, true),
        state(2, "2016-02-01", true, true),
    ];
    let as_of_dates = dates(&["2016-02-01"]);

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);
}

#[test]
fn label_type_and_timespan_filters_exclude_mismatches() {
    let labels = vec![
        LabelRecord::new(1, "2016-02-01", "1 month", "booking", "binary", 0),
        LabelRecord::new(2, "2016-02-01", "1 month", "booking", "regression", 0),
        LabelRecord::new(3, "2016-02-01", "3 month", "booking", "binary", 0),
    ];
    let states = vec![
        state(1, "2016-02-01", true, true),
        state(2, "2016-02-01", true, true),
        state(3, "2016-02-01", true, true),
    ];
    let as_of_dates = dates(&["2016-02-01"]);

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);
}

#[test]
fn rows_without_a_state_row_are_excluded() {
    let labels = vec![label(1, "2016-02-01", "booking"), label(2, "2016-02-01", "booking")];
    let states = vec![state(1, "2016-02-01", true, true)];
    let as_of_dates = dates(&["2016-02-01"]);

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);
}

#[test]
fn output_dates_are_a_subset_of_supplied_dates() {
    let labels = vec![
        label(1, "2016-02-01", "booking"),
        label(1, "2016-03-01", "booking"),
    ];
    let states = vec![
        state(1, "2016-02-01", true, true),
        state(1, "2016-03-01", true, true),
    ];
    let as_of_dates = dates(&["2016-02-01"]);

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);
}

#[test]
fn datetime_evaluation_dates_match_on_the_date_portion() {
    let labels = vec![label(1, "2016-02-01", "booking")];
    let states = vec![state(1, "2016-02-01", true, true)];
    let as_of_dates = vec![AsOfDate::from(day("2016-02-01").and_hms_opt(9, 30, 0).unwrap())];

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);
}

#[test]
fn output_is_ordered_by_entity_then_date() {
    let labels = vec![
        label(2, "2016-02-01", "booking"),
        label(1, "2016-03-01", "booking"),
        label(1, "2016-02-01", "booking"),
        label(2, "2016-01-01", "booking"),
    ];
    let states = vec![
        state(1, "2016-02-01", true, true),
        state(1, "2016-03-01", true, true),
        state(2, "2016-01-01", true, true),
        state(2, "2016-02-01", true, true),
    ];
    let as_of_dates = dates(&["2016-01-01", "2016-02-01", "2016-03-01"]);

    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(
        cohort,
        vec![
            entry(1, "2016-02-01"),
            entry(1, "2016-03-01"),
            entry(2, "2016-01-01"),
            entry(2, "2016-02-01"),
        ]
    );
}

#[test]
fn resolution_is_idempotent() {
    let labels = vec![
        label(1, "2016-02-01", "booking"),
        label(2, "2016-02-01", "booking"),
    ];
    let states = vec![
        state(1, "2016-02-01", true, true),
        state(2, "2016-02-01", true, false),
    ];
    let as_of_dates = dates(&["2016-02-01"]);

    let first = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    let second = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_labels_yield_an_empty_cohort() {
    let states = vec![state(1, "2016-02-01", true, true)];
    let as_of_dates = dates(&["2016-02-01"]);

    let cohort = resolve_cohort(&[], &states, &as_of_dates, &booking_query()).unwrap();
    assert!(cohort.is_empty());
}

#[test]
fn empty_date_set_yields_an_empty_cohort() {
    let labels = vec![label(1, "2016-02-01", "booking")];
    let states = vec![state(1, "2016-02-01", true, true)];

    let cohort = resolve_cohort(&labels, &states, &[], &booking_query()).unwrap();
    assert!(cohort.is_empty());
}

#[test]
fn malformed_label_date_is_a_format_error() {
    let labels = vec![label(1, "02/01/2016", "booking")];
    let states = vec![state(1, "2016-02-01", true, true)];
    let as_of_dates = dates(&["2016-02-01"]);

    let err = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap_err();
    match err {
        CohortError::Format { value } => assert_eq!(value, "02/01/2016"),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn required_state_conjunction_can_be_narrowed() {
    let labels = vec![label(1, "2016-02-01", "booking")];
    let states = vec![state(1, "2016-02-01", true, false)];
    let as_of_dates = dates(&["2016-02-01"]);

    // state_two is false, so the default conjunction excludes the row...
    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    assert!(cohort.is_empty());

    // ...but a query that only requires state_one admits it.
    let query = booking_query().with_required_states(["state_one"]);
    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &query).unwrap();
    assert_eq!(cohort, vec![entry(1, "2016-02-01")]);
}

#[test]
fn one_state_row_serves_multiple_label_definitions() {
    let labels = vec![
        LabelRecord::new(1, "2016-02-01", "1 month", "booking", "binary", 0),
        LabelRecord::new(1, "2016-02-01", "3 month", "booking", "binary", 1),
    ];
    let states = vec![state(1, "2016-02-01", true, true)];
    let as_of_dates = dates(&["2016-02-01"]);

    let one_month = resolve_cohort(&labels, &states, &as_of_dates, &booking_query()).unwrap();
    let three_month = resolve_cohort(
        &labels,
        &states,
        &as_of_dates,
        &CohortQuery::new("booking", "binary", "3 month"),
    )
    .unwrap();
    assert_eq!(one_month, vec![entry(1, "2016-02-01")]);
    assert_eq!(three_month, vec![entry(1, "2016-02-01")]);
}
