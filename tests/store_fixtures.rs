use chrono::NaiveDate;

use cohort::fixtures::{
    label_row, provision_dense_states, provision_feature_tables, provision_labels,
    provision_outcome_events, provision_sparse_states, sparse_state_row,
};
use cohort::{
    AsOfDate, CohortError, CohortQuery, LabelRecord, MemoryStore, RelationalStore, StateRecord,
    TableShape, TestFixture, Value, label_rows, resolve_cohort, resolve_cohort_from_store,
    state_rows,
};

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn booking_store() -> MemoryStore {
    let store = MemoryStore::new();
    provision_labels(
        &store,
        vec![
            label_row(1, "2016-02-01", "1 month", "booking", "binary", 0),
            label_row(1, "2016-03-01", "1 month", "booking", "binary", 1),
            label_row(2, "2016-02-01", "1 month", "booking", "binary", 0),
            label_row(3, "2016-02-01", "1 month", "inspection", "binary", 1),
        ],
    )
    .unwrap();
    provision_sparse_states(
        &store,
        vec![
            sparse_state_row(1, "2016-02-01", true, true),
            sparse_state_row(1, "2016-03-01", true, true),
            sparse_state_row(2, "2016-02-01", true, false),
            sparse_state_row(3, "2016-02-01", true, true),
        ],
    )
    .unwrap();
    store
}

#[test]
fn store_sourced_resolution_matches_the_pure_resolver() {
    let store = booking_store();
    let as_of_dates = vec![
        AsOfDate::from(day("2016-02-01")),
        AsOfDate::from(day("2016-03-01")),
    ];
    let query = CohortQuery::new("booking", "binary", "1 month");

    let from_store =
        resolve_cohort_from_store(&store, "labels", "sparse_states", &as_of_dates, &query)
            .unwrap();

    let labels: Vec<LabelRecord> = label_rows(&store, "labels").unwrap();
    let states: Vec<StateRecord> = state_rows(&store, "sparse_states").unwrap();
    let pure = resolve_cohort(&labels, &states, &as_of_dates, &query).unwrap();

    assert_eq!(from_store, pure);
    assert_eq!(from_store.len(), 2, "entity 2 fails state_two, entity 3 is inspection");
    assert!(from_store.iter().all(|entry| entry.entity_id == 1));
}

#[test]
fn provisioning_replaces_an_existing_table() {
    let store = booking_store();
    provision_labels(
        &store,
        vec![label_row(9, "2016-02-01", "1 month", "booking", "binary", 1)],
    )
    .unwrap();

    let labels = label_rows(&store, "labels").unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].entity_id, 9);
}

#[test]
fn decoded_label_rows_carry_iso_date_strings() {
    let store = booking_store();
    let labels = label_rows(&store, "labels").unwrap();
    assert_eq!(labels[0].as_of_date, "2016-02-01");
    assert_eq!(labels[1].as_of_date, "2016-03-01");
}

#[test]
fn decoded_state_rows_expose_every_boolean_column() {
    let store = MemoryStore::new();
    let shape = TableShape::new(
        "wide_states",
        vec![
            ("entity_id".to_string(), cohort::ColumnType::Int),
            ("as_of_date".to_string(), cohort::ColumnType::Date),
            ("state_one".to_string(), cohort::ColumnType::Bool),
            ("state_two".to_string(), cohort::ColumnType::Bool),
            ("state_three".to_string(), cohort::ColumnType::Bool),
        ],
    );
    store
        .provision(
            shape,
            vec![vec![
                1.into(),
                "2016-02-01".into(),
                true.into(),
                true.into(),
                false.into(),
            ]],
        )
        .unwrap();

    let states = state_rows(&store, "wide_states").unwrap();
    assert_eq!(states[0].flags.len(), 3);
    assert_eq!(states[0].flag("state_three"), Some(false));

    let query = CohortQuery::new("booking", "binary", "1 month")
        .with_required_states(["state_one", "state_two", "state_three"]);
    let labels = vec![LabelRecord::new(1, "2016-02-01", "1 month", "booking", "binary", 0)];
    let as_of_dates = vec![AsOfDate::from(day("2016-02-01"))];
    let cohort = resolve_cohort(&labels, &states, &as_of_dates, &query).unwrap();
    assert!(cohort.is_empty(), "state_three is false");
}

#[test]
fn missing_required_column_is_a_schema_error() {
    let store = MemoryStore::new();
    let shape = TableShape::new(
        "labels",
        vec![
            ("entity_id".to_string(), cohort::ColumnType::Int),
            ("as_of_date".to_string(), cohort::ColumnType::Date),
        ],
    );
    store.provision(shape, Vec::new()).unwrap();

    let err = label_rows(&store, "labels").unwrap_err();
    match err {
        CohortError::Schema { relation, column, .. } => {
            assert_eq!(relation, "labels");
            assert_eq!(column, "label_timespan");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn scanning_an_unknown_table_fails() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.scan("labels"),
        Err(CohortError::UnknownTable(_))
    ));
}

#[test]
fn creating_a_table_twice_fails_without_provisioning() {
    let store = MemoryStore::new();
    store.create(TableShape::labels()).unwrap();
    assert!(matches!(
        store.create(TableShape::labels()),
        Err(CohortError::TableExists(_))
    ));
}

#[test]
fn duplicate_sparse_state_keys_are_rejected_at_insertion() {
    let store = MemoryStore::new();
    store.create(TableShape::sparse_states()).unwrap();
    store
        .insert("sparse_states", sparse_state_row(1, "2016-02-01", true, true))
        .unwrap();
    let err = store
        .insert("sparse_states", sparse_state_row(1, "2016-02-01", false, false))
        .unwrap_err();
    assert!(matches!(err, CohortError::DuplicateKey { .. }));
}

#[test]
fn feature_tables_are_numbered_with_offset_columns() {
    let store = MemoryStore::new();
    provision_feature_tables(
        &store,
        vec![
            vec![vec![1.into(), "2016-02-01".into(), 10.into(), 11.into()]],
            vec![vec![1.into(), "2016-02-01".into(), 20.into(), 21.into()]],
        ],
    )
    .unwrap();

    let shape0 = store.shape("features0").unwrap();
    assert_eq!(shape0.columns[2].0, "f1");
    let shape1 = store.shape("features1").unwrap();
    assert_eq!(shape1.columns[2].0, "f3");
    assert_eq!(store.scan("features1").unwrap().len(), 1);
}

#[test]
fn dense_states_and_outcome_events_round_trip_verbatim() {
    let store = MemoryStore::new();
    let start = day("2016-01-01").and_hms_opt(0, 0, 0).unwrap();
    let end = day("2016-06-01").and_hms_opt(0, 0, 0).unwrap();
    provision_dense_states(
        &store,
        "dense_states",
        vec![vec![1.into(), "active".into(), start.into(), end.into()]],
    )
    .unwrap();
    provision_outcome_events(
        &store,
        "events",
        vec![vec![1.into(), "2016-02-01".into(), true.into()]],
    )
    .unwrap();

    let dense = store.scan("dense_states").unwrap();
    assert_eq!(dense[0][1], Value::Text("active".to_string()));
    assert_eq!(dense[0][2], Value::Timestamp(start));

    let events = store.scan("events").unwrap();
    assert_eq!(events[0][1], Value::Date(day("2016-02-01")));
    assert_eq!(events[0][2], Value::Bool(true));
}

#[test]
fn index_oracle_round_trip() {
    let store = booking_store();
    assert!(!store.has_index("labels", "entity_id"));
    store.create_index("labels", "entity_id").unwrap();
    store.create_index("labels", "as_of_date").unwrap();
    assert!(store.has_index("labels", "entity_id"));
    assert!(store.has_index("labels", "as_of_date"));
    assert!(!store.has_index("sparse_states", "entity_id"));
}
