//! Cohort resolution: deriving the (entity, as-of-date) pairs eligible for
//! model evaluation under a label definition and a conjunction of state
//! predicates.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::constants::columns::{STATE_ONE, STATE_TWO};
use crate::data::{AsOfDate, CohortEntry, LabelRecord, StateRecord};
use crate::dates::{normalize_as_of_dates, parse_iso_date};
use crate::errors::CohortError;
use crate::types::{EntityId, LabelKind, LabelName, StateName, Timespan};

/// Relation name reported in schema errors raised over caller-supplied
/// state slices.
const STATES_RELATION: &str = "states";

/// Selects label rows and required state flags for cohort resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CohortQuery {
    /// Label definition name to match exactly.
    pub label_name: LabelName,
    /// Label measurement kind to match exactly.
    pub label_type: LabelKind,
    /// Label measurement interval to match exactly.
    pub label_timespan: Timespan,
    /// Boolean state columns that must all be true.
    pub required_states: Vec<StateName>,
}

impl CohortQuery {
    /// Build a query requiring the canonical `state_one`/`state_two` pair.
    pub fn new(
        label_name: impl Into<LabelName>,
        label_type: impl Into<LabelKind>,
        label_timespan: impl Into<Timespan>,
    ) -> Self {
        Self {
            label_name: label_name.into(),
            label_type: label_type.into(),
            label_timespan: label_timespan.into(),
            required_states: vec![STATE_ONE.to_string(), STATE_TWO.to_string()],
        }
    }

    /// Replace the required-state conjunction.
    pub fn with_required_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateName>,
    {
        self.required_states = states.into_iter().map(Into::into).collect();
        self
    }

    fn matches(&self, label: &LabelRecord) -> bool {
        label.label_name == self.label_name
            && label.label_type == self.label_type
            && label.label_timespan == self.label_timespan
    }
}

/// Resolve the cohort for `query`.
///
/// Label rows matching the name/type/timespan triple are joined against
/// state rows on (entity_id, as_of_date); rows without a matching state are
/// excluded, as are rows whose required flags are not all true and rows
/// whose date is absent from the normalized `as_of_dates` set. The result
/// is sorted ascending by (entity_id, as_of_date) with a dense 0-based
/// position.
///
/// Pure over its inputs and deterministic: identical inputs yield identical
/// output. An empty result is a valid outcome, not an error.
///
/// # Errors
///
/// [`CohortError::Format`] when a participating label row carries a date
/// that is not `YYYY-MM-DD`; [`CohortError::Schema`] when a required state
/// column is missing from a joined state row.
pub fn resolve_cohort(
    labels: &[LabelRecord],
    states: &[StateRecord],
    as_of_dates: &[AsOfDate],
    query: &CohortQuery,
) -> Result<Vec<CohortEntry>, CohortError> {
    let state_index = build_state_index(states);
    let valid_dates: HashSet<NaiveDate> =
        normalize_as_of_dates(as_of_dates).into_iter().collect();

    let mut entries = Vec::new();
    for label in labels.iter().filter(|label| query.matches(label)) {
        let as_of_date = parse_iso_date(&label.as_of_date)?;
        let Some(state) = state_index.get(&(label.entity_id, as_of_date)) else {
            continue;
        };
        if !required_flags_hold(state, &query.required_states)? {
            continue;
        }
        if !valid_dates.contains(&as_of_date) {
            continue;
        }
        entries.push(CohortEntry {
            entity_id: label.entity_id,
            as_of_date,
        });
    }

    entries.sort_unstable();
    if entries.is_empty() {
        debug!(
            label_name = %query.label_name,
            label_type = %query.label_type,
            label_timespan = %query.label_timespan,
            "cohort resolved empty"
        );
    } else {
        debug!(
            matched = entries.len(),
            labels = labels.len(),
            states = states.len(),
            "cohort resolved"
        );
    }
    Ok(entries)
}

/// Index state rows by (entity_id, as_of_date).
///
/// Duplicate keys keep the first row and emit a warning; the sparse state
/// fixture rejects duplicates at insertion, so this only fires for
/// caller-assembled slices.
fn build_state_index(
    states: &[StateRecord],
) -> HashMap<(EntityId, NaiveDate), &StateRecord> {
    let mut index: HashMap<(EntityId, NaiveDate), &StateRecord> =
        HashMap::with_capacity(states.len());
    for state in states {
        if index.contains_key(&state.key()) {
            warn!(
                entity_id = state.entity_id,
                as_of_date = %state.as_of_date,
                "duplicate state key, keeping first row"
            );
            continue;
        }
        index.insert(state.key(), state);
    }
    index
}

fn required_flags_hold(
    state: &StateRecord,
    required: &[StateName],
) -> Result<bool, CohortError> {
    let mut all_true = true;
    for name in required {
        match state.flag(name) {
            Some(value) => all_true &= value,
            None => {
                return Err(CohortError::Schema {
                    relation: STATES_RELATION.to_string(),
                    column: name.clone(),
                    details: "required state column is missing".to_string(),
                });
            }
        }
    }
    Ok(all_true)
}
