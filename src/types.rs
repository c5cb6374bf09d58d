/// Entity identifier shared by features, labels, states, and events.
/// Example: `42`
pub type EntityId = i64;
/// Name of a fixture table.
/// Examples: `labels`, `sparse_states`, `features0`
pub type TableName = String;
/// Name of a column within a fixture table.
/// Examples: `as_of_date`, `state_one`, `f3`
pub type ColumnName = String;
/// Label definition name.
/// Example: `booking`
pub type LabelName = String;
/// Label measurement kind.
/// Examples: `binary`, `regression`
pub type LabelKind = String;
/// Forward-looking interval over which an outcome is measured.
/// Examples: `1 month`, `3 month`
pub type Timespan = String;
/// Name of a boolean eligibility column on the state relation.
/// Examples: `state_one`, `state_two`
pub type StateName = String;
/// Issued model identifier (dense, starting at 1).
/// Example: `1`
pub type ModelId = u64;
