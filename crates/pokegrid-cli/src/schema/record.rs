use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One placed cell, as appended to the experiment log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Identifier shared by every cell filled in the same `solve` invocation
    pub run_id: String,
    pub grid_id: String,
    pub row: usize,
    pub col: usize,
    /// Display form of the row constraint, e.g. `has_type(fire)`
    pub row_constraint: String,
    pub column_constraint: String,
    /// Candidates left for the cell before ranking
    pub pool_size: usize,
    pub suggested: String,
    pub suggested_score: f64,
    /// Score the game awarded, when known
    #[serde(default)]
    pub actual_score: Option<f64>,
    pub strategy: String,
    #[serde(default)]
    pub strategy_params: Map<String, Value>,
    pub recorded_at: DateTime<Utc>,
}
