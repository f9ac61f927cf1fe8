use std::sync::Arc;

use anyhow::Context;
use pokegrid_constraint::{
    constraint::BoxedConstraint,
    metadata::MetadataCache,
    registry::{ConstraintSpec, build_constraint},
};
use pokegrid_solver::{
    GRID_SIZE, GridSolver,
    strategy::{StrategySpec, build_strategy},
};
use serde::{Deserialize, Serialize};

/// Scores the game awarded after play, indexed `[row][col]`.
pub type ActualScores = [[Option<f64>; GRID_SIZE]; GRID_SIZE];

/// Declarative description of one grid and the strategy used to fill it.
///
/// ```json
/// {
///   "grid_id": "2026-10-18",
///   "rows": [{ "constraint": "has_type", "args": ["fire"] }, ...],
///   "columns": [{ "constraint": "taller_than", "kwargs": { "feet": 6 } }, ...],
///   "strategy": { "name": "random", "params": { "seed": 7 } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub grid_id: String,
    pub rows: Vec<ConstraintSpec>,
    pub columns: Vec<ConstraintSpec>,
    pub strategy: StrategySpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_scores: Option<ActualScores>,
}

impl GridConfig {
    pub fn build_constraints(
        &self,
    ) -> anyhow::Result<(Vec<BoxedConstraint>, Vec<BoxedConstraint>)> {
        let rows = build_all("row", &self.rows)?;
        let columns = build_all("column", &self.columns)?;
        Ok((rows, columns))
    }

    /// Resolves every constraint and the strategy, then builds a solver over `cache`.
    ///
    /// Nothing is fetched from the catalog here, so a bad configuration
    /// fails before the first request.
    pub fn build_solver(&self, cache: Arc<MetadataCache>) -> anyhow::Result<GridSolver> {
        let (rows, columns) = self.build_constraints()?;
        let strategy = build_strategy(&self.strategy)
            .with_context(|| format!("Invalid strategy '{}'", self.strategy.name))?;
        let solver = GridSolver::new(rows, columns, strategy, cache)
            .with_context(|| format!("Invalid grid '{}'", self.grid_id))?;
        Ok(solver)
    }

    #[must_use]
    pub fn actual_score(&self, row: usize, col: usize) -> Option<f64> {
        self.actual_scores
            .as_ref()
            .and_then(|scores| scores.get(row)?.get(col).copied().flatten())
    }
}

fn build_all(axis: &str, specs: &[ConstraintSpec]) -> anyhow::Result<Vec<BoxedConstraint>> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            build_constraint(spec).with_context(|| {
                format!("Invalid {axis} constraint #{i} ('{}')", spec.constraint)
            })
        })
        .collect()
}
