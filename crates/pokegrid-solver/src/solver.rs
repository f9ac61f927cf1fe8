use std::sync::Arc;

use pokegrid_constraint::{NameSet, constraint::BoxedConstraint, metadata::MetadataCache};
use pokegrid_dex::DexError;
use tracing::{info, warn};

use crate::strategy::{BoxedRankingStrategy, RankError, RankedCandidate};

/// Number of rows and of columns on a grid.
pub const GRID_SIZE: usize = 3;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum GridError {
    #[display("expected 3 row constraints, got {count}")]
    RowCount { count: usize },
    #[display("expected 3 column constraints, got {count}")]
    ColumnCount { count: usize },
    #[display("cell ({row}, {col}) is outside the 3x3 grid")]
    CellOutOfRange { row: usize, col: usize },
    #[display("failed to evaluate constraints")]
    Fetch { source: DexError },
    #[display("failed to rank candidates")]
    Rank { source: RankError },
}

impl From<DexError> for GridError {
    fn from(source: DexError) -> Self {
        Self::Fetch { source }
    }
}

impl From<RankError> for GridError {
    fn from(source: RankError) -> Self {
        Self::Rank { source }
    }
}

/// Ranked suggestions for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSuggestion {
    /// The top of the strategy's ordering, at most `top_n` long.
    pub candidates: Vec<RankedCandidate>,
    /// Size of the candidate pool before ranking.
    pub pool_size: usize,
}

impl CellSuggestion {
    #[must_use]
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.candidates.first()
    }
}

/// Suggests Pokémon for the cells of a 3×3 grid.
///
/// A cell's candidate pool is every Pokémon matching both the row and the
/// column constraint, minus names already chosen on this grid. The pool is
/// handed to the ranking strategy and the best `top_n` are returned.
///
/// # Example
///
/// ```no_run
/// # async fn run(
/// #     rows: Vec<pokegrid_constraint::constraint::BoxedConstraint>,
/// #     columns: Vec<pokegrid_constraint::constraint::BoxedConstraint>,
/// #     cache: std::sync::Arc<pokegrid_constraint::metadata::MetadataCache>,
/// # ) -> Result<(), pokegrid_solver::GridError> {
/// use pokegrid_solver::{GridSolver, strategy::RandomStrategy};
///
/// let mut solver = GridSolver::new(rows, columns, Box::new(RandomStrategy::new()), cache)?;
/// let suggestion = solver.suggest_for_cell(0, 0, 5).await?;
/// if let Some(best) = suggestion.best() {
///     let name = best.name.clone();
///     solver.choose(name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GridSolver {
    rows: Vec<BoxedConstraint>,
    columns: Vec<BoxedConstraint>,
    strategy: BoxedRankingStrategy,
    cache: Arc<MetadataCache>,
    chosen: NameSet,
}

impl GridSolver {
    pub fn new(
        rows: Vec<BoxedConstraint>,
        columns: Vec<BoxedConstraint>,
        strategy: BoxedRankingStrategy,
        cache: Arc<MetadataCache>,
    ) -> Result<Self, GridError> {
        if rows.len() != GRID_SIZE {
            return Err(GridError::RowCount { count: rows.len() });
        }
        if columns.len() != GRID_SIZE {
            return Err(GridError::ColumnCount {
                count: columns.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            strategy,
            cache,
            chosen: NameSet::new(),
        })
    }

    #[must_use]
    pub fn rows(&self) -> &[BoxedConstraint] {
        &self.rows
    }

    #[must_use]
    pub fn columns(&self) -> &[BoxedConstraint] {
        &self.columns
    }

    #[must_use]
    pub fn strategy(&self) -> &BoxedRankingStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn chosen(&self) -> &NameSet {
        &self.chosen
    }

    fn check_cell(row: usize, col: usize) -> Result<(), GridError> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return Err(GridError::CellOutOfRange { row, col });
        }
        Ok(())
    }

    /// Names satisfying both constraints of a cell and not yet chosen.
    ///
    /// The row and column constraints are evaluated concurrently.
    pub async fn candidate_pool(&self, row: usize, col: usize) -> Result<NameSet, GridError> {
        Self::check_cell(row, col)?;
        let (row_set, col_set) = tokio::try_join!(
            self.rows[row].matching_set(&self.cache),
            self.columns[col].matching_set(&self.cache),
        )?;
        Ok(row_set
            .intersection(&col_set)
            .filter(|name| !self.chosen.contains(*name))
            .cloned()
            .collect())
    }

    /// Ranks the candidate pool of a cell and keeps the best `top_n`.
    ///
    /// An empty pool yields an empty suggestion without consulting the strategy.
    /// Ranked names outside the pool are dropped, as are repeats of a name
    /// already ranked higher.
    pub async fn suggest_for_cell(
        &self,
        row: usize,
        col: usize,
        top_n: usize,
    ) -> Result<CellSuggestion, GridError> {
        let pool = self.candidate_pool(row, col).await?;
        let pool_size = pool.len();
        let mut candidates = if pool.is_empty() {
            vec![]
        } else {
            self.strategy.rank(&pool).await?
        };
        let returned = candidates.len();
        let mut seen = NameSet::new();
        candidates.retain(|c| pool.contains(&c.name) && seen.insert(c.name.clone()));
        let dropped = returned - candidates.len();
        if dropped > 0 {
            warn!(
                row,
                col,
                dropped,
                strategy = self.strategy.name(),
                "dropped ranked names that are not in the candidate pool"
            );
        }
        candidates.truncate(top_n);

        info!(
            row,
            col,
            pool_size,
            best = candidates.first().map(|c| c.name.as_str()),
            "suggested for {} x {}",
            self.rows[row],
            self.columns[col],
        );
        Ok(CellSuggestion {
            candidates,
            pool_size,
        })
    }

    /// Excludes `name` from every later candidate pool. Idempotent.
    pub fn choose(&mut self, name: impl Into<String>) {
        self.chosen.insert(name.into());
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use async_trait::async_trait;
    use pokegrid_constraint::constraint::Constraint;
    use pokegrid_dex::{DexFixture, InMemoryDex};

    use super::*;
    use crate::strategy::{RandomStrategy, RankingStrategy, sort_ranked};

    /// A constraint with a fixed matching set.
    #[derive(Debug, Clone)]
    struct Fixed(NameSet);

    impl fmt::Display for Fixed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fixed({})", self.0.len())
        }
    }

    #[async_trait]
    impl Constraint for Fixed {
        fn id(&self) -> &'static str {
            "fixed"
        }
        fn clone_boxed(&self) -> BoxedConstraint {
            Box::new(self.clone())
        }
        async fn matching_set(&self, _cache: &MetadataCache) -> Result<NameSet, DexError> {
            Ok(self.0.clone())
        }
    }

    /// Ranks names alphabetically.
    #[derive(Debug)]
    struct Alphabetical;

    #[async_trait]
    impl RankingStrategy for Alphabetical {
        fn name(&self) -> &'static str {
            "alphabetical"
        }
        fn params(&self) -> serde_json::Map<String, serde_json::Value> {
            serde_json::Map::new()
        }
        async fn rank(&self, candidates: &NameSet) -> Result<Vec<RankedCandidate>, RankError> {
            let mut ranked: Vec<_> = candidates
                .iter()
                .rev()
                .enumerate()
                .map(|(i, n)| {
                    RankedCandidate::new(n.clone(), f64::from(u32::try_from(i).unwrap()))
                })
                .collect();
            sort_ranked(&mut ranked);
            Ok(ranked)
        }
    }

    fn set(names: &[&str]) -> NameSet {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    fn fixed(names: &[&str]) -> BoxedConstraint {
        Box::new(Fixed(set(names)))
    }

    fn cache() -> Arc<MetadataCache> {
        Arc::new(MetadataCache::new(Arc::new(InMemoryDex::new(
            DexFixture::default(),
        ))))
    }

    fn solver() -> GridSolver {
        GridSolver::new(
            vec![fixed(&["a", "b", "c"]), fixed(&["x"]), fixed(&[])],
            vec![fixed(&["b", "c", "d"]), fixed(&["a", "x"]), fixed(&["z"])],
            Box::new(RandomStrategy::new()),
            cache(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_candidate_pool_is_intersection() {
        let solver = solver();
        assert_eq!(solver.candidate_pool(0, 0).await.unwrap(), set(&["b", "c"]));

        let suggestion = solver.suggest_for_cell(0, 0, 10).await.unwrap();
        assert_eq!(suggestion.pool_size, 2);
        let names: NameSet = suggestion.candidates.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, set(&["b", "c"]));
    }

    #[tokio::test]
    async fn test_choose_excludes_from_later_pools() {
        let mut solver = solver();
        solver.choose("b");
        solver.choose("b");
        assert_eq!(solver.chosen().len(), 1);

        let suggestion = solver.suggest_for_cell(0, 0, 10).await.unwrap();
        assert_eq!(suggestion.pool_size, 1);
        assert_eq!(suggestion.best().unwrap().name, "c");

        // names never suggested can be chosen too
        solver.choose("x");
        assert!(solver.candidate_pool(1, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_n_truncates_strategy_order() {
        let solver = GridSolver::new(
            vec![fixed(&["a", "b", "c", "d"]), fixed(&[]), fixed(&[])],
            vec![fixed(&["a", "b", "c", "d"]), fixed(&[]), fixed(&[])],
            Box::new(Alphabetical),
            cache(),
        )
        .unwrap();
        let suggestion = solver.suggest_for_cell(0, 0, 2).await.unwrap();
        assert_eq!(suggestion.pool_size, 4);
        let names: Vec<_> = suggestion.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_pool_is_not_an_error() {
        let solver = solver();
        let suggestion = solver.suggest_for_cell(2, 2, 5).await.unwrap();
        assert_eq!(suggestion.pool_size, 0);
        assert!(suggestion.best().is_none());
    }

    #[tokio::test]
    async fn test_cell_out_of_range() {
        let solver = solver();
        let err = solver.suggest_for_cell(3, 0, 5).await.unwrap_err();
        assert!(matches!(err, GridError::CellOutOfRange { row: 3, col: 0 }));
        let err = solver.candidate_pool(0, 3).await.unwrap_err();
        assert!(err.is_cell_out_of_range());
    }

    #[test]
    fn test_constraint_counts() {
        let err = GridSolver::new(
            vec![fixed(&[]), fixed(&[])],
            vec![fixed(&[]), fixed(&[]), fixed(&[])],
            Box::new(RandomStrategy::new()),
            cache(),
        )
        .unwrap_err();
        assert!(matches!(err, GridError::RowCount { count: 2 }));

        let err = GridSolver::new(
            vec![fixed(&[]), fixed(&[]), fixed(&[])],
            vec![fixed(&[]); 4],
            Box::new(RandomStrategy::new()),
            cache(),
        )
        .unwrap_err();
        assert!(err.is_column_count());
    }
}
