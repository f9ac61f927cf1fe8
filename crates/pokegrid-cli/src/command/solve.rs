use std::path::PathBuf;

use chrono::Utc;
use pokegrid_solver::{CellSuggestion, GRID_SIZE, GridSolver};
use tracing::{info, warn};

use crate::{
    command::GridArg,
    record::ExperimentLog,
    schema::{config::GridConfig, record::ExperimentRecord},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SolveArg {
    #[clap(flatten)]
    pub(super) grid: GridArg,
    /// Experiment log to append the picks to (JSON lines)
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Run identifier written to the log (defaults to the start time)
    #[arg(long)]
    run_id: Option<String>,
}

pub(crate) async fn run(arg: &SolveArg) -> anyhow::Result<()> {
    let SolveArg { grid, log, run_id } = arg;
    let (config, mut solver) = grid.load()?;
    let run_id = run_id
        .clone()
        .unwrap_or_else(|| Utc::now().format("%Y%m%dT%H%M%SZ").to_string());

    let solved = fill_grid(&config, &mut solver, grid.top_n, &run_id).await?;
    for cell in &solved.cells {
        print_cell(&solver, cell);
    }
    if !solved.empty_cells.is_empty() {
        println!("No candidates left for {:?}", solved.empty_cells);
    }

    if let Some(path) = log {
        let log = ExperimentLog::new(path);
        log.append(&solved.records)?;
        info!(
            path = %log.path().display(),
            records = solved.records.len(),
            "appended to experiment log"
        );
    }
    Ok(())
}

#[derive(Debug)]
struct SolvedCell {
    row: usize,
    col: usize,
    suggestion: CellSuggestion,
}

#[derive(Debug, Default)]
struct SolvedGrid {
    cells: Vec<SolvedCell>,
    /// One record per filled cell, in row-major order.
    records: Vec<ExperimentRecord>,
    empty_cells: Vec<(usize, usize)>,
}

/// Visits the cells in row-major order, placing each cell's best suggestion.
async fn fill_grid(
    config: &GridConfig,
    solver: &mut GridSolver,
    top_n: usize,
    run_id: &str,
) -> anyhow::Result<SolvedGrid> {
    let strategy = solver.strategy().name().to_owned();
    let strategy_params = solver.strategy().params();
    let mut solved = SolvedGrid::default();

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let suggestion = solver.suggest_for_cell(row, col, top_n).await?;
            let Some(best) = suggestion.best().cloned() else {
                warn!(row, col, "no candidates left");
                solved.empty_cells.push((row, col));
                continue;
            };
            solver.choose(best.name.clone());
            solved.records.push(ExperimentRecord {
                run_id: run_id.to_owned(),
                grid_id: config.grid_id.clone(),
                row,
                col,
                row_constraint: solver.rows()[row].to_string(),
                column_constraint: solver.columns()[col].to_string(),
                pool_size: suggestion.pool_size,
                suggested: best.name,
                suggested_score: best.score,
                actual_score: config.actual_score(row, col),
                strategy: strategy.clone(),
                strategy_params: strategy_params.clone(),
                recorded_at: Utc::now(),
            });
            solved.cells.push(SolvedCell {
                row,
                col,
                suggestion,
            });
        }
    }
    Ok(solved)
}

fn print_cell(solver: &GridSolver, cell: &SolvedCell) {
    let SolvedCell {
        row,
        col,
        suggestion,
    } = cell;
    let Some((best, rest)) = suggestion.candidates.split_first() else {
        return;
    };
    println!(
        "[{row},{col}] {} x {}: {} ({:.3}, pool {})",
        solver.rows()[*row],
        solver.columns()[*col],
        best.name,
        best.score,
        suggestion.pool_size,
    );
    if !rest.is_empty() {
        let names: Vec<_> = rest.iter().map(|c| c.name.as_str()).collect();
        println!("      also: {}", names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pokegrid_constraint::{NameSet, metadata::MetadataCache};
    use pokegrid_dex::{BaseStats, DexFixture, InMemoryDex};
    use serde_json::json;

    use super::*;

    fn dex() -> InMemoryDex {
        let stats = BaseStats::default();
        let fixture = DexFixture::builder()
            .pokemon("charmander", &["fire"], 6, 85, stats)
            .pokemon("charizard", &["fire", "flying"], 17, 905, stats)
            .pokemon("squirtle", &["water"], 5, 90, stats)
            .pokemon("gyarados", &["water", "flying"], 65, 2350, stats)
            .pokemon("bulbasaur", &["grass", "poison"], 7, 69, stats)
            .pokemon("oddish", &["grass", "poison"], 5, 54, stats)
            .build();
        InMemoryDex::new(fixture)
    }

    fn config() -> GridConfig {
        serde_json::from_value(json!({
            "grid_id": "test-grid",
            "rows": [
                { "constraint": "has_type", "args": ["fire"] },
                { "constraint": "has_type", "args": ["water"] },
                { "constraint": "has_type", "args": ["grass"] },
            ],
            "columns": [
                { "constraint": "is_monotype" },
                { "constraint": "is_dual_type" },
                { "constraint": "has_type", "args": ["poison"] },
            ],
            "strategy": { "name": "random", "params": { "seed": 11 } },
            "actual_scores": [[5.0, null, null], [null, null, null], [null, 42.0, null]],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fill_grid_places_unique_names() {
        let config = config();
        let cache = Arc::new(MetadataCache::new(Arc::new(dex())));
        let mut solver = config.build_solver(cache).unwrap();

        let solved = fill_grid(&config, &mut solver, 3, "run-7").await.unwrap();

        let cells: Vec<_> = solved.records.iter().map(|r| (r.row, r.col)).collect();
        let mut sorted = cells.clone();
        sorted.sort_unstable();
        assert_eq!(cells, sorted);

        let placed: NameSet = solved.records.iter().map(|r| r.suggested.clone()).collect();
        assert_eq!(placed.len(), solved.records.len());
        assert_eq!(&placed, solver.chosen());

        // fire/poison, water/poison and grass/monotype never match
        for cell in [(0, 2), (1, 2), (2, 0)] {
            assert!(solved.empty_cells.contains(&cell), "{cell:?}");
        }
        // grass/dual takes one of the two grass-poison entries, grass/poison the other
        let grass: Vec<_> = solved.records.iter().filter(|r| r.row == 2).collect();
        assert_eq!(grass.len(), 2);
        assert_eq!(grass[0].actual_score, Some(42.0));
        assert_eq!(grass[0].pool_size, 2);
        assert_eq!(grass[1].pool_size, 1);

        let first = &solved.records[0];
        assert_eq!((first.row, first.col), (0, 0));
        assert_eq!(first.suggested, "charmander");
        assert_eq!(first.actual_score, Some(5.0));
        assert_eq!(first.row_constraint, "has_type(fire)");
        assert_eq!(first.column_constraint, "is_monotype()");
        assert_eq!(first.strategy, "random");
        assert_eq!(first.strategy_params["seed"], 11);
        assert!(solved.records.iter().all(|r| r.run_id == "run-7"));
    }
}
