use pokegrid_solver::{GRID_SIZE, GridSolver, strategy::RankedCandidate};
use serde::Serialize;

use crate::{command::GridArg, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SuggestArg {
    #[clap(flatten)]
    pub(super) grid: GridArg,
    /// Row of a single cell to rank (0-2)
    #[arg(long, requires = "col")]
    row: Option<usize>,
    /// Column of a single cell to rank (0-2)
    #[arg(long, requires = "row")]
    col: Option<usize>,
    /// Name already placed on the grid; may be repeated
    #[arg(long = "chosen", value_name = "NAME")]
    chosen: Vec<String>,
    /// Print the suggestions as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CellReport {
    row: usize,
    col: usize,
    row_constraint: String,
    column_constraint: String,
    pool_size: usize,
    candidates: Vec<RankedCandidate>,
}

pub(crate) async fn run(arg: &SuggestArg) -> anyhow::Result<()> {
    let SuggestArg {
        grid,
        row,
        col,
        chosen,
        json,
    } = arg;
    let (_config, mut solver) = grid.load()?;
    for name in chosen {
        solver.choose(name.as_str());
    }

    let cells = match (row, col) {
        (Some(row), Some(col)) => vec![(*row, *col)],
        _ => all_cells(),
    };
    let reports = suggest_cells(&solver, &cells, grid.top_n).await?;

    if *json {
        return util::save_json(&reports, None);
    }
    for report in &reports {
        println!(
            "[{},{}] {} x {} (pool {})",
            report.row,
            report.col,
            report.row_constraint,
            report.column_constraint,
            report.pool_size
        );
        for (rank, candidate) in report.candidates.iter().enumerate() {
            println!("  {:>2}. {} ({:.3})", rank + 1, candidate.name, candidate.score);
        }
    }
    Ok(())
}

fn all_cells() -> Vec<(usize, usize)> {
    (0..GRID_SIZE)
        .flat_map(|row| (0..GRID_SIZE).map(move |col| (row, col)))
        .collect()
}

/// Ranks each cell against the same chosen set; nothing is placed.
async fn suggest_cells(
    solver: &GridSolver,
    cells: &[(usize, usize)],
    top_n: usize,
) -> anyhow::Result<Vec<CellReport>> {
    let mut reports = Vec::with_capacity(cells.len());
    for &(row, col) in cells {
        let suggestion = solver.suggest_for_cell(row, col, top_n).await?;
        reports.push(CellReport {
            row,
            col,
            row_constraint: solver.rows()[row].to_string(),
            column_constraint: solver.columns()[col].to_string(),
            pool_size: suggestion.pool_size,
            candidates: suggestion.candidates,
        });
    }
    Ok(reports)
}
