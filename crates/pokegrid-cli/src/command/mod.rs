use std::{io, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pokegrid_constraint::metadata::MetadataCache;
use pokegrid_dex::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT_REQUESTS, DexFixture, InMemoryDex, PokeApiClient,
    PokeApiConfig, SharedDexSource,
};
use pokegrid_solver::GridSolver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::{solve::SolveArg, suggest::SuggestArg, summarize::SummarizeArg};
use crate::{schema::config::GridConfig, util};

mod solve;
mod suggest;
mod summarize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug events (`RUST_LOG` takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Fill every cell of a grid and append the picks to the experiment log
    Solve(#[clap(flatten)] SolveArg),
    /// Show ranked suggestions without choosing any
    Suggest(#[clap(flatten)] SuggestArg),
    /// Summarize an experiment log per strategy
    Summarize(#[clap(flatten)] SummarizeArg),
}

pub async fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Solve(arg) => solve::run(&arg).await?,
        Mode::Suggest(arg) => suggest::run(&arg).await?,
        Mode::Summarize(arg) => summarize::run(&arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pokegrid=debug"
    } else {
        "pokegrid=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Where catalog data comes from.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DexArg {
    /// Serve catalog data from a JSON fixture instead of the network
    #[arg(long, value_name = "PATH")]
    dex_fixture: Option<PathBuf>,
    /// Base URL of the PokeAPI-compatible service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Upper bound on in-flight catalog requests (0 removes the cap)
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS)]
    max_concurrent_requests: usize,
}

impl DexArg {
    fn open(&self) -> anyhow::Result<SharedDexSource> {
        if let Some(path) = &self.dex_fixture {
            let fixture: DexFixture = util::read_json_file("dex fixture", path)?;
            info!(
                path = %path.display(),
                pokemon = fixture.pokemon.len(),
                "serving catalog from fixture"
            );
            return Ok(Arc::new(InMemoryDex::new(fixture)));
        }
        let config = PokeApiConfig {
            base_url: self.base_url.clone(),
            max_concurrent_requests: (self.max_concurrent_requests > 0)
                .then_some(self.max_concurrent_requests),
            ..PokeApiConfig::default()
        };
        let client = PokeApiClient::new(config).context("Failed to build catalog client")?;
        Ok(Arc::new(client))
    }
}

/// Arguments shared by the commands that evaluate a grid.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GridArg {
    /// Grid configuration file (JSON)
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Number of ranked suggestions kept per cell
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    top_n: usize,
    #[clap(flatten)]
    dex: DexArg,
}

impl GridArg {
    /// Reads and validates the configuration, then wires the solver to the catalog.
    fn load(&self) -> anyhow::Result<(GridConfig, GridSolver)> {
        let config = util::read_grid_config(&self.config)?;
        let source = self.dex.open()?;
        let solver = config.build_solver(Arc::new(MetadataCache::new(source)))?;
        info!(
            grid_id = %config.grid_id,
            strategy = solver.strategy().name(),
            "loaded grid"
        );
        Ok((config, solver))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    fn parse(args: &[&str]) -> Result<CommandArgs, clap::Error> {
        CommandArgs::try_parse_from(["pokegrid"].iter().chain(args))
    }

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_top_n_must_be_positive() {
        let err = parse(&["suggest", "--config", "grid.json", "--top-n", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let args = parse(&["solve", "--config", "grid.json", "--top-n", "1", "-v"]).unwrap();
        assert!(args.verbose);
        let Mode::Solve(arg) = args.mode else {
            panic!("expected solve");
        };
        assert_eq!(arg.grid.top_n, 1);

        let args = parse(&["suggest", "--config", "grid.json"]).unwrap();
        let Mode::Suggest(arg) = args.mode else {
            panic!("expected suggest");
        };
        assert_eq!(arg.grid.top_n, 5);
    }
}
