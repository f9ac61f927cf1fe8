use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use pokegrid_stats::{descriptive::DescriptiveStats, paired::PairedStats};
use serde::Serialize;

use crate::{record::ExperimentLog, schema::record::ExperimentRecord, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummarizeArg {
    /// Experiment log to read (JSON lines)
    #[arg(long, value_name = "PATH")]
    log: PathBuf,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SummarizeArg) -> anyhow::Result<()> {
    let SummarizeArg { log, output } = arg;
    let records = ExperimentLog::new(log).read()?;
    eprintln!("Read {} records from {}", records.len(), log.display());
    let summaries = summarize(&records);
    util::save_json(&summaries, output.as_deref())
}

#[derive(Debug, Serialize)]
struct StrategySummary {
    strategy: String,
    runs: usize,
    records: usize,
    pool_size: Option<DescriptiveStats>,
    suggested_score: Option<DescriptiveStats>,
    actual_score: Option<DescriptiveStats>,
    /// `actual - suggested` over records with a known actual score
    score_delta: Option<PairedStats>,
}

fn summarize(records: &[ExperimentRecord]) -> Vec<StrategySummary> {
    let mut by_strategy: BTreeMap<&str, Vec<&ExperimentRecord>> = BTreeMap::new();
    for record in records {
        by_strategy.entry(record.strategy.as_str()).or_default().push(record);
    }

    by_strategy
        .into_iter()
        .map(|(strategy, records)| {
            let runs: BTreeSet<_> = records.iter().map(|r| r.run_id.as_str()).collect();
            #[expect(clippy::cast_precision_loss)]
            let pool_size = DescriptiveStats::new(records.iter().map(|r| r.pool_size as f64));
            StrategySummary {
                strategy: strategy.to_owned(),
                runs: runs.len(),
                records: records.len(),
                pool_size,
                suggested_score: DescriptiveStats::new(records.iter().map(|r| r.suggested_score)),
                actual_score: DescriptiveStats::new(records.iter().filter_map(|r| r.actual_score)),
                score_delta: PairedStats::new(
                    records
                        .iter()
                        .filter_map(|r| Some((r.suggested_score, r.actual_score?))),
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(
        run_id: &str,
        strategy: &str,
        pool_size: usize,
        scores: (f64, Option<f64>),
    ) -> ExperimentRecord {
        ExperimentRecord {
            run_id: run_id.to_owned(),
            grid_id: "g".to_owned(),
            row: 0,
            col: 0,
            row_constraint: "has_type(fire)".to_owned(),
            column_constraint: "is_monotype()".to_owned(),
            pool_size,
            suggested: "vulpix".to_owned(),
            suggested_score: scores.0,
            actual_score: scores.1,
            strategy: strategy.to_owned(),
            strategy_params: serde_json::Map::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_groups_by_strategy() {
        let records = [
            record("a", "random", 10, (0.5, Some(1.5))),
            record("a", "random", 20, (0.25, None)),
            record("b", "random", 30, (0.75, Some(0.5))),
            record("c", "oracle", 4, (0.9, None)),
        ];
        let summaries = summarize(&records);
        let names: Vec<_> = summaries.iter().map(|s| s.strategy.as_str()).collect();
        assert_eq!(names, ["oracle", "random"]);

        let oracle = &summaries[0];
        assert_eq!((oracle.runs, oracle.records), (1, 1));
        assert!(oracle.actual_score.is_none());
        assert!(oracle.score_delta.is_none());

        let random = &summaries[1];
        assert_eq!((random.runs, random.records), (2, 3));
        let pool = random.pool_size.as_ref().unwrap();
        assert!((pool.mean - 20.0).abs() < 1e-9);
        assert_eq!(random.actual_score.as_ref().unwrap().count, 2);
        let delta = random.score_delta.as_ref().unwrap();
        assert_eq!(delta.delta.count, 2);
        assert!((delta.delta.mean - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_empty_log() {
        assert!(summarize(&[]).is_empty());
    }
}
