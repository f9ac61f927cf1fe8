use std::{
    fs::{File, OpenOptions},
    io::{BufRead as _, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::schema::record::ExperimentRecord;

/// Append-only experiment log, one JSON record per line.
#[derive(Debug, Clone)]
pub struct ExperimentLog {
    path: PathBuf,
}

impl ExperimentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `records` in order, creating the file if needed.
    pub fn append(&self, records: &[ExperimentRecord]) -> anyhow::Result<()> {
        let path = &self.path;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open experiment log: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)
                .with_context(|| format!("Failed to write record to {}", path.display()))?;
            writeln!(writer)
                .with_context(|| format!("Failed to write record to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush experiment log: {}", path.display()))?;
        Ok(())
    }

    /// Reads every record. Blank lines are skipped.
    pub fn read(&self) -> anyhow::Result<Vec<ExperimentRecord>> {
        let path = &self.path;
        let file = File::open(path)
            .with_context(|| format!("Failed to open experiment log: {}", path.display()))?;
        let mut records = vec![];
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.with_context(|| format!("Failed to read experiment log: {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).with_context(|| {
                format!("Failed to parse record at {}:{}", path.display(), i + 1)
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(row: usize, col: usize, suggested: &str) -> ExperimentRecord {
        ExperimentRecord {
            run_id: "run-1".to_owned(),
            grid_id: "grid-1".to_owned(),
            row,
            col,
            row_constraint: "has_type(fire)".to_owned(),
            column_constraint: "is_dual_type()".to_owned(),
            pool_size: 4,
            suggested: suggested.to_owned(),
            suggested_score: 0.75,
            actual_score: (row == 0).then_some(31.0),
            strategy: "random".to_owned(),
            strategy_params: serde_json::Map::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_keeps_earlier_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = ExperimentLog::new(dir.path().join("log.jsonl"));

        let first = vec![record(0, 0, "charizard"), record(0, 1, "moltres")];
        log.append(&first).unwrap();
        log.append(&[record(1, 0, "gyarados")]).unwrap();

        let records = log.read().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[..2], first[..]);
        assert_eq!(records[2].suggested, "gyarados");
        assert_eq!(records[2].actual_score, None);

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_read_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let good = serde_json::to_string(&record(0, 0, "charizard")).unwrap();
        std::fs::write(&path, format!("{good}\n\n{{not json\n")).unwrap();

        let err = ExperimentLog::new(&path).read().unwrap_err();
        assert!(err.to_string().ends_with(":3"), "{err}");
    }

    #[test]
    fn test_missing_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let line = serde_json::json!({
            "run_id": "r", "grid_id": "g", "row": 2, "col": 1,
            "row_constraint": "a", "column_constraint": "b",
            "pool_size": 1, "suggested": "mew", "suggested_score": 0.5,
            "strategy": "oracle", "recorded_at": "2026-10-18T12:00:00Z",
        });
        std::fs::write(&path, format!("{line}\n")).unwrap();

        let records = ExperimentLog::new(&path).read().unwrap();
        assert_eq!(records[0].actual_score, None);
        assert!(records[0].strategy_params.is_empty());
    }
}
