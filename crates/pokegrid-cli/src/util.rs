use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;

use crate::schema::config::GridConfig;

/// Writes `value` as pretty JSON to `output`, or to stdout when `None`.
pub fn save_json<T>(value: &T, output: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let (mut writer, display): (Box<dyn Write>, String) = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), path.display().to_string())
        }
        None => (Box::new(io::stdout().lock()), "stdout".to_owned()),
    };
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {display}"))?;
    writeln!(writer).with_context(|| format!("Failed to write JSON to {display}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {display}"))?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

pub fn read_grid_config<P>(path: P) -> anyhow::Result<GridConfig>
where
    P: AsRef<Path>,
{
    read_json_file("grid config", path)
}
