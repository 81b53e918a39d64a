use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::experiment::ExperimentFamily;
use crate::table::{ResultRow, ResultTable};

pub const RUN_ID_COLUMN: &str = "Exp";
pub const REQUIRED_COLUMNS: [&str; 4] = [RUN_ID_COLUMN, "Matrix Size", "Op", "Time"];

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Matrix Size")]
    matrix_size: u64,
    #[serde(rename = "Block Size", default)]
    block_size: Option<u64>,
    #[serde(rename = "Op")]
    op: u32,
    #[serde(rename = "P", default)]
    threads: Option<u32>,
    #[serde(rename = "Time")]
    time: f64,
}

impl From<CsvRecord> for ResultRow {
    fn from(record: CsvRecord) -> Self {
        Self {
            matrix_size: record.matrix_size,
            block_size: record.block_size,
            op: record.op,
            threads: record.threads,
            time: record.time,
            performance: None,
        }
    }
}

/// Read every CSV under `<results_dir>/<family>/` into one table, without
/// the run identifier column.
pub fn load_experiment(results_dir: &Path, family: ExperimentFamily) -> Result<ResultTable> {
    let dir = results_dir.join(family.folder());
    let files = csv_files(&dir)?;
    if files.is_empty() {
        bail!("no CSV files found in {}", dir.display());
    }

    let mut schema: Option<(PathBuf, Vec<String>)> = None;
    let mut rows = Vec::new();

    for file in &files {
        let (headers, mut file_rows) = read_csv(file)?;

        match &schema {
            Some((first, columns)) => {
                let expected: BTreeSet<&str> = columns.iter().map(String::as_str).collect();
                let actual: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
                if expected != actual {
                    bail!(
                        "{} has columns {:?}, but {} has {:?}",
                        file.display(),
                        headers,
                        first.display(),
                        columns
                    );
                }
            }
            None => schema = Some((file.clone(), headers)),
        }

        debug!(file = %file.display(), rows = file_rows.len(), "parsed results file");
        rows.append(&mut file_rows);
    }

    let columns = schema
        .map(|(_, headers)| headers)
        .unwrap_or_default()
        .into_iter()
        .filter(|h| h != RUN_ID_COLUMN)
        .collect();

    info!(
        %family,
        algorithm = family.algorithm().label(),
        files = files.len(),
        rows = rows.len(),
        "loaded experiment"
    );
    Ok(ResultTable::new(family, columns, rows))
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read results directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list {}", dir.display()))?
            .path();
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<ResultRow>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("{} is missing column {:?}", path.display(), required);
        }
    }

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<CsvRecord>().enumerate() {
        // header is line 1
        let record = record
            .with_context(|| format!("failed to parse {} line {}", path.display(), index + 2))?;
        rows.push(record.into());
    }

    Ok((headers, rows))
}
