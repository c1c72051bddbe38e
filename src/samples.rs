//! Reading the per-run measurement files emitted by the energy tracker.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ReportError;
use crate::types::{Metric, RecordSize};

/// One tracker row. Only the measured columns are read; the tracker writes
/// many more (timestamps, hardware info) which are ignored.
#[derive(Debug, Deserialize)]
struct SampleRecord {
    #[serde(default)]
    cpu_energy: Option<f64>,
    #[serde(default)]
    ram_energy: Option<f64>,
    #[serde(default)]
    energy_consumed: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

/// All runs of one (strategy, operation, size) triple, per metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    cpu_energy: Vec<f64>,
    ram_energy: Vec<f64>,
    energy_consumed: Vec<f64>,
    duration: Vec<f64>,
}

impl SampleSet {
    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::CpuEnergy => &self.cpu_energy,
            Metric::RamEnergy => &self.ram_energy,
            Metric::EnergyConsumed => &self.energy_consumed,
            Metric::Duration => &self.duration,
        }
    }

    fn push(&mut self, record: SampleRecord) {
        let columns = [
            (&mut self.cpu_energy, record.cpu_energy),
            (&mut self.ram_energy, record.ram_energy),
            (&mut self.energy_consumed, record.energy_consumed),
            (&mut self.duration, record.duration),
        ];
        for (column, value) in columns {
            if let Some(value) = value.filter(|v| !v.is_nan()) {
                column.push(value);
            }
        }
    }
}

/// Loads every run in a sample file, discarding empty cells.
pub fn load_metric_values(path: &Path) -> Result<SampleSet, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| ReportError::csv(path, err))?;

    let mut samples = SampleSet::default();
    for record in reader.deserialize::<SampleRecord>() {
        samples.push(record.map_err(|err| ReportError::csv(path, err))?);
    }
    debug!(
        path = %path.display(),
        runs = samples.energy_consumed.len(),
        "loaded samples"
    );
    Ok(samples)
}

/// Splits `orm_create_customer_1000.csv` into (`create_customer`, 1000).
///
/// The first segment is the strategy prefix and the last the record size.
pub fn parse_sample_file_name(name: &str) -> Option<(String, RecordSize)> {
    let stem = name.strip_suffix(".csv").unwrap_or(name);
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let size = parts[parts.len() - 1].parse().ok()?;
    let operation = parts[1..parts.len() - 1].join("_");
    Some((operation, size))
}

/// A sample file together with the operation it measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub operation: String,
    pub size: RecordSize,
    pub path: PathBuf,
}

/// Lists the `.csv` sample files of a directory, skipping baselines and
/// names that do not follow the `{strategy}_{operation}_{size}` pattern.
pub fn list_sample_files(dir: &Path, baseline_prefix: &str) -> Result<Vec<SampleFile>, ReportError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| ReportError::io(dir, err))? {
        let entry = entry.map_err(|err| ReportError::io(dir, err))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".csv") || name.starts_with(baseline_prefix) {
            continue;
        }
        match parse_sample_file_name(&name) {
            Some((operation, size)) => files.push(SampleFile {
                operation,
                size,
                path: entry.path(),
            }),
            None => debug!(file = %name, "ignoring file with unexpected name"),
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_yields_operation_and_size() {
        assert_eq!(
            parse_sample_file_name("orm_create_customer_1000.csv"),
            Some(("create_customer".to_string(), 1000))
        );
        assert_eq!(
            parse_sample_file_name("sql_fetch_top_spending_customers_50000.csv"),
            Some(("fetch_top_spending_customers".to_string(), 50000))
        );
    }

    #[test]
    fn malformed_file_names_are_rejected() {
        assert_eq!(parse_sample_file_name("orm_1000.csv"), None);
        assert_eq!(parse_sample_file_name("orm_create_customer_big.csv"), None);
    }

    #[test]
    fn sample_rows_drop_missing_and_nan() {
        let mut set = SampleSet::default();
        set.push(SampleRecord {
            cpu_energy: Some(1.0),
            ram_energy: None,
            energy_consumed: Some(f64::NAN),
            duration: Some(0.5),
        });
        assert_eq!(set.values(Metric::CpuEnergy), &[1.0]);
        assert!(set.values(Metric::RamEnergy).is_empty());
        assert!(set.values(Metric::EnergyConsumed).is_empty());
        assert_eq!(set.values(Metric::Duration), &[0.5]);
    }
}
