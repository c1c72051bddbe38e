use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::types::{OperationOrder, RecordSize, Strategy};

/// kWh-style energy readings are multiplied by this to obtain joules.
pub const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Settings shared by the aggregation and comparison stages.
///
/// Every stage receives its own copy; nothing here is process-global.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Root directory holding one numerically-named folder per record size.
    pub results_dir: PathBuf,
    /// Canonical operation order used for sorting and joining rows.
    pub operations: OperationOrder,
    /// Factor converting the tracker's energy unit to joules.
    pub joules_factor: f64,
    /// Suffix appended to `{strategy}_{size}` sample directories.
    pub sample_dir_suffix: String,
    /// Folder under each size directory receiving the summary file.
    pub comparison_dir: String,
    /// Sample files starting with this prefix are idle-machine baselines.
    pub baseline_prefix: String,
}

impl ReportConfig {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file; absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ReportError::io(path, source))?;
        serde_json::from_slice(&bytes).map_err(|source| ReportError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_results_dir(mut self, results_dir: impl Into<PathBuf>) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    pub fn with_operations(mut self, operations: OperationOrder) -> Self {
        self.operations = operations;
        self
    }

    pub fn with_joules_factor(mut self, factor: f64) -> Self {
        self.joules_factor = factor;
        self
    }

    pub fn size_dir(&self, size: RecordSize) -> PathBuf {
        self.results_dir.join(size.to_string())
    }

    /// e.g. `results/1000/orm_1000_v2`.
    pub fn sample_dir(&self, size: RecordSize, strategy: Strategy) -> PathBuf {
        self.size_dir(size).join(format!(
            "{}_{size}{}",
            strategy.prefix(),
            self.sample_dir_suffix
        ))
    }

    pub fn sample_file_name(
        &self,
        strategy: Strategy,
        operation: &str,
        size: RecordSize,
    ) -> String {
        format!("{}_{operation}_{size}.csv", strategy.prefix())
    }

    pub fn summary_path(&self, size: RecordSize) -> PathBuf {
        self.size_dir(size)
            .join(&self.comparison_dir)
            .join(format!("{size}_energy_comparison_summary.csv"))
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            operations: OperationOrder::default(),
            joules_factor: JOULES_PER_KWH,
            sample_dir_suffix: "_v2".into(),
            comparison_dir: "comparison".into(),
            baseline_prefix: "baseline".into(),
        }
    }
}
