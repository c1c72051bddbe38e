//! Cross-size comparison: one row per operation spanning every record size
//! that has a per-size summary on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compare::{NOT_AVAILABLE, format_delta};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::stats::{TRIMMED_JOULE_PLACES, round_to, to_joules, trimmed_mean};
use crate::summary::{SummaryEntry, SummaryTable, joules_column, values_column};
use crate::types::{Metric, RecordSize, Strategy};

/// Averaging rule applied to the energy-consumed samples of each size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossVariant {
    /// Uses the joule average already stored in the summary.
    Full,
    /// Re-parses the raw samples and drops the lowest and highest run.
    Trimmed,
}

impl CrossVariant {
    pub fn file_name(self) -> &'static str {
        match self {
            CrossVariant::Full => "cross_record_energy_comparison.csv",
            CrossVariant::Trimmed => "cross_record_energy_comparison_trimmed.csv",
        }
    }

    pub fn joules_header(self, size: RecordSize, strategy: Strategy) -> String {
        match self {
            CrossVariant::Full => format!("{size}_{}_joules", strategy.prefix()),
            CrossVariant::Trimmed => format!("{size}_{}_trim_joules", strategy.prefix()),
        }
    }

    pub fn diff_header(self, size: RecordSize) -> String {
        match self {
            CrossVariant::Full => format!("{size}_diff"),
            CrossVariant::Trimmed => format!("{size}_trim_diff"),
        }
    }

    fn joules(
        self,
        entry: &SummaryEntry<'_>,
        strategy: Strategy,
        joules_factor: f64,
    ) -> Result<f64, ReportError> {
        match self {
            CrossVariant::Full => Ok(entry
                .number(&joules_column(strategy, Metric::EnergyConsumed))?
                .unwrap_or(0.0)),
            CrossVariant::Trimmed => {
                let samples = entry.values(&values_column(strategy, Metric::EnergyConsumed))?;
                Ok(round_to(
                    to_joules(trimmed_mean(&samples), joules_factor),
                    TRIMMED_JOULE_PLACES,
                ))
            }
        }
    }
}

/// Joule pair and delta label of one operation at one size.
///
/// Both values are `None` when the size's summary has no row for the
/// operation; the delta is then `n/a`.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossCell {
    pub orm_joules: Option<f64>,
    pub sql_joules: Option<f64>,
    pub delta: String,
}

impl CrossCell {
    fn missing() -> Self {
        Self {
            orm_joules: None,
            sql_joules: None,
            delta: NOT_AVAILABLE.to_string(),
        }
    }

    fn measured(orm_joules: f64, sql_joules: f64) -> Self {
        Self {
            orm_joules: Some(orm_joules),
            sql_joules: Some(sql_joules),
            delta: format_delta(orm_joules, sql_joules),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossRow {
    pub operation: String,
    /// One cell per entry of [`CrossTable::sizes`].
    pub cells: Vec<CrossCell>,
}

#[derive(Debug, Clone)]
pub struct CrossTable {
    pub variant: CrossVariant,
    pub sizes: Vec<RecordSize>,
    pub rows: Vec<CrossRow>,
}

impl CrossTable {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["query".to_string()];
        for size in &self.sizes {
            headers.push(self.variant.joules_header(*size, Strategy::Orm));
            headers.push(self.variant.joules_header(*size, Strategy::Sql));
            headers.push(self.variant.diff_header(*size));
        }
        headers
    }

    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let cell_text = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        self.rows.iter().map(move |row| {
            let mut fields = vec![row.operation.clone()];
            for cell in &row.cells {
                fields.push(cell_text(cell.orm_joules));
                fields.push(cell_text(cell.sql_joules));
                fields.push(cell.delta.clone());
            }
            fields
        })
    }

    pub fn row(&self, operation: &str) -> Option<&CrossRow> {
        self.rows.iter().find(|row| row.operation == operation)
    }

    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer =
            csv::Writer::from_path(path).map_err(|err| ReportError::csv(path, err))?;
        writer
            .write_record(self.headers())
            .map_err(|err| ReportError::csv(path, err))?;
        for record in self.records() {
            writer
                .write_record(&record)
                .map_err(|err| ReportError::csv(path, err))?;
        }
        writer.flush().map_err(|err| ReportError::io(path, err))?;
        Ok(())
    }
}

/// Builds one cross-size comparison variant from the summaries on disk.
pub struct CrossComparator {
    config: ReportConfig,
    variant: CrossVariant,
}

impl CrossComparator {
    pub fn new(config: ReportConfig, variant: CrossVariant) -> Self {
        Self { config, variant }
    }

    pub fn output_path(&self) -> PathBuf {
        self.config.results_dir.join(self.variant.file_name())
    }

    /// Numerically-named folders of the results root that hold a summary,
    /// in ascending size order.
    pub fn discover(&self) -> Result<Vec<(RecordSize, SummaryTable)>, ReportError> {
        let mut sizes = numeric_dirs(&self.config.results_dir)?;
        sizes.retain(|size| {
            let present = self.config.summary_path(*size).is_file();
            if !present {
                debug!(size, "no summary for record size");
            }
            present
        });

        sizes
            .into_iter()
            .map(|size| SummaryTable::load(self.config.summary_path(size)).map(|table| (size, table)))
            .collect()
    }

    /// `None` when no summary exists for any size.
    pub fn build(&self) -> Result<Option<CrossTable>, ReportError> {
        let summaries = self.discover()?;
        if summaries.is_empty() {
            return Ok(None);
        }

        let operations = self.config.operations.with_extras(
            summaries
                .iter()
                .flat_map(|(_, table)| table.operations()),
        );

        let mut rows = Vec::with_capacity(operations.len());
        for operation in operations {
            let mut cells = Vec::with_capacity(summaries.len());
            for (_, table) in &summaries {
                let cell = match table.row(&operation) {
                    Some(entry) => CrossCell::measured(
                        self.variant
                            .joules(&entry, Strategy::Orm, self.config.joules_factor)?,
                        self.variant
                            .joules(&entry, Strategy::Sql, self.config.joules_factor)?,
                    ),
                    None => CrossCell::missing(),
                };
                cells.push(cell);
            }
            rows.push(CrossRow { operation, cells });
        }

        Ok(Some(CrossTable {
            variant: self.variant,
            sizes: summaries.iter().map(|(size, _)| *size).collect(),
            rows,
        }))
    }

    /// Builds and writes the comparison, overwriting any previous file.
    pub fn run(&self) -> Result<Option<(CrossTable, PathBuf)>, ReportError> {
        let Some(table) = self.build()? else {
            warn!(
                variant = ?self.variant,
                root = %self.config.results_dir.display(),
                "no summary files found for cross-record comparison"
            );
            return Ok(None);
        };

        let path = self.output_path();
        table.write(&path)?;
        info!(
            variant = ?self.variant,
            sizes = ?table.sizes,
            path = %path.display(),
            "saved cross-record comparison"
        );
        Ok(Some((table, path)))
    }
}

/// Entries of `root` whose names are all digits, sorted numerically.
///
/// A missing root yields an empty list.
pub fn numeric_dirs(root: &Path) -> Result<Vec<RecordSize>, ReportError> {
    if !root.is_dir() {
        warn!(root = %root.display(), "results directory does not exist");
        return Ok(Vec::new());
    }

    let mut sizes = Vec::new();
    for entry in fs::read_dir(root).map_err(|err| ReportError::io(root, err))? {
        let entry = entry.map_err(|err| ReportError::io(root, err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(size) = name.parse::<RecordSize>() {
            sizes.push(size);
        }
    }
    sizes.sort_unstable();
    sizes.dedup();
    Ok(sizes)
}
