//! Per-size aggregation: pairs each ORM sample file with its SQL
//! counterpart and writes one summary row per operation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{info, warn};

use crate::compare::format_result;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::samples::{SampleSet, list_sample_files, load_metric_values};
use crate::stats::{AVERAGE_PLACES, join_values, mean, parse_values, round_to, to_joules};
use crate::types::{Metric, RecordSize, Strategy};

pub const QUERY_COLUMN: &str = "query";
pub const RECORD_SIZE_COLUMN: &str = "record_size";

pub fn values_column(strategy: Strategy, metric: Metric) -> String {
    format!("{}_{}_values", strategy.prefix(), metric.column())
}

pub fn avg_column(strategy: Strategy, metric: Metric) -> String {
    format!("{}_{}_avg", strategy.prefix(), metric.column())
}

pub fn joules_column(strategy: Strategy, metric: Metric) -> String {
    format!("{}_{}_avg_joules", strategy.prefix(), metric.column())
}

pub fn result_column(metric: Metric) -> String {
    format!("result_{}", metric.column())
}

/// Header of a summary file, in output order.
pub fn summary_headers() -> Vec<String> {
    let mut headers = vec![QUERY_COLUMN.to_string(), RECORD_SIZE_COLUMN.to_string()];
    for metric in Metric::ALL {
        for strategy in Strategy::BOTH {
            headers.push(values_column(strategy, metric));
        }
        for strategy in Strategy::BOTH {
            headers.push(avg_column(strategy, metric));
        }
        if metric.is_energy() {
            for strategy in Strategy::BOTH {
                headers.push(joules_column(strategy, metric));
            }
        }
        headers.push(result_column(metric));
    }
    headers
}

/// Statistics of one metric for both strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub metric: Metric,
    pub orm_values: Vec<f64>,
    pub sql_values: Vec<f64>,
    pub orm_avg: f64,
    pub sql_avg: f64,
    /// Present for energy metrics only.
    pub orm_joules: Option<f64>,
    pub sql_joules: Option<f64>,
    pub result: String,
}

impl MetricSummary {
    fn build(metric: Metric, orm: &SampleSet, sql: &SampleSet, joules_factor: f64) -> Self {
        let orm_values = orm.values(metric).to_vec();
        let sql_values = sql.values(metric).to_vec();
        let orm_avg = mean(&orm_values);
        let sql_avg = mean(&sql_values);

        let joules = |avg: f64| {
            metric
                .is_energy()
                .then(|| round_to(to_joules(avg, joules_factor), AVERAGE_PLACES))
        };

        Self {
            metric,
            orm_joules: joules(orm_avg),
            sql_joules: joules(sql_avg),
            result: format_result(orm_avg, sql_avg),
            orm_avg: round_to(orm_avg, AVERAGE_PLACES),
            sql_avg: round_to(sql_avg, AVERAGE_PLACES),
            orm_values,
            sql_values,
        }
    }
}

/// One operation's comparison for a single record size.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub operation: String,
    pub record_size: RecordSize,
    pub metrics: Vec<MetricSummary>,
}

impl SummaryRow {
    pub fn build(
        operation: impl Into<String>,
        record_size: RecordSize,
        orm: &SampleSet,
        sql: &SampleSet,
        joules_factor: f64,
    ) -> Self {
        Self {
            operation: operation.into(),
            record_size,
            metrics: Metric::ALL
                .iter()
                .map(|metric| MetricSummary::build(*metric, orm, sql, joules_factor))
                .collect(),
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// Fields in the order of [`summary_headers`].
    pub fn to_record(&self) -> Vec<String> {
        let mut fields = vec![self.operation.clone(), self.record_size.to_string()];
        for m in &self.metrics {
            fields.push(join_values(&m.orm_values));
            fields.push(join_values(&m.sql_values));
            fields.push(m.orm_avg.to_string());
            fields.push(m.sql_avg.to_string());
            if let (Some(orm), Some(sql)) = (m.orm_joules, m.sql_joules) {
                fields.push(orm.to_string());
                fields.push(sql.to_string());
            }
            fields.push(m.result.clone());
        }
        fields
    }
}

/// Summary produced for one record size.
#[derive(Debug, Clone)]
pub struct SizeSummary {
    pub size: RecordSize,
    pub path: PathBuf,
    pub rows: Vec<SummaryRow>,
}

/// Builds `{size}_energy_comparison_summary.csv` for one record size.
pub struct SizeAggregator {
    config: ReportConfig,
}

impl SizeAggregator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Pairs sample files and computes rows without touching the output.
    ///
    /// Returns `None` when either sample directory is missing.
    pub fn collect_rows(&self, size: RecordSize) -> Result<Option<Vec<SummaryRow>>, ReportError> {
        let orm_dir = self.config.sample_dir(size, Strategy::Orm);
        let sql_dir = self.config.sample_dir(size, Strategy::Sql);
        if !orm_dir.is_dir() || !sql_dir.is_dir() {
            warn!(
                size,
                orm_dir = %orm_dir.display(),
                sql_dir = %sql_dir.display(),
                "skipping record size: missing sample directories"
            );
            return Ok(None);
        }

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for orm_file in list_sample_files(&orm_dir, &self.config.baseline_prefix)? {
            if orm_file.size != size {
                warn!(
                    size,
                    file_size = orm_file.size,
                    path = %orm_file.path.display(),
                    "skipping sample file recorded for another size"
                );
                continue;
            }
            // Files are listed in path order, so the first spelling wins.
            if !seen.insert(orm_file.operation.clone()) {
                warn!(
                    size,
                    operation = %orm_file.operation,
                    path = %orm_file.path.display(),
                    "skipping duplicate sample file for operation"
                );
                continue;
            }
            let sql_path = sql_dir.join(self.config.sample_file_name(
                Strategy::Sql,
                &orm_file.operation,
                size,
            ));
            if !sql_path.is_file() {
                warn!(
                    size,
                    operation = %orm_file.operation,
                    expected = %sql_path.display(),
                    "skipping operation: sql sample file not found"
                );
                continue;
            }

            let orm = load_metric_values(&orm_file.path)?;
            let sql = load_metric_values(&sql_path)?;
            rows.push(SummaryRow::build(
                orm_file.operation,
                size,
                &orm,
                &sql,
                self.config.joules_factor,
            ));
        }

        let order = &self.config.operations;
        rows.sort_by(|a, b| order.compare(&a.operation, &b.operation));
        Ok(Some(rows))
    }

    /// Computes and writes the summary, overwriting any previous file.
    pub fn aggregate(&self, size: RecordSize) -> Result<Option<SizeSummary>, ReportError> {
        let Some(rows) = self.collect_rows(size)? else {
            return Ok(None);
        };

        let path = self.config.summary_path(size);
        write_summary(&path, &rows)?;
        info!(
            size,
            rows = rows.len(),
            path = %path.display(),
            "saved per-size summary"
        );
        Ok(Some(SizeSummary { size, path, rows }))
    }
}

pub fn write_summary(path: &Path, rows: &[SummaryRow]) -> Result<(), ReportError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|err| ReportError::io(dir, err))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|err| ReportError::csv(path, err))?;
    writer
        .write_record(summary_headers())
        .map_err(|err| ReportError::csv(path, err))?;
    for row in rows {
        writer
            .write_record(row.to_record())
            .map_err(|err| ReportError::csv(path, err))?;
    }
    writer.flush().map_err(|err| ReportError::io(path, err))?;
    Ok(())
}

/// A summary file read back by header name.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    path: PathBuf,
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl SummaryTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|err| ReportError::csv(path, err))?;

        let columns = reader
            .headers()
            .map_err(|err| ReportError::csv(path, err))?
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect::<HashMap<_, _>>();
        if !columns.contains_key(QUERY_COLUMN) {
            return Err(ReportError::MissingColumn {
                path: path.to_path_buf(),
                column: QUERY_COLUMN.to_string(),
            });
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ReportError::csv(path, err))?;

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            records,
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter_map(|record| self.field(record, QUERY_COLUMN))
    }

    /// First row for the operation, if any.
    pub fn row(&self, operation: &str) -> Option<SummaryEntry<'_>> {
        self.records
            .iter()
            .find(|record| self.field(record, QUERY_COLUMN) == Some(operation))
            .map(|record| SummaryEntry {
                table: self,
                record,
            })
    }

    fn field<'a>(&self, record: &'a StringRecord, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SummaryEntry<'a> {
    table: &'a SummaryTable,
    record: &'a StringRecord,
}

impl<'a> SummaryEntry<'a> {
    pub fn field(&self, column: &str) -> Option<&'a str> {
        self.table.field(self.record, column)
    }

    /// Numeric cell; `None` when the column is absent or the cell empty.
    /// `nan` and `inf` are malformed.
    pub fn number(&self, column: &str) -> Result<Option<f64>, ReportError> {
        match self.field(column) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Some(value)),
                _ => Err(self.malformed(column, raw)),
            },
        }
    }

    /// Semicolon-joined sample list; an absent column reads as empty.
    pub fn values(&self, column: &str) -> Result<Vec<f64>, ReportError> {
        let raw = self.field(column).unwrap_or_default();
        parse_values(raw).map_err(|err| self.malformed(column, &err.0))
    }

    fn malformed(&self, column: &str, value: &str) -> ReportError {
        ReportError::MalformedValue {
            path: self.table.path.clone(),
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}
