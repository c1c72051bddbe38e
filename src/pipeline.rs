use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::cross::{CrossComparator, CrossTable, CrossVariant, numeric_dirs};
use crate::error::ReportError;
use crate::summary::{SizeAggregator, SizeSummary};
use crate::types::RecordSize;

/// A written cross-size comparison.
#[derive(Debug, Clone)]
pub struct CrossOutput {
    pub table: CrossTable,
    pub path: PathBuf,
}

/// Everything one pipeline pass produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub summaries: Vec<SizeSummary>,
    /// Sizes whose sample directories were missing.
    pub skipped: Vec<RecordSize>,
    pub full: Option<CrossOutput>,
    pub trimmed: Option<CrossOutput>,
}

impl RunReport {
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.summaries
            .iter()
            .map(|s| s.path.clone())
            .chain(self.full.iter().map(|c| c.path.clone()))
            .chain(self.trimmed.iter().map(|c| c.path.clone()))
            .collect()
    }
}

/// Per-size aggregation followed by both cross-size comparisons.
///
/// Outputs are regenerated in full on every run. Two runs against the same
/// results directory race as last-writer-wins.
pub struct Pipeline {
    config: ReportConfig,
}

impl Pipeline {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Processes `sizes`, or every numeric folder of the results root when
    /// `None`.
    pub fn run(&self, sizes: Option<&[RecordSize]>) -> Result<RunReport, ReportError> {
        let sizes = match sizes {
            Some(sizes) => sizes.to_vec(),
            None => numeric_dirs(&self.config.results_dir)?,
        };

        let mut report = RunReport::default();
        let aggregator = SizeAggregator::new(self.config.clone());
        for size in sizes {
            info!(size, "processing record size");
            match aggregator.aggregate(size)? {
                Some(summary) => report.summaries.push(summary),
                None => report.skipped.push(size),
            }
        }

        info!("building full cross-record comparison");
        report.full = self.compare(CrossVariant::Full)?;
        info!("building trimmed cross-record comparison");
        report.trimmed = self.compare(CrossVariant::Trimmed)?;
        Ok(report)
    }

    fn compare(&self, variant: CrossVariant) -> Result<Option<CrossOutput>, ReportError> {
        let comparator = CrossComparator::new(self.config.clone(), variant);
        Ok(comparator
            .run()?
            .map(|(table, path)| CrossOutput { table, path }))
    }
}

/// Parses `"100,500,abc,100"` into sorted, deduplicated sizes.
///
/// Tokens that are not plain digits are ignored with a warning.
pub fn parse_size_list(raw: &str) -> Vec<RecordSize> {
    let mut sizes = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let parsed = token
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| token.parse::<RecordSize>().ok())
            .flatten();
        match parsed {
            Some(size) => sizes.push(size),
            None => warn!(token, "ignoring invalid record size"),
        }
    }
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}
