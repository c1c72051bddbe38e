//! Energy and duration comparison of ORM versus raw SQL data access.
//!
//! Sample files written by an external energy tracker are aggregated per
//! record size, then joined across sizes into full and trimmed comparison
//! tables. Database lifecycle and measurement live outside this crate.

pub mod compare;
pub mod config;
pub mod cross;
pub mod error;
pub mod pipeline;
pub mod samples;
pub mod stats;
pub mod summary;
pub mod types;

pub use compare::{format_delta, format_result};
pub use config::{JOULES_PER_KWH, ReportConfig};
pub use cross::{CrossComparator, CrossTable, CrossVariant};
pub use error::ReportError;
pub use pipeline::{Pipeline, RunReport, parse_size_list};
pub use stats::trimmed_mean;
pub use summary::{SizeAggregator, SizeSummary, SummaryRow, SummaryTable};
pub use types::{Metric, OperationOrder, RecordSize, Strategy};
