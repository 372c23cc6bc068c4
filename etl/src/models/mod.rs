mod metrics;
mod record;
mod row;

pub use metrics::{FileMetrics, FileStatus, JobOutcome, JobReport};
pub use record::{PostData, PublicMetrics, SourceRecord};
pub use row::{Column, ColumnLayout, MISSING_TEXT, NormalizedRow};
