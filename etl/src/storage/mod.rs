pub mod csv_sink;
pub mod memory;

pub use csv_sink::{CsvSink, CsvSinkOptions};
pub use memory::MemorySink;

use crate::models::NormalizedRow;
use common::Result;

/// Destination for normalized rows.
///
/// `begin` is called once a source has been opened successfully and before any
/// of its rows; sinks shared across sources must treat repeated calls as no-ops
/// so the header lands exactly once.
pub trait RowSink {
    fn begin(&mut self) -> Result<()>;

    fn write_row(&mut self, row: &NormalizedRow) -> Result<()>;

    /// Pushes every row accepted so far to durable storage.
    fn flush(&mut self) -> Result<()>;
}
