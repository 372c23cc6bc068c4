use super::extractor::RecordExtractor;
use crate::models::{FileMetrics, FileStatus};
use crate::storage::RowSink;
use crate::utils::StopSignal;
use common::{Error, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Streams one source file through the [`RecordExtractor`] into a sink.
pub struct FileConverter<'a> {
    extractor: RecordExtractor,
    stop: &'a dyn StopSignal,
}

impl<'a> FileConverter<'a> {
    pub fn new(stop: &'a dyn StopSignal) -> Self {
        Self {
            extractor: RecordExtractor::new(),
            stop,
        }
    }

    /// Converts `path` line by line.
    ///
    /// Bad lines are counted as skipped, an unopenable file yields zeroed
    /// metrics with [`FileStatus::OpenFailed`], and the stop signal is polled
    /// after each line is read and before it is processed. Only sink errors
    /// are returned as `Err`.
    pub fn convert(&self, path: &Path, sink: &mut dyn RowSink) -> Result<FileMetrics> {
        let file = match open_source(path) {
            Ok(file) => file,
            Err(err) => {
                debug!(error = %err, "Skipping file");
                return Ok(FileMetrics::open_failed(path, err.to_string()));
            }
        };
        self.convert_reader(path, BufReader::new(file), sink)
    }

    pub fn convert_reader<R: BufRead>(
        &self,
        path: &Path,
        mut reader: R,
        sink: &mut dyn RowSink,
    ) -> Result<FileMetrics> {
        let started = Instant::now();
        sink.begin()?;

        let mut line = Vec::new();
        let mut processed_count = 0u64;
        let mut skipped_count = 0u64;
        let mut status = FileStatus::Completed;

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Read failed, keeping rows so far");
                    status = FileStatus::ReadFailed(e.to_string());
                    break;
                }
            }

            if self.stop.should_stop() {
                status = FileStatus::Interrupted;
                break;
            }

            match self.extractor.extract_bytes(&line) {
                Ok(row) => {
                    sink.write_row(&row)?;
                    processed_count += 1;
                }
                Err(e) => {
                    debug!(
                        path = %path.display(),
                        line = processed_count + skipped_count + 1,
                        error = %e,
                        "Skipping line"
                    );
                    skipped_count += 1;
                }
            }
        }

        Ok(FileMetrics {
            path: path.to_path_buf(),
            elapsed: started.elapsed(),
            processed_count,
            skipped_count,
            status,
        })
    }
}

fn open_source(path: &Path) -> Result<File> {
    let file = File::open(path)
        .and_then(|file| {
            if file.metadata()?.is_dir() {
                return Err(io::Error::from(io::ErrorKind::IsADirectory));
            }
            Ok(file)
        })
        .map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file)
}
