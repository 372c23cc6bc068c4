use super::RowSink;
use crate::models::{ColumnLayout, NormalizedRow};
use common::Result;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvSinkOptions {
    pub layout: ColumnLayout,
    pub quote_all: bool,
    // 0 leaves flushing to the caller
    pub flush_interval: usize,
}

impl Default for CsvSinkOptions {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            quote_all: false,
            flush_interval: 0,
        }
    }
}

pub struct CsvSink {
    destination: PathBuf,
    options: CsvSinkOptions,
    writer: Option<Writer<File>>,
    rows_written: u64,
    unflushed: usize,
}

impl CsvSink {
    pub fn new(destination: &Path, options: CsvSinkOptions) -> Self {
        Self {
            destination: destination.to_path_buf(),
            options,
            writer: None,
            rows_written: 0,
            unflushed: 0,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn open(&self) -> Result<Writer<File>> {
        if let Some(parent) = self.destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let quote_style = if self.options.quote_all {
            QuoteStyle::Always
        } else {
            QuoteStyle::Necessary
        };
        let file = File::create(&self.destination)?;
        let mut writer = WriterBuilder::new().quote_style(quote_style).from_writer(file);
        writer.write_record(self.options.layout.headers())?;

        debug!(destination = %self.destination.display(), "Opened CSV output");
        Ok(writer)
    }
}

impl RowSink for CsvSink {
    fn begin(&mut self) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(self.open()?);
        }
        Ok(())
    }

    fn write_row(&mut self, row: &NormalizedRow) -> Result<()> {
        self.begin()?;
        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => return Err(common::Error::Other("CSV writer not initialised".to_string())),
        };

        writer.write_record(row.record(&self.options.layout))?;
        self.rows_written += 1;
        self.unflushed += 1;

        if self.options.flush_interval > 0 && self.unflushed >= self.options.flush_interval {
            writer.flush()?;
            self.unflushed = 0;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            self.unflushed = 0;
        }
        Ok(())
    }
}
