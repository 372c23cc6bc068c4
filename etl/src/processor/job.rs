use crate::models::ColumnLayout;
use crate::storage::CsvSinkOptions;
use common::config::{Accumulation, LayoutMode, Settings};
use common::{Error, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input_root: PathBuf,
    // file in fan-in mode, root directory in mirrored mode
    pub output: PathBuf,
    pub layout: LayoutMode,
    pub suffix: String,
    pub output_suffix: String,
    pub accumulation: Accumulation,
    pub sink_options: CsvSinkOptions,
    pub progress: bool,
}

impl ConversionJob {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if settings.suffix.is_empty() {
            return Err(Error::InvalidInput("Input suffix must not be empty".to_string()));
        }
        if settings.layout == LayoutMode::Mirrored && settings.output_suffix.is_empty() {
            return Err(Error::InvalidInput(
                "Output suffix must not be empty in mirrored mode".to_string(),
            ));
        }

        Ok(Self {
            input_root: settings.input_root.clone(),
            output: settings.output.clone(),
            layout: settings.layout,
            suffix: settings.suffix.clone(),
            output_suffix: settings.output_suffix.clone(),
            accumulation: settings.accumulation,
            sink_options: CsvSinkOptions {
                layout: ColumnLayout::parse(&settings.columns)?,
                quote_all: settings.quote_all,
                flush_interval: settings.flush_interval,
            },
            progress: settings.progress,
        })
    }

    pub fn fan_in(input_root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output: output.into(),
            layout: LayoutMode::FanIn,
            suffix: ".jsonl".to_string(),
            output_suffix: ".csv".to_string(),
            accumulation: Accumulation::Stream,
            sink_options: CsvSinkOptions::default(),
            progress: false,
        }
    }

    pub fn mirrored(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            layout: LayoutMode::Mirrored,
            ..Self::fan_in(input_root, output_root)
        }
    }
}
