pub mod models;
pub mod processor;
pub mod storage;
pub mod utils;

use common::Result;
use common::config::Settings;
use models::JobReport;
use processor::{BatchOrchestrator, ConversionJob};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use tracing::info;
use utils::StopSignal;

/// Runs one conversion described by `settings`, polling `stop` for interrupts.
pub fn run_etl_pipeline(settings: &Settings, stop: &dyn StopSignal) -> Result<JobReport> {
    let job = ConversionJob::from_settings(settings)?;
    let report = BatchOrchestrator::new(job, stop).run()?;

    info!(
        outcome = ?report.outcome,
        processed = report.total_processed(),
        skipped = report.total_skipped(),
        failed_files = report.failed_files(),
        "Conversion finished"
    );

    if let Some(path) = &settings.report_path {
        write_report(&report, path)?;
    }

    Ok(report)
}

fn write_report(report: &JobReport, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!(path = %path.display(), "Wrote job report");
    Ok(())
}
