use super::converter::FileConverter;
use super::job::ConversionJob;
use crate::models::{FileMetrics, FileStatus, JobOutcome, JobReport};
use crate::storage::{CsvSink, CsvSinkOptions, MemorySink, RowSink};
use crate::utils::{SourceFile, StopSignal, TreeWalker};
use chrono::Utc;
use common::config::{Accumulation, LayoutMode};
use common::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of a conversion job.
///
/// `Running -> Flushing -> Terminated` on normal completion and
/// `Running -> Interrupted -> Flushing -> Terminated` once the stop signal fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Interrupted,
    Flushing,
    Terminated,
}

impl JobState {
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Running, JobState::Interrupted)
                | (JobState::Running, JobState::Flushing)
                | (JobState::Interrupted, JobState::Flushing)
                | (JobState::Flushing, JobState::Terminated)
        )
    }
}

enum OutputTarget {
    Stream(CsvSink),
    Buffered {
        buffer: MemorySink,
        destination: CsvSink,
    },
    Mirrored {
        output_root: PathBuf,
        suffix: String,
        output_suffix: String,
        options: CsvSinkOptions,
        current: Option<CsvSink>,
    },
}

impl OutputTarget {
    fn open(job: &ConversionJob) -> Result<Self> {
        let target = match (job.layout, job.accumulation) {
            (LayoutMode::FanIn, Accumulation::Stream) => {
                let mut sink = CsvSink::new(&job.output, job.sink_options.clone());
                // header up front so an empty or interrupted run still leaves a valid table
                sink.begin()?;
                OutputTarget::Stream(sink)
            }
            (LayoutMode::FanIn, Accumulation::Memory) => OutputTarget::Buffered {
                buffer: MemorySink::new(),
                destination: CsvSink::new(&job.output, job.sink_options.clone()),
            },
            (LayoutMode::Mirrored, _) => {
                fs::create_dir_all(&job.output)?;
                OutputTarget::Mirrored {
                    output_root: job.output.clone(),
                    suffix: job.suffix.clone(),
                    output_suffix: job.output_suffix.clone(),
                    options: job.sink_options.clone(),
                    current: None,
                }
            }
        };
        Ok(target)
    }

    fn sink_for(&mut self, file: &SourceFile) -> Result<&mut dyn RowSink> {
        match self {
            OutputTarget::Stream(sink) => Ok(sink),
            OutputTarget::Buffered { buffer, .. } => Ok(buffer),
            OutputTarget::Mirrored {
                output_root,
                suffix,
                output_suffix,
                options,
                current,
            } => {
                if let Some(previous) = current.as_mut() {
                    previous.flush()?;
                }
                let destination = file.destination(output_root, suffix, output_suffix);
                let sink = current.insert(CsvSink::new(&destination, options.clone()));
                Ok(sink)
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            OutputTarget::Stream(sink) => sink.flush(),
            OutputTarget::Buffered {
                buffer,
                destination,
            } => buffer.drain_into(destination),
            OutputTarget::Mirrored { current, .. } => match current.as_mut() {
                Some(sink) => sink.flush(),
                None => Ok(()),
            },
        }
    }
}

pub struct BatchOrchestrator<'a> {
    job: ConversionJob,
    stop: &'a dyn StopSignal,
    state: JobState,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(job: ConversionJob, stop: &'a dyn StopSignal) -> Self {
        Self {
            job,
            stop,
            state: JobState::Running,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    fn transition(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition(format!("{:?} -> {:?}", self.state, next)));
        }
        debug!(from = ?self.state, to = ?next, "Job state change");
        self.state = next;
        Ok(())
    }

    /// Runs the job once.
    ///
    /// Fails before touching any output when the input root is missing. Once
    /// running, per-line and per-file problems end up in the report and only
    /// output I/O errors abort the job.
    pub fn run(&mut self) -> Result<JobReport> {
        if self.state != JobState::Running {
            return Err(Error::InvalidTransition(format!(
                "job already ran (state {:?})",
                self.state
            )));
        }

        let started_at = Utc::now();
        let started = Instant::now();

        let walker = TreeWalker::new(&self.job.input_root, &self.job.suffix)?;
        let files: Vec<SourceFile> = walker.files().collect();
        info!(
            root = %walker.root().display(),
            files = files.len(),
            layout = ?self.job.layout,
            "Starting conversion"
        );

        let mut output = OutputTarget::open(&self.job)?;
        let progress = self.progress_bar(files.len());
        let converter = FileConverter::new(self.stop);
        let mut metrics: Vec<FileMetrics> = Vec::with_capacity(files.len());

        for file in &files {
            if self.stop.should_stop() {
                self.transition(JobState::Interrupted)?;
                break;
            }

            progress.set_message(file.relative.display().to_string());
            debug!(path = %file.path.display(), "Processing file");

            let sink = output.sink_for(file)?;
            let file_metrics = converter.convert(&file.path, sink)?;
            if let Some(reason) = file_metrics.failure_reason() {
                progress.suspend(|| {
                    warn!(path = %file.path.display(), reason, "File not fully converted");
                });
            }
            let interrupted = file_metrics.status == FileStatus::Interrupted;
            metrics.push(file_metrics);
            progress.inc(1);

            if interrupted {
                self.transition(JobState::Interrupted)?;
                break;
            }
        }
        progress.finish_and_clear();

        let outcome = if self.state == JobState::Interrupted {
            JobOutcome::Interrupted
        } else {
            JobOutcome::Completed
        };

        self.transition(JobState::Flushing)?;
        if outcome == JobOutcome::Interrupted {
            warn!(
                output = %self.job.output.display(),
                processed = metrics.iter().map(|m| m.processed_count).sum::<u64>(),
                "Interrupted, writing partial results"
            );
        }
        output.flush()?;
        self.transition(JobState::Terminated)?;

        let failed = metrics.iter().filter(|m| m.is_failed()).count();
        if failed > 0 {
            warn!(failed, "Some files could not be opened");
        }

        Ok(JobReport {
            started_at,
            elapsed: started.elapsed(),
            outcome,
            files: metrics,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        // log lines and the bar share stderr
        if !self.job.progress || !io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}
