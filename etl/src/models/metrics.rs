use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FileStatus {
    Completed,
    Interrupted,
    OpenFailed(String),
    ReadFailed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct FileMetrics {
    pub path: PathBuf,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub processed_count: u64,
    pub skipped_count: u64,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileMetrics {
    pub fn open_failed(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            elapsed: Duration::ZERO,
            processed_count: 0,
            skipped_count: 0,
            status: FileStatus::OpenFailed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FileStatus::OpenFailed(_))
    }

    pub fn total_lines(&self) -> u64 {
        self.processed_count + self.skipped_count
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            FileStatus::OpenFailed(reason) | FileStatus::ReadFailed(reason) => Some(reason),
            FileStatus::Completed | FileStatus::Interrupted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Completed,
    Interrupted,
}

impl JobOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            JobOutcome::Completed => 0,
            JobOutcome::Interrupted => 130,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub outcome: JobOutcome,
    pub files: Vec<FileMetrics>,
}

impl JobReport {
    pub fn total_processed(&self) -> u64 {
        self.files.iter().map(|f| f.processed_count).sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.files.iter().map(|f| f.skipped_count).sum()
    }

    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.is_failed()).count()
    }

    pub fn average_file_time(&self) -> Option<Duration> {
        if self.files.is_empty() {
            return None;
        }
        let total: Duration = self.files.iter().map(|f| f.elapsed).sum();
        Some(total / self.files.len() as u32)
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Processing Summary ---")?;
        for file in &self.files {
            writeln!(f, "File: {}", file.path.display())?;
            writeln!(f, "  Processing Time: {:.2} seconds", file.elapsed.as_secs_f64())?;
            writeln!(f, "  Processed Lines: {}", file.processed_count)?;
            writeln!(f, "  Skipped Lines: {}", file.skipped_count)?;
            match &file.status {
                FileStatus::Completed => {}
                FileStatus::Interrupted => writeln!(f, "  Status: interrupted")?,
                FileStatus::OpenFailed(reason) => writeln!(f, "  Status: open failed ({})", reason)?,
                FileStatus::ReadFailed(reason) => writeln!(f, "  Status: read failed ({})", reason)?,
            }
        }

        writeln!(f)?;
        if let Some(avg) = self.average_file_time() {
            writeln!(f, "Average File Processing Time: {:.2} seconds", avg.as_secs_f64())?;
        }
        writeln!(f, "Files: {} ({} failed to open)", self.files.len(), self.failed_files())?;
        writeln!(f, "Processed Lines: {}", self.total_processed())?;
        writeln!(f, "Skipped Lines: {}", self.total_skipped())?;
        write!(f, "Total Processing Time: {:.2} seconds", self.elapsed.as_secs_f64())?;
        if self.outcome == JobOutcome::Interrupted {
            write!(f, "\nInterrupted: partial results written")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(path: &str, processed: u64, skipped: u64, millis: u64) -> FileMetrics {
        FileMetrics {
            path: PathBuf::from(path),
            elapsed: Duration::from_millis(millis),
            processed_count: processed,
            skipped_count: skipped,
            status: FileStatus::Completed,
        }
    }

    fn report(files: Vec<FileMetrics>) -> JobReport {
        JobReport {
            started_at: Utc::now(),
            elapsed: Duration::from_secs(1),
            outcome: JobOutcome::Completed,
            files,
        }
    }

    #[test]
    fn test_totals_and_average() {
        let report = report(vec![
            metrics("a.jsonl", 10, 2, 100),
            metrics("b.jsonl", 5, 0, 300),
            FileMetrics::open_failed(Path::new("c.jsonl"), "permission denied"),
        ]);

        assert_eq!(report.total_processed(), 15);
        assert_eq!(report.total_skipped(), 2);
        assert_eq!(report.failed_files(), 1);
        assert_eq!(report.average_file_time(), Some(Duration::from_millis(400) / 3));
    }

    #[test]
    fn test_empty_report_has_no_average() {
        let report = report(Vec::new());
        assert_eq!(report.average_file_time(), None);
        assert!(report.to_string().contains("Processed Lines: 0"));
    }

    #[test]
    fn test_report_serializes_status_inline() {
        let report = report(vec![FileMetrics::open_failed(Path::new("c.jsonl"), "denied")]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["files"][0]["status"], "open_failed");
        assert_eq!(json["files"][0]["reason"], "denied");
        assert_eq!(json["files"][0]["processed_count"], 0);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(JobOutcome::Completed.exit_code(), 0);
        assert_ne!(JobOutcome::Interrupted.exit_code(), 0);
    }

    #[test]
    fn test_failure_reason_only_for_failed_reads() {
        let mut file = metrics("a.jsonl", 1, 0, 5);
        assert_eq!(file.failure_reason(), None);
        file.status = FileStatus::Interrupted;
        assert_eq!(file.failure_reason(), None);
        file.status = FileStatus::ReadFailed("Is a directory".to_string());
        assert_eq!(file.failure_reason(), Some("Is a directory"));
        assert!(!file.is_failed());

        let unopened = FileMetrics::open_failed(Path::new("b.jsonl"), "No such file");
        assert_eq!(unopened.failure_reason(), Some("No such file"));
    }
}
