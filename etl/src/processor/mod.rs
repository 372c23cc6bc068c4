pub mod converter;
pub mod extractor;
pub mod job;
pub mod orchestrator;

pub use converter::FileConverter;
pub use extractor::{RecordExtractor, strip_line_breaks};
pub use job::ConversionJob;
pub use orchestrator::{BatchOrchestrator, JobState};
