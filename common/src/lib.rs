use std::path::PathBuf;
use thiserror::Error;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Input directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid UTF-8 in line: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid job state transition: {0}")]
    InvalidTransition(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_not_found_names_path() {
        let err = Error::DirectoryNotFound(PathBuf::from("/no/such/archive"));
        assert_eq!(err.to_string(), "Input directory not found: /no/such/archive");
    }
}
