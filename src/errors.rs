//! Error types for summary generation.
//!
//! Only [`SummaryError::DirectoryUnreadable`] is fatal to a run. Every other
//! variant is raised per file or per stage and converted into a
//! [`CollectionWarning`](crate::core::CollectionWarning) by the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for e2e-summary operations
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The dump directory itself is missing or cannot be listed
    #[error("input directory {} is not readable: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML payload is malformed after banner stripping
    #[error("malformed YAML in {file}: {source}")]
    Yaml {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// JUnit report could not be parsed
    #[error("malformed test report {file}: {message}")]
    TestReport { file: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Document serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SummaryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn yaml(file: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            file: file.into(),
            source,
        }
    }

    pub fn test_report(file: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::TestReport {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Whether the orchestrator may substitute a default and continue.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DirectoryUnreadable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_is_fatal() {
        let err = SummaryError::DirectoryUnreadable {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_file_errors_are_recoverable() {
        let err = SummaryError::test_report("myreport.xml", "unexpected EOF");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "malformed test report myreport.xml: unexpected EOF"
        );
    }
}
