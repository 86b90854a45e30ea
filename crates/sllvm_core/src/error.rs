use std::io;
use std::path::PathBuf;

use ndarray_npy::WriteNpyError;

/// Fatal errors that abort an analysis batch.
///
/// Per-cell problems (missing or malformed trajectory files) are not errors;
/// they are collected as [`crate::model::Diagnostic`]s and the batch continues.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The sweep argument has no suffix structure
    #[error("no specified suffix structure for sweep argument `{0}`")]
    UnsupportedArgument(String),

    /// Any other invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: WriteNpyError,
    },
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
