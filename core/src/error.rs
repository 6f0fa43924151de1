//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// None of these is recovered locally; any error aborts the whole patch run.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// IO failure on a specific target file.
    #[from(ignore)]
    #[display("Failed to {action} {}: {source}", path.display())]
    File {
        /// What was being attempted (`read` or `write`).
        action: &'static str,
        /// The target file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Failure while walking the dependency cache.
    #[display("Traversal Error: {_0}")]
    Walk(walkdir::Error),

    /// A patch that cannot be applied idempotently.
    #[display("Invalid patch: {_0}")]
    InvalidPatch(String),
}

impl AppError {
    /// Builds a `map_err` adapter that tags an IO error with the file it hit.
    pub(crate) fn file(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| AppError::File {
            action,
            path,
            source,
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::File { source, .. } => Some(source),
            AppError::Walk(e) => Some(e),
            AppError::InvalidPatch(_) => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
