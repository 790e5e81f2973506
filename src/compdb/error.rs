use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilationDatabaseError {
    #[error("Path does not exist: {path}")]
    NotFound { path: String },

    #[error("Malformed compilation database entry #{index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    #[error("Failed to parse {path}: {error}")]
    ParseError { path: String, error: String },

    #[error("Cannot resolve path {path}: {reason}")]
    PathResolutionError { path: String, reason: String },

    #[error("Invalid filter pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompilationDatabaseError {
    pub(crate) fn not_found(path: &std::path::Path) -> Self {
        Self::NotFound {
            path: path.to_string_lossy().to_string(),
        }
    }

    pub(crate) fn unresolved(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::PathResolutionError {
            path: path.to_string_lossy().to_string(),
            reason: reason.into(),
        }
    }
}
