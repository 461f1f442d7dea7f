//! Unified error types for repo-setup.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while setting up a project.
#[derive(Error, Debug)]
pub enum SetupError {
    // --- Configuration ---

    /// The layout file passed with `--layout` was not found.
    #[error("layout file not found at {path}")]
    LayoutNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The layout file exists but contains invalid JSON.
    #[error("failed to parse layout at {path}")]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Prompts ---

    /// The operator did not confirm the collected answers.
    #[error("setup aborted: answers were not confirmed")]
    Aborted,

    /// Reading an answer from the console failed.
    #[error("console error")]
    Console(#[source] io::Error),

    // --- Filesystem ---

    /// A filesystem operation on a specific path failed.
    #[error("failed to {action} {path}")]
    Fs {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A per-file rewrite task panicked or was cancelled.
    #[error("rewrite task failed: {0}")]
    Task(String),
}

impl SetupError {
    /// Wrap an I/O error with the action and path that produced it.
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Fs {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this is a "benign absence": the target did not exist, or a
    /// create target already existed. Everything else is fatal.
    pub fn is_benign(&self) -> bool {
        match self {
            Self::Fs { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::AlreadyExists
            ),
            _ => false,
        }
    }
}

/// Alias for `Result<T, SetupError>`.
pub type Result<T> = std::result::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_benign() {
        let err = SetupError::fs(
            "remove",
            "package.json",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.is_benign());
    }

    #[test]
    fn test_already_exists_is_benign() {
        let err = SetupError::fs(
            "create",
            ".github",
            io::Error::from(io::ErrorKind::AlreadyExists),
        );
        assert!(err.is_benign());
    }

    #[test]
    fn test_permission_denied_is_fatal() {
        let err = SetupError::fs(
            "rename",
            "template/README.md",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_benign());
    }

    #[test]
    fn test_aborted_is_fatal() {
        assert!(!SetupError::Aborted.is_benign());
        assert!(!SetupError::Task("panicked".into()).is_benign());
        assert!(!SetupError::Console(io::Error::from(io::ErrorKind::NotFound)).is_benign());
    }

    #[test]
    fn test_fs_display_names_path() {
        let err = SetupError::fs(
            "remove",
            "node_modules",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert_eq!(err.to_string(), "failed to remove node_modules");
    }
}
