//! Error types for workspace-session
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::ProjectPath;

/// Top-level error type for workspace-session
#[derive(Error, Debug)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Browse error: {0}")]
    Browse(#[from] BrowseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the failure is transient and the caller may simply retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Remote(RemoteError::Transport(_)))
            || matches!(self, Self::Session(SessionError::Busy))
    }

    /// Whether this error signals a bug rather than a user-facing failure
    pub fn is_bug(&self) -> bool {
        matches!(self, Self::Session(SessionError::InvariantViolation(_)))
    }
}

/// Local session-state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot close the last open project")]
    LastProject,

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Project is not open in this session: {0}")]
    ProjectNotOpen(ProjectPath),

    #[error("Another workspace operation is already in flight")]
    Busy,
}

/// Remote project service errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service rejected request: {reason}")]
    Service { reason: String },
}

impl RemoteError {
    /// Build a service rejection from any reason string
    pub fn service(reason: impl Into<String>) -> Self {
        Self::Service {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Transport(format!("request timed out: {}", e))
        } else if e.is_connect() {
            RemoteError::Transport(format!("connection failed: {}", e))
        } else if e.is_decode() {
            RemoteError::Transport(format!("invalid response body: {}", e))
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

/// Folder browser errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowseError {
    #[error("Folder browser is not active")]
    NotBrowsing,

    #[error("Path is not an entry of the current folder: {0}")]
    NotAnEntry(String),

    #[error("No folder selected")]
    NothingSelected,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::LastProject;
        assert!(err.to_string().contains("last open project"));

        let err = RemoteError::service("path is not a directory");
        assert!(err.to_string().contains("path is not a directory"));

        let err = SessionError::ProjectNotOpen(ProjectPath::new("/tmp/foo"));
        assert!(err.to_string().contains("/tmp/foo"));
    }

    #[test]
    fn test_error_conversion() {
        let top: Error = SessionError::Busy.into();
        assert!(top.is_transient());

        let top: Error = RemoteError::Transport("refused".into()).into();
        assert!(top.is_transient());

        let top: Error = RemoteError::service("already open").into();
        assert!(!top.is_transient());

        let top: Error = SessionError::InvariantViolation("dangling active".into()).into();
        assert!(top.is_bug());
    }
}
