//! Core session types
//!
//! Defines the client-side session model:
//! - `ProjectPath` identifies a project on the service's filesystem
//! - `ProjectEntry` represents one open project
//! - `SessionState` is a snapshot of the whole remote session

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path separator convention of a remote path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `/`-separated (Unix-like service)
    Slash,
    /// `\`-separated (Windows service)
    Backslash,
}

impl Separator {
    /// Infer the separator from the path itself, never from the host platform
    pub fn infer(path: &str) -> Self {
        if path.contains('\\') {
            Self::Backslash
        } else {
            Self::Slash
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Slash => '/',
            Self::Backslash => '\\',
        }
    }
}

/// Unique identifier for a project: its absolute path on the service's filesystem
///
/// Kept as an opaque string because the service may run on a platform whose
/// path conventions differ from the client's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectPath(String);

impl ProjectPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn separator(&self) -> Separator {
        Separator::infer(&self.0)
    }

    /// Display name derived from the path (last non-empty segment)
    pub fn display_name(&self) -> String {
        let sep = self.separator().as_char();
        self.0
            .split(sep)
            .rfind(|s| !s.is_empty())
            .unwrap_or(self.0.as_str())
            .to_string()
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProjectPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One project open in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Unique identifier, stable for the lifetime of the entry
    pub path: ProjectPath,
    /// Display label (not guaranteed unique)
    #[serde(default)]
    pub name: String,
    /// Whether first-time setup has completed
    #[serde(default)]
    pub initialized: bool,
}

impl ProjectEntry {
    /// Create an entry, deriving the display name from the path
    pub fn new(path: impl Into<ProjectPath>, initialized: bool) -> Self {
        let path = path.into();
        let name = path.display_name();
        Self {
            path,
            name,
            initialized,
        }
    }

    /// Fill in a missing display name from the path
    pub(crate) fn with_derived_name(mut self) -> Self {
        if self.name.is_empty() {
            self.name = self.path.display_name();
        }
        self
    }
}

/// Snapshot of the remote session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Open projects, in open (and display) order
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    /// Path of the active project, if any
    #[serde(default, alias = "activeProject")]
    pub active_project: Option<ProjectPath>,
}

impl SessionState {
    pub fn new(projects: Vec<ProjectEntry>, active_project: Option<ProjectPath>) -> Self {
        Self {
            projects,
            active_project,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Notification payload delivered to dependent views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveProjectChanged {
    /// Previously active project, if any
    pub previous: Option<ProjectPath>,
    /// Newly active project
    pub current: ProjectPath,
}
