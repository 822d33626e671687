//! Remote project service integration
//!
//! - `SessionService` - The six workspace operations the coordinator depends on
//! - `HttpSessionClient` - reqwest-backed implementation against the service's HTTP API

mod http;

pub use http::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::session::{ProjectEntry, ProjectPath, SessionState};

/// Result of a single remote call
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// One entry of a remote folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    /// Whether the folder already looks like a project
    #[serde(default, alias = "isProject")]
    pub is_project: bool,
}

/// A remote folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(alias = "currentPath")]
    pub current_path: String,
    #[serde(default)]
    pub entries: Vec<FolderEntry>,
}

/// Response of a successful `open`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedProject {
    /// Whether first-time setup has already been completed
    pub initialized: bool,
    /// The project as the service recorded it, when reported
    pub project: Option<ProjectEntry>,
}

/// Response of a successful `close`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedProject {
    /// The service's chosen active project after the close
    pub active_project: Option<ProjectPath>,
}

/// Request/response operations exposed by the remote project service
///
/// Implementations carry no state and no retry policy of their own.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Fetch the canonical session snapshot
    async fn load_state(&self) -> RemoteResult<SessionState>;

    /// List a folder, or the service's default root when `path` is `None`
    async fn browse(&self, path: Option<&str>) -> RemoteResult<FolderListing>;

    /// Previously opened paths, most recent first
    async fn list_recent(&self) -> RemoteResult<Vec<ProjectPath>>;

    async fn open(&self, path: &ProjectPath) -> RemoteResult<OpenedProject>;

    async fn close(&self, path: &ProjectPath) -> RemoteResult<ClosedProject>;

    async fn set_active(&self, path: &ProjectPath) -> RemoteResult<()>;
}
