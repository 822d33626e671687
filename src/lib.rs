//! Workspace Session - client-side session manager for multi-project workspaces
//!
//! Tracks which projects are open in a workspace session and which one is
//! active, keeping that state consistent with a remote project service across
//! asynchronous open/close/switch operations.
//!
//! # Architecture
//!
//! - **SessionService** - Request/response client for the remote service
//! - **SessionStore** - Ordered open projects plus the active one
//! - **FolderBrowser** - Navigation cursor used while opening a project
//! - **WorkspaceManager** - Sequences lifecycle operations and reloads dependent views
//!
//! # Modules
//!
//! - [`session`] - Session model, state store and lifecycle coordination
//! - [`remote`] - Remote project service trait and HTTP client
//! - [`browser`] - Remote folder browsing and breadcrumbs
//! - [`config`] - Layered configuration
//! - [`error`] - Error types

pub mod browser;
pub mod config;
pub mod error;
pub mod remote;
pub mod session;

pub use browser::{BrowseCursor, BrowsePhase, FolderBrowser};
pub use config::{Config, GatePolicy};
pub use error::{Error, Result};
pub use remote::{HttpSessionClient, SessionService};
pub use session::{
    ActiveProjectChanged, DependentView, ProjectEntry, ProjectPath, SessionState, SessionStore,
    SetupPresenter, WorkspaceManager,
};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
