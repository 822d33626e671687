//! Workspace manager - coordinates project lifecycle
//!
//! Handles loading, opening, closing and switching projects, sequencing the
//! remote calls, committing canonical state to the store and fanning out
//! reload notifications to dependent views.
//!
//! Mutating operations pass through a single-slot gate, so at most one of
//! them is in flight at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, GatePolicy};
use crate::error::{Error, Result, SessionError};
use crate::remote::SessionService;
use crate::session::{
    ActiveProjectChanged, DependentView, ProjectEntry, ProjectPath, ReloadFanout, ReloadReport,
    Replaced, SessionState, SessionStore, SetupPresenter,
};

/// Result of a successful `open_project`
#[derive(Debug, Clone)]
pub struct OpenOutcome {
    /// The opened project, now active
    pub project: ProjectEntry,
    /// First-time setup has not been completed for this project
    pub needs_setup: bool,
    pub reload: ReloadReport,
}

/// Result of a successful `close_project`
#[derive(Debug, Clone)]
pub struct CloseOutcome {
    /// Active project after the close
    pub active_project: Option<ProjectPath>,
    /// Present only when the close changed the active project
    pub reload: Option<ReloadReport>,
}

/// Result of a successful `switch_to`
#[derive(Debug, Clone)]
pub enum SwitchOutcome {
    /// Target was already active; nothing was sent or reloaded
    AlreadyActive,
    Switched {
        needs_setup: bool,
        reload: ReloadReport,
    },
}

/// Workspace manager coordinates all session operations
pub struct WorkspaceManager {
    /// Remote project service
    service: Arc<dyn SessionService>,
    /// Client-side session state; this manager is its only writer
    store: RwLock<SessionStore>,
    /// Single-slot gate for mutating operations
    gate: Mutex<()>,
    policy: GatePolicy,
    /// Dependent views reloaded on active-project change
    views: ReloadFanout,
    setup: Option<Arc<dyn SetupPresenter>>,
}

impl WorkspaceManager {
    /// Create a new workspace manager
    pub fn new(config: &Config, service: Arc<dyn SessionService>) -> Self {
        Self {
            service,
            store: RwLock::new(SessionStore::new()),
            gate: Mutex::new(()),
            policy: config.gate_policy,
            views: ReloadFanout::with_timeout(Duration::from_millis(config.reload_timeout_ms)),
            setup: None,
        }
    }

    /// Register a view to reload whenever the active project changes
    pub fn with_view(mut self, view: Arc<dyn DependentView>) -> Self {
        self.views.register(view);
        self
    }

    /// Set the presenter invoked for uninitialized projects
    pub fn with_setup_presenter(mut self, presenter: Arc<dyn SetupPresenter>) -> Self {
        self.setup = Some(presenter);
        self
    }

    /// The remote service this manager talks to
    pub fn service(&self) -> Arc<dyn SessionService> {
        Arc::clone(&self.service)
    }

    /// Read access to the session state for presenters
    pub async fn state(&self) -> RwLockReadGuard<'_, SessionStore> {
        self.store.read().await
    }

    /// Owned copy of the current session state
    pub async fn snapshot(&self) -> SessionState {
        self.store.read().await.snapshot()
    }

    /// Fetch canonical state from the service
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<()> {
        let _op = self.begin().await?;
        self.refresh().await?;

        let store = self.store.read().await;
        info!(
            "Loaded session: {} project(s), active {:?}",
            store.len(),
            store.active_project().map(ProjectPath::as_str)
        );
        Ok(())
    }

    /// Open a project and make it active
    #[instrument(skip(self), fields(path = %path))]
    pub async fn open_project(&self, path: ProjectPath) -> Result<OpenOutcome> {
        let _op = self.begin().await?;
        let previous = self.store.read().await.active_project().cloned();

        let opened = self
            .service
            .open(&path)
            .await
            .inspect_err(|e| warn!("Failed to open {}: {}", path, e))?;

        // The service may normalize the path it records
        let opened_path = opened
            .project
            .as_ref()
            .map(|p| p.path.clone())
            .unwrap_or_else(|| path.clone());

        self.refresh().await?;

        // Pin the opened project in case the listing raced another change
        let project = {
            let mut store = self.store.write().await;
            let project = store.find(&opened_path).cloned().ok_or_else(|| {
                SessionError::InvariantViolation(format!(
                    "opened project {} missing from reloaded state",
                    opened_path
                ))
            })?;
            store.set_active_locally(&opened_path)?;
            project
        };

        info!("Opened project '{}' ({})", project.name, project.path);

        let needs_setup = !opened.initialized;
        let reload = self
            .views
            .notify(&ActiveProjectChanged {
                previous,
                current: opened_path,
            })
            .await;

        if needs_setup {
            self.present_setup(&project);
        }

        Ok(OpenOutcome {
            project,
            needs_setup,
            reload,
        })
    }

    /// Close a project; the session always keeps at least one open
    #[instrument(skip(self), fields(path = %path))]
    pub async fn close_project(&self, path: ProjectPath) -> Result<CloseOutcome> {
        let _op = self.begin().await?;

        let previous = {
            let store = self.store.read().await;
            if store.len() <= 1 {
                return Err(SessionError::LastProject.into());
            }
            store.active_project().cloned()
        };

        let closed = self
            .service
            .close(&path)
            .await
            .inspect_err(|e| warn!("Failed to close {}: {}", path, e))?;

        self.refresh().await?;

        let current = {
            let mut store = self.store.write().await;
            if store.active_project().is_none() {
                // Listing carried no active project; fall back to the one the
                // close response reported
                if let Some(reported) = closed.active_project.as_ref() {
                    if store.contains(reported) {
                        store.set_active_locally(reported)?;
                    }
                }
            }
            store.active_project().cloned()
        };

        info!("Closed project {}", path);

        let reload = match active_changed(previous, current.as_ref()) {
            Some(change) => Some(self.views.notify(&change).await),
            None => {
                debug!("Active project unchanged, skipping view reload");
                None
            }
        };

        Ok(CloseOutcome {
            active_project: current,
            reload,
        })
    }

    /// Make an already-open project the active one
    #[instrument(skip(self), fields(path = %path))]
    pub async fn switch_to(&self, path: ProjectPath) -> Result<SwitchOutcome> {
        let _op = self.begin().await?;

        let (previous, entry) = {
            let store = self.store.read().await;
            if store.is_active(&path) {
                debug!("{} is already active", path);
                return Ok(SwitchOutcome::AlreadyActive);
            }
            let entry = store
                .find(&path)
                .cloned()
                .ok_or_else(|| SessionError::ProjectNotOpen(path.clone()))?;
            (store.active_project().cloned(), entry)
        };

        self.service
            .set_active(&path)
            .await
            .inspect_err(|e| warn!("Failed to switch to {}: {}", path, e))?;

        self.store.write().await.set_active_locally(&path)?;

        info!("Switched to project '{}' ({})", entry.name, entry.path);

        let reload = self
            .views
            .notify(&ActiveProjectChanged {
                previous,
                current: path,
            })
            .await;

        let needs_setup = !entry.initialized;
        if needs_setup {
            self.present_setup(&entry);
        }

        Ok(SwitchOutcome::Switched {
            needs_setup,
            reload,
        })
    }

    /// Previously opened projects, most recent first
    pub async fn list_recent(&self) -> Result<Vec<ProjectPath>> {
        Ok(self.service.list_recent().await?)
    }

    /// Acquire the operation gate according to the configured policy
    async fn begin(&self) -> Result<MutexGuard<'_, ()>> {
        match self.policy {
            GatePolicy::Queue => Ok(self.gate.lock().await),
            GatePolicy::Reject => self.gate.try_lock().map_err(|_| {
                debug!("Rejecting operation: another one is in flight");
                Error::from(SessionError::Busy)
            }),
        }
    }

    /// Fetch a snapshot and commit it unless a newer pin superseded it
    async fn refresh(&self) -> Result<Replaced> {
        let ticket = self.store.write().await.begin_fetch();

        let snapshot = self
            .service
            .load_state()
            .await
            .inspect_err(|e| warn!("Failed to load session state: {}", e))?;

        let replaced = self.store.write().await.replace(ticket, snapshot)?;
        if replaced == Replaced::Stale {
            debug!("Session snapshot superseded by a local update");
        }
        Ok(replaced)
    }

    fn present_setup(&self, project: &ProjectEntry) {
        match &self.setup {
            Some(presenter) => {
                info!("Project '{}' needs first-time setup", project.name);
                presenter.present_setup(project);
            }
            None => debug!("No setup presenter registered for {}", project.path),
        }
    }
}

/// Build a change notification if the active project actually changed
fn active_changed(
    previous: Option<ProjectPath>,
    current: Option<&ProjectPath>,
) -> Option<ActiveProjectChanged> {
    let current = current?;
    if previous.as_ref() == Some(current) {
        return None;
    }
    Some(ActiveProjectChanged {
        previous,
        current: current.clone(),
    })
}
