//! Dependent-view reload fan-out
//!
//! Views that render data for the active project (task board, context panel,
//! settings panel, ...) register here. After the active project changes every
//! view is asked to reload; the reloads run concurrently, each outcome is
//! captured and logged on its own, and none of them can fail the operation
//! that triggered the fan-out.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::session::{ActiveProjectChanged, ProjectEntry};

/// Default per-view reload timeout
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// An independently owned view that reloads when the active project changes
#[async_trait]
pub trait DependentView: Send + Sync {
    /// Name used in logs and reload reports
    fn name(&self) -> &str;

    async fn reload(&self, change: &ActiveProjectChanged) -> anyhow::Result<()>;
}

/// Presents first-time setup for a project that has not been initialized
///
/// Invoked, never implemented, by the coordinator.
pub trait SetupPresenter: Send + Sync {
    fn present_setup(&self, project: &ProjectEntry);
}

/// How a single view's reload ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadStatus {
    Reloaded,
    Failed(String),
    TimedOut,
    Panicked,
}

impl ReloadStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Reloaded)
    }
}

/// Outcome of one view's reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub view: String,
    pub status: ReloadStatus,
}

/// Outcomes of a whole fan-out, one per registered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadReport {
    pub change: ActiveProjectChanged,
    pub outcomes: Vec<ReloadOutcome>,
}

impl ReloadReport {
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReloadOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_ok())
    }
}

/// Registered dependent views
#[derive(Clone)]
pub struct ReloadFanout {
    views: Vec<Arc<dyn DependentView>>,
    timeout: Duration,
}

impl ReloadFanout {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_RELOAD_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            views: Vec::new(),
            timeout,
        }
    }

    pub fn register(&mut self, view: Arc<dyn DependentView>) {
        debug!("Registered dependent view '{}'", view.name());
        self.views.push(view);
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Ask every view to reload
    ///
    /// All reloads are started before any is awaited. Errors, panics and
    /// timeouts are recorded in the report, never propagated.
    pub async fn notify(&self, change: &ActiveProjectChanged) -> ReloadReport {
        info!(
            "Active project changed {} -> {}, reloading {} view(s)",
            change
                .previous
                .as_ref()
                .map(|p| p.as_str())
                .unwrap_or("<none>"),
            change.current,
            self.views.len()
        );

        let reloads = self.views.iter().map(|view| {
            let view = Arc::clone(view);
            async move {
                let reload = AssertUnwindSafe(view.reload(change)).catch_unwind();
                let status = match timeout(self.timeout, reload).await {
                    Ok(Ok(Ok(()))) => ReloadStatus::Reloaded,
                    Ok(Ok(Err(e))) => ReloadStatus::Failed(format!("{:#}", e)),
                    Ok(Err(_)) => ReloadStatus::Panicked,
                    Err(_) => ReloadStatus::TimedOut,
                };
                ReloadOutcome {
                    view: view.name().to_string(),
                    status,
                }
            }
        });

        let outcomes = join_all(reloads).await;

        for outcome in &outcomes {
            match &outcome.status {
                ReloadStatus::Reloaded => debug!("View '{}' reloaded", outcome.view),
                ReloadStatus::Failed(e) => warn!("View '{}' failed to reload: {}", outcome.view, e),
                ReloadStatus::TimedOut => warn!(
                    "View '{}' did not reload within {:?}",
                    outcome.view, self.timeout
                ),
                ReloadStatus::Panicked => warn!("View '{}' panicked while reloading", outcome.view),
            }
        }

        ReloadReport {
            change: change.clone(),
            outcomes,
        }
    }
}

impl Default for ReloadFanout {
    fn default() -> Self {
        Self::new()
    }
}
