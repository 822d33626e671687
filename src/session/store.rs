//! Session state store
//!
//! Pure state holder for the client-side copy of the remote session. No I/O.
//!
//! Every fetch of canonical state takes a [`FetchTicket`] before the remote
//! call is issued. An optimistic pin (`set_active_locally`) advances the
//! sequence, so a snapshot whose fetch started before the pin is discarded
//! instead of overwriting it.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::SessionError;
use crate::session::{ProjectEntry, ProjectPath, SessionState};

/// Monotonic marker handed out before a state fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Result of applying a fetched snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    /// Snapshot committed
    Applied,
    /// Snapshot predates the last optimistic pin and was discarded
    Stale,
}

/// Holds the ordered project list and the active project
#[derive(Debug, Default)]
pub struct SessionStore {
    state: SessionState,
    /// path -> position in `state.projects`
    index: HashMap<ProjectPath, usize>,
    seq: u64,
    pinned_at: u64,
    loaded: bool,
}

impl SessionStore {
    /// Create an empty, not-yet-loaded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a ticket for a fetch that is about to be issued
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.seq += 1;
        FetchTicket(self.seq)
    }

    /// Atomically swap in a fetched snapshot
    ///
    /// Validation happens before anything is committed; on failure the prior
    /// state is kept.
    pub fn replace(
        &mut self,
        ticket: FetchTicket,
        state: SessionState,
    ) -> Result<Replaced, SessionError> {
        if ticket.0 < self.pinned_at {
            debug!(
                "Discarding stale snapshot (ticket {} < pin {})",
                ticket.0, self.pinned_at
            );
            return Ok(Replaced::Stale);
        }

        let index = validate(&state).inspect_err(|e| warn!("Rejected snapshot: {}", e))?;

        self.state = SessionState {
            projects: state
                .projects
                .into_iter()
                .map(ProjectEntry::with_derived_name)
                .collect(),
            active_project: state.active_project,
        };
        self.index = index;
        self.loaded = true;
        Ok(Replaced::Applied)
    }

    /// Optimistically mark a project active ahead of the next full reload
    pub fn set_active_locally(&mut self, path: &ProjectPath) -> Result<(), SessionError> {
        if !self.index.contains_key(path) {
            return Err(SessionError::InvariantViolation(format!(
                "cannot activate {}: not among open projects",
                path
            )));
        }

        self.seq += 1;
        self.pinned_at = self.seq;
        self.state.active_project = Some(path.clone());
        Ok(())
    }

    /// Look up an open project by path
    pub fn find(&self, path: &ProjectPath) -> Option<&ProjectEntry> {
        self.index.get(path).map(|&i| &self.state.projects[i])
    }

    pub fn contains(&self, path: &ProjectPath) -> bool {
        self.index.contains_key(path)
    }

    /// Open projects in display order
    pub fn projects(&self) -> &[ProjectEntry] {
        &self.state.projects
    }

    pub fn active_project(&self) -> Option<&ProjectPath> {
        self.state.active_project.as_ref()
    }

    /// The entry of the active project
    pub fn active_entry(&self) -> Option<&ProjectEntry> {
        self.active_project().and_then(|p| self.find(p))
    }

    pub fn is_active(&self, path: &ProjectPath) -> bool {
        self.active_project() == Some(path)
    }

    pub fn len(&self) -> usize {
        self.state.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.projects.is_empty()
    }

    /// Whether a snapshot has been committed yet
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }
}

/// Check snapshot invariants and build the path index
fn validate(state: &SessionState) -> Result<HashMap<ProjectPath, usize>, SessionError> {
    let mut index = HashMap::with_capacity(state.projects.len());
    for (i, entry) in state.projects.iter().enumerate() {
        if index.insert(entry.path.clone(), i).is_some() {
            return Err(SessionError::InvariantViolation(format!(
                "duplicate project path {}",
                entry.path
            )));
        }
    }

    if let Some(active) = &state.active_project {
        if !index.contains_key(active) {
            return Err(SessionError::InvariantViolation(format!(
                "active project {} is not among open projects",
                active
            )));
        }
    }

    Ok(index)
}

/// Whether a state satisfies the store invariants
pub fn is_consistent(state: &SessionState) -> bool {
    let mut seen = HashSet::new();
    state.projects.iter().all(|p| seen.insert(&p.path))
        && state
            .active_project
            .as_ref()
            .is_none_or(|a| seen.contains(a))
}
