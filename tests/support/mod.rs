//! In-memory stand-ins for the remote project service and the collaborators
//! the workspace manager notifies.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use workspace_session::error::RemoteError;
use workspace_session::remote::{
    ClosedProject, FolderEntry, FolderListing, OpenedProject, RemoteResult, SessionService,
};
use workspace_session::{
    ActiveProjectChanged, DependentView, ProjectEntry, ProjectPath, SessionState, SetupPresenter,
};

/// Remote operations, recorded in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    LoadState,
    Browse,
    ListRecent,
    Open,
    Close,
    SetActive,
}

#[derive(Default)]
struct Inner {
    projects: Vec<ProjectEntry>,
    active: Option<ProjectPath>,
    recent: Vec<ProjectPath>,
    uninitialized: HashSet<String>,
    folders: HashMap<String, Vec<FolderEntry>>,
    default_root: String,
    failures: HashMap<Op, RemoteError>,
}

/// Behaves like the project service: rejects duplicate opens, picks the
/// first remaining project when the active one is closed
pub struct FakeService {
    inner: Mutex<Inner>,
    calls: Mutex<Vec<Op>>,
    hold_open: AtomicBool,
    /// Signalled when a held `open` has started
    pub entered: Notify,
    /// Lets a held `open` continue
    pub release: Notify,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                default_root: "/home/user".to_string(),
                ..Inner::default()
            }),
            calls: Mutex::new(Vec::new()),
            hold_open: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Service with the given projects open and the first one active
    pub fn with_projects(paths: &[&str]) -> Self {
        let service = Self::new();
        {
            let mut inner = service.inner.lock().unwrap();
            inner.projects = paths.iter().map(|p| ProjectEntry::new(*p, true)).collect();
            inner.active = paths.first().map(|p| ProjectPath::new(*p));
        }
        service
    }

    pub fn set_active_remote(&self, path: &str) {
        self.inner.lock().unwrap().active = Some(ProjectPath::new(path));
    }

    /// Projects opened at this path report `initialized: false`
    pub fn mark_uninitialized(&self, path: &str) {
        self.inner
            .lock()
            .unwrap()
            .uninitialized
            .insert(path.to_string());
    }

    pub fn add_folder(&self, path: &str, entries: &[(&str, &str, bool)]) {
        let entries = entries
            .iter()
            .map(|(name, path, is_project)| FolderEntry {
                name: name.to_string(),
                path: path.to_string(),
                is_project: *is_project,
            })
            .collect();
        self.inner
            .lock()
            .unwrap()
            .folders
            .insert(path.to_string(), entries);
    }

    pub fn set_recent(&self, paths: &[&str]) {
        self.inner.lock().unwrap().recent = paths.iter().map(|p| ProjectPath::new(*p)).collect();
    }

    /// Make the next call of `op` fail with `err`
    pub fn fail_next(&self, op: Op, err: RemoteError) {
        self.inner.lock().unwrap().failures.insert(op, err);
    }

    /// Park every `open` until `release` is notified
    pub fn hold_open(&self) {
        self.hold_open.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    fn record(&self, op: Op) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(op);
        match self.inner.lock().unwrap().failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionService for FakeService {
    async fn load_state(&self) -> RemoteResult<SessionState> {
        self.record(Op::LoadState)?;
        let inner = self.inner.lock().unwrap();
        Ok(SessionState::new(inner.projects.clone(), inner.active.clone()))
    }

    async fn browse(&self, path: Option<&str>) -> RemoteResult<FolderListing> {
        self.record(Op::Browse)?;
        let inner = self.inner.lock().unwrap();
        let current_path = path.unwrap_or(&inner.default_root).to_string();
        let entries = inner
            .folders
            .get(&current_path)
            .cloned()
            .ok_or_else(|| RemoteError::service(format!("{} is not a directory", current_path)))?;
        Ok(FolderListing {
            current_path,
            entries,
        })
    }

    async fn list_recent(&self) -> RemoteResult<Vec<ProjectPath>> {
        self.record(Op::ListRecent)?;
        Ok(self.inner.lock().unwrap().recent.clone())
    }

    async fn open(&self, path: &ProjectPath) -> RemoteResult<OpenedProject> {
        if self.hold_open.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        self.record(Op::Open)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.projects.iter().any(|p| &p.path == path) {
            return Err(RemoteError::service("Project is already open"));
        }

        let initialized = !inner.uninitialized.contains(path.as_str());
        let entry = ProjectEntry::new(path.clone(), initialized);
        inner.projects.push(entry.clone());
        inner.active = Some(path.clone());
        inner.recent.retain(|p| p != path);
        inner.recent.insert(0, path.clone());

        Ok(OpenedProject {
            initialized,
            project: Some(entry),
        })
    }

    async fn close(&self, path: &ProjectPath) -> RemoteResult<ClosedProject> {
        self.record(Op::Close)?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.projects.len();
        inner.projects.retain(|p| &p.path != path);
        if inner.projects.len() == before {
            return Err(RemoteError::service("Project is not open"));
        }

        if inner.active.as_ref() == Some(path) {
            inner.active = inner.projects.first().map(|p| p.path.clone());
        }

        Ok(ClosedProject {
            active_project: inner.active.clone(),
        })
    }

    async fn set_active(&self, path: &ProjectPath) -> RemoteResult<()> {
        self.record(Op::SetActive)?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.projects.iter().any(|p| &p.path == path) {
            return Err(RemoteError::service("Project is not open"));
        }
        inner.active = Some(path.clone());
        Ok(())
    }
}

/// Dependent view that records every notification
pub struct RecordingView {
    name: String,
    fail: bool,
    pub reloads: AtomicUsize,
    pub changes: Mutex<Vec<ActiveProjectChanged>>,
}

impl RecordingView {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            reloads: AtomicUsize::new(0),
            changes: Mutex::new(Vec::new()),
        }
    }

    /// A view whose reload always errors
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn last_change(&self) -> Option<ActiveProjectChanged> {
        self.changes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DependentView for RecordingView {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reload(&self, change: &ActiveProjectChanged) -> anyhow::Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        self.changes.lock().unwrap().push(change.clone());
        if self.fail {
            anyhow::bail!("{} backend unavailable", self.name);
        }
        Ok(())
    }
}

/// Records which projects were sent to first-time setup
#[derive(Default)]
pub struct RecordingPresenter {
    pub presented: Mutex<Vec<ProjectEntry>>,
}

impl SetupPresenter for RecordingPresenter {
    fn present_setup(&self, project: &ProjectEntry) {
        self.presented.lock().unwrap().push(project.clone());
    }
}
