//! Folder browser state machine
//!
//! Idle (no cursor) → Browsing (cursor) → Selected (cursor with a selection).
//! The cursor lives only as long as one "open project" flow; `confirm` and
//! `cancel` both discard it.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::{Breadcrumb, breadcrumbs, parent_path};
use crate::error::{BrowseError, Result};
use crate::remote::{FolderEntry, FolderListing, SessionService};
use crate::session::{OpenOutcome, ProjectPath, WorkspaceManager};

/// Navigation state of the open-project flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseCursor {
    pub current_path: String,
    pub entries: Vec<FolderEntry>,
    pub selected_path: Option<String>,
}

impl BrowseCursor {
    fn from_listing(listing: FolderListing) -> Self {
        Self {
            current_path: listing.current_path,
            entries: listing.entries,
            selected_path: None,
        }
    }

    /// Look up an entry of the current listing
    pub fn entry(&self, path: &str) -> Option<&FolderEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Breadcrumbs for the current folder
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        breadcrumbs(&self.current_path)
    }
}

/// Conceptual state of the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsePhase {
    Idle,
    Browsing,
    Selected,
}

impl fmt::Display for BrowsePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Browsing => write!(f, "browsing"),
            Self::Selected => write!(f, "selected"),
        }
    }
}

/// Navigation cursor over the service's folder hierarchy
pub struct FolderBrowser {
    service: Arc<dyn SessionService>,
    cursor: Option<BrowseCursor>,
}

impl FolderBrowser {
    /// Create an idle browser
    pub fn new(service: Arc<dyn SessionService>) -> Self {
        Self {
            service,
            cursor: None,
        }
    }

    pub fn phase(&self) -> BrowsePhase {
        match &self.cursor {
            None => BrowsePhase::Idle,
            Some(c) if c.selected_path.is_some() => BrowsePhase::Selected,
            Some(_) => BrowsePhase::Browsing,
        }
    }

    pub fn cursor(&self) -> Option<&BrowseCursor> {
        self.cursor.as_ref()
    }

    /// Begin browsing at the service's default root
    ///
    /// Any previous cursor is discarded; on failure the browser stays idle.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<&BrowseCursor> {
        self.cursor = None;
        let listing = self.service.browse(None).await?;
        debug!("Browsing from {}", listing.current_path);
        Ok(&*self.cursor.insert(BrowseCursor::from_listing(listing)))
    }

    /// List another folder, clearing any selection
    ///
    /// On failure the current cursor is left untouched.
    #[instrument(skip(self))]
    pub async fn navigate(&mut self, path: &str) -> Result<&BrowseCursor> {
        if self.cursor.is_none() {
            return Err(BrowseError::NotBrowsing.into());
        }

        let listing = self.service.browse(Some(path)).await?;
        debug!("Navigated to {}", listing.current_path);
        Ok(&*self.cursor.insert(BrowseCursor::from_listing(listing)))
    }

    /// Navigate to the parent folder; stays put at a root
    pub async fn navigate_up(&mut self) -> Result<&BrowseCursor> {
        let current = self
            .cursor
            .as_ref()
            .map(|c| c.current_path.clone())
            .ok_or(BrowseError::NotBrowsing)?;

        match parent_path(&current) {
            Some(parent) => self.navigate(&parent).await,
            None => Ok(self.cursor.as_ref().ok_or(BrowseError::NotBrowsing)?),
        }
    }

    /// Select one of the listed folders, replacing any previous selection
    pub fn select(&mut self, path: &str) -> Result<()> {
        let cursor = self.cursor.as_mut().ok_or(BrowseError::NotBrowsing)?;

        if cursor.entry(path).is_none() {
            return Err(BrowseError::NotAnEntry(path.to_string()).into());
        }

        cursor.selected_path = Some(path.to_string());
        Ok(())
    }

    /// Open the selected folder as a project
    ///
    /// The browser returns to idle whatever the outcome; after a failure the
    /// caller restarts with `start`.
    #[instrument(skip(self, manager))]
    pub async fn confirm(&mut self, manager: &WorkspaceManager) -> Result<OpenOutcome> {
        let selected = match self.cursor.as_ref() {
            None => return Err(BrowseError::NotBrowsing.into()),
            Some(cursor) => cursor
                .selected_path
                .clone()
                .ok_or(BrowseError::NothingSelected)?,
        };

        self.cursor = None;
        info!("Opening selected folder {}", selected);
        manager.open_project(ProjectPath::new(selected)).await
    }

    /// Abandon the flow without side effects
    pub fn cancel(&mut self) {
        if self.cursor.take().is_some() {
            debug!("Folder browsing cancelled");
        }
    }
}
