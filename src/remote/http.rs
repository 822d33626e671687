//! HTTP client for the project service's workspace endpoints
//!
//! Thin request/response wrapper; all session state lives in the coordinator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{ClosedProject, FolderListing, OpenedProject, RemoteResult, SessionService};
use crate::config::Config;
use crate::error::{ConfigError, RemoteError, Result};
use crate::session::{ProjectEntry, ProjectPath, SessionState};

const STATE_ENDPOINT: &str = "api/workspace/state";
const BROWSE_ENDPOINT: &str = "api/workspace/browse";
const RECENT_ENDPOINT: &str = "api/workspace/recent";
const OPEN_ENDPOINT: &str = "api/workspace/open";
const CLOSE_ENDPOINT: &str = "api/workspace/close";
const SET_ACTIVE_ENDPOINT: &str = "api/workspace/set-active";

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// reqwest-backed [`SessionService`]
#[derive(Clone)]
pub struct HttpSessionClient {
    client: Client,
    /// Service root; always ends with `/` so endpoints join beneath it
    base: Url,
}

impl HttpSessionClient {
    /// Create a client with default timeouts
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeouts(base_url, DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeouts(
            &config.service_url,
            Duration::from_millis(config.request_timeout_ms),
            Duration::from_millis(config.connect_timeout_ms),
        )
    }

    /// Create a client with explicit timeouts
    pub fn with_timeouts(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let base = parse_base_url(base_url)?;

        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(RemoteError::from)?;

        Ok(Self { client, base })
    }

    /// The service root this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        self.base
            .join(path)
            .map_err(|e| RemoteError::Transport(format!("invalid endpoint {}: {}", path, e)))
    }

    fn post_path(&self, endpoint: &str, path: &ProjectPath) -> RemoteResult<RequestBuilder> {
        Ok(self
            .client
            .post(self.endpoint(endpoint)?)
            .json(&json!({ "project_path": path })))
    }

    /// Send a request and decode the response body
    ///
    /// `success: false` in a 2xx body and non-2xx statuses carrying a reason
    /// become [`RemoteError::Service`]; everything else that goes wrong is
    /// [`RemoteError::Transport`].
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("Service responded {} ({} bytes)", status, body.len());

        let value: Option<Value> = if body.is_empty() {
            Some(Value::Null)
        } else {
            serde_json::from_slice(&body).ok()
        };

        if !status.is_success() {
            return Err(match value.as_ref().and_then(rejection_reason) {
                Some(reason) => RemoteError::Service { reason },
                None => RemoteError::Transport(format!("HTTP {}", status)),
            });
        }

        let value = value.ok_or_else(|| {
            RemoteError::Transport("invalid response body: not JSON".to_string())
        })?;

        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let reason =
                rejection_reason(&value).unwrap_or_else(|| "request rejected".to_string());
            return Err(RemoteError::Service { reason });
        }

        serde_json::from_value(value)
            .map_err(|e| RemoteError::Transport(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl SessionService for HttpSessionClient {
    #[instrument(skip(self))]
    async fn load_state(&self) -> RemoteResult<SessionState> {
        let request = self.client.get(self.endpoint(STATE_ENDPOINT)?);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn browse(&self, path: Option<&str>) -> RemoteResult<FolderListing> {
        let mut request = self.client.get(self.endpoint(BROWSE_ENDPOINT)?);
        if let Some(path) = path {
            request = request.query(&[("path", path)]);
        }
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn list_recent(&self) -> RemoteResult<Vec<ProjectPath>> {
        let request = self.client.get(self.endpoint(RECENT_ENDPOINT)?);
        let recent: RecentList = self.send(request).await?;
        Ok(recent.into_paths())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn open(&self, path: &ProjectPath) -> RemoteResult<OpenedProject> {
        let body: OpenBody = self.send(self.post_path(OPEN_ENDPOINT, path)?).await?;
        let project = body.project.map(ProjectEntry::with_derived_name);
        let initialized = body
            .initialized
            .or_else(|| project.as_ref().map(|p| p.initialized))
            .unwrap_or(true);

        if !initialized {
            debug!("Service reports {} as uninitialized", path);
        }

        Ok(OpenedProject {
            initialized,
            project,
        })
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn close(&self, path: &ProjectPath) -> RemoteResult<ClosedProject> {
        let body: CloseBody = self.send(self.post_path(CLOSE_ENDPOINT, path)?).await?;
        Ok(ClosedProject {
            active_project: body.active_project,
        })
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn set_active(&self, path: &ProjectPath) -> RemoteResult<()> {
        let _: Value = self
            .send(self.post_path(SET_ACTIVE_ENDPOINT, path)?)
            .await?;
        Ok(())
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
        key: "service_url".to_string(),
        reason: e.to_string(),
    })?;

    if base.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue {
            key: "service_url".to_string(),
            reason: format!("{} cannot be used as a base URL", base_url),
        }
        .into());
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    Ok(base)
}

/// Extract a human-readable rejection reason from a response body
fn rejection_reason(value: &Value) -> Option<String> {
    ["error", "detail", "message", "reason"]
        .iter()
        .find_map(|key| {
            value
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct OpenBody {
    #[serde(default)]
    initialized: Option<bool>,
    #[serde(default)]
    project: Option<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct CloseBody {
    #[serde(default, alias = "activeProject")]
    active_project: Option<ProjectPath>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecentItem {
    Path(ProjectPath),
    Entry { path: ProjectPath },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecentList {
    Bare(Vec<RecentItem>),
    Wrapped {
        #[serde(alias = "recent")]
        projects: Vec<RecentItem>,
    },
}

impl RecentList {
    fn into_paths(self) -> Vec<ProjectPath> {
        let items = match self {
            Self::Bare(items) | Self::Wrapped { projects: items } => items,
        };
        items
            .into_iter()
            .map(|item| match item {
                RecentItem::Path(path) | RecentItem::Entry { path } => path,
            })
            .collect()
    }
}
