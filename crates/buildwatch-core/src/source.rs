//! Plan sources: where snapshots come from.
//!
//! The monitor only sees the [`PlanSource`] trait. Two implementations ship
//! with the crate, both reading the same JSON document (an array of
//! [`BuildPlan`] records, optionally wrapped as `{"plans": [...]}`):
//!
//! - [`FileSource`] re-reads a local file on every fetch
//! - [`HttpSource`] GETs a URL, with optional basic auth

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::error::{FetchError, MonitorError, Result};
use crate::models::BuildPlan;

/// Anything that can produce the current list of plans.
#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn fetch_plans(&self) -> std::result::Result<Vec<BuildPlan>, FetchError>;

    /// Short description for log messages.
    fn describe(&self) -> String;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanDocument {
    Bare(Vec<BuildPlan>),
    Wrapped { plans: Vec<BuildPlan> },
}

impl PlanDocument {
    fn into_plans(self) -> Vec<BuildPlan> {
        match self {
            PlanDocument::Bare(plans) | PlanDocument::Wrapped { plans } => plans,
        }
    }
}

/// Parses a plan document.
pub fn parse_plans(raw: &str) -> std::result::Result<Vec<BuildPlan>, FetchError> {
    serde_json::from_str::<PlanDocument>(raw)
        .map(PlanDocument::into_plans)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

/// Reads plans from a JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PlanSource for FileSource {
    async fn fetch_plans(&self) -> std::result::Result<Vec<BuildPlan>, FetchError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Network(format!("{}: {e}", self.path.display())))?;
        parse_plans(&raw)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Fetches plans from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
    credentials: Option<(String, Option<String>)>,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns `MonitorError::Configuration` for an unparsable URL.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| MonitorError::config("server.url").with_reason(e.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("buildwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MonitorError::config("server.url").with_reason(e.to_string()))?;
        Ok(Self {
            client,
            url,
            credentials: None,
        })
    }

    /// Authenticates every request with HTTP basic auth.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some((username.into(), password));
        self
    }
}

#[async_trait]
impl PlanSource for HttpSource {
    async fn fetch_plans(&self) -> std::result::Result<Vec<BuildPlan>, FetchError> {
        let mut request = self.client.get(self.url.clone());
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, password.as_ref());
        }

        let response = request.send().await?.error_for_status()?;
        let document: PlanDocument = response.json().await?;
        Ok(document.into_plans())
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Builds the source named by the `server` section. A file wins over a URL.
///
/// # Errors
///
/// Returns `MonitorError::Configuration` when neither is set or the URL is
/// invalid.
pub fn from_config(server: &ServerConfig) -> Result<Box<dyn PlanSource>> {
    if let Some(file) = &server.file {
        return Ok(Box::new(FileSource::new(file)));
    }

    let Some(url) = &server.url else {
        return Err(MonitorError::config("server")
            .with_reason("set either server.file or server.url"));
    };

    let mut source = HttpSource::new(url)?;
    if let Some(username) = &server.username {
        source = source.with_basic_auth(username, server.password.clone());
    }
    Ok(Box::new(source))
}
