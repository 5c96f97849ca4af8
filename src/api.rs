/// Remote data client for the plugin directory and per-plugin stats.
///
/// Both resources are static JSON, fetched fresh on every call. A non-success
/// HTTP response becomes [`FetchError::Status`]; nothing is retried.
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::source::{Location, Source};

/// Locator of the plugin directory, relative to the source base.
pub const DIRECTORY_LOCATOR: &str = "plugins.json";

const USER_AGENT: &str = concat!("kit/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Plugin directory as published in `plugins.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginsResponse {
    pub version: i64,
    /// Unix seconds of the last directory update.
    pub timestamp: i64,
    pub plugins: IndexMap<String, PluginEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginEntry {
    pub downloads_url: String,
}

/// Stats document for one plugin.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StatsDocument {
    #[serde(rename = "pluginName")]
    pub plugin_name: String,
    /// Keyed by `YYYY-MM-DD`; days without data have no entry.
    #[serde(rename = "stats")]
    pub daily_stats: HashMap<String, DailyStat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DailyStat {
    pub downloads: u64,
}

/// A directory entry: a plugin name and where to fetch its stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    name: String,
    stats_locator: String,
}

impl Plugin {
    pub fn new(name: impl Into<String>, stats_locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats_locator: stats_locator.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats_locator(&self) -> &str {
        &self.stats_locator
    }
}

impl PluginsResponse {
    /// One `Plugin` per directory entry, in directory order.
    pub fn to_plugins(&self) -> Vec<Plugin> {
        self.plugins
            .iter()
            .map(|(name, entry)| Plugin::new(name.clone(), entry.downloads_url.clone()))
            .collect()
    }

    /// Plugin names sorted for display in a selector.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn find(&self, name: &str) -> Option<Plugin> {
        self.plugins
            .get(name)
            .map(|entry| Plugin::new(name, entry.downloads_url.clone()))
    }
}

/// Client over a [`Source`].
#[derive(Debug, Clone)]
pub struct StatsClient {
    source: Source,
    http: reqwest::Client,
}

impl StatsClient {
    pub fn new(source: Source) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| FetchError::Transport {
                url: "<client>".to_string(),
                source,
            })?;
        Ok(Self { source, http })
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub async fn fetch_directory(&self) -> Result<PluginsResponse, FetchError> {
        let directory: PluginsResponse = self.fetch_json(DIRECTORY_LOCATOR).await?;
        info!(
            "Fetched plugin directory v{} with {} plugins",
            directory.version,
            directory.plugins.len()
        );
        Ok(directory)
    }

    pub async fn fetch_plugins(&self) -> Result<Vec<Plugin>, FetchError> {
        Ok(self.fetch_directory().await?.to_plugins())
    }

    pub async fn fetch_last_updated_timestamp(&self) -> Result<i64, FetchError> {
        Ok(self.fetch_directory().await?.timestamp)
    }

    pub async fn fetch_stats(&self, plugin: &Plugin) -> Result<StatsDocument, FetchError> {
        let stats: StatsDocument = self.fetch_json(plugin.stats_locator()).await?;
        debug!(
            "Fetched {} daily entries for {}",
            stats.daily_stats.len(),
            plugin.name()
        );
        Ok(stats)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, locator: &str) -> Result<T, FetchError> {
        let location = self.source.resolve(locator)?;
        debug!("GET {}", location);

        let body = match &location {
            Location::Url(url) => self.fetch_http(url).await?,
            Location::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
        };

        serde_json::from_slice(&body).map_err(|source| FetchError::Malformed {
            locator: location.to_string(),
            source,
        })
    }

    async fn fetch_http(&self, url: &url::Url) -> Result<Vec<u8>, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

/// The status text is the canonical reason for the code, not the phrase the
/// server sent.
fn status_error(status: reqwest::StatusCode) -> FetchError {
    FetchError::Status {
        status: status.as_u16(),
        status_text: status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
    }
}
