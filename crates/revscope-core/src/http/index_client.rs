//! Zoekt web server client for listing indexed repositories

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::IndexBackend;

/// Per-request timeout when the caller imposes none
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ListRequest<'q> {
    #[serde(rename = "Q")]
    query: &'q str,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(rename = "List")]
    list: RepoList,
}

#[derive(Debug, Default, Deserialize)]
struct RepoList {
    #[serde(rename = "Repos", default)]
    repos: Option<Vec<RepoListEntry>>,
}

#[derive(Debug, Deserialize)]
struct RepoListEntry {
    #[serde(rename = "Repository")]
    repository: RepositoryInfo,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    #[serde(rename = "Name")]
    name: String,
}

/// Parse a `/api/list` response body into repository names
pub fn parse_list_response(body: &str) -> Result<HashSet<String>> {
    let response: ListResponse = serde_json::from_str(body)?;
    Ok(response
        .list
        .repos
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.repository.name)
        .collect())
}

/// Lists indexed repositories through `POST <base>/api/list`
pub struct HttpIndexClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIndexClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with a per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("revscope/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl IndexBackend for HttpIndexClient {
    async fn list_indexed(&self) -> Result<HashSet<String>> {
        let url = format!("{}/api/list", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ListRequest { query: "" })
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Error::Temporary(format!("index list returned {}", status)));
        }
        if !status.is_success() {
            return Err(Error::Http(format!("index list returned {}", status)));
        }

        let body = response.text().await?;
        let names = parse_list_response(&body)?;
        tracing::debug!(count = names.len(), "index list done");
        Ok(names)
    }
}
