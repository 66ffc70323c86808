//! Site configuration, search limits and user settings

use crate::error::{Error, Result};
use crate::traits::ConfigSource;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Default for `maxRepos` when neither it nor `maxReposToSearch` is set
pub const DEFAULT_MAX_REPOS: i64 = (i32::MAX >> 1) as i64;
/// Default for `commitDiffMaxRepos`
pub const DEFAULT_COMMIT_DIFF_MAX_REPOS: i64 = 50;
/// Default for `commitDiffWithTimeFilterMaxRepos`
pub const DEFAULT_COMMIT_DIFF_WITH_TIME_FILTER_MAX_REPOS: i64 = 10_000;
/// Default for `maxTimeoutSeconds`
pub const DEFAULT_MAX_TIMEOUT_SECONDS: i64 = 60;

/// Environment variable overriding `dotcomMode`
pub const DOTCOM_MODE_ENV: &str = "REVSCOPE_DOTCOM_MODE";

/// Search result-count limits. Non-positive values mean "use the default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchLimits {
    /// Maximum number of repositories searched
    pub max_repos: i64,
    /// Maximum repositories for a commit or diff search
    pub commit_diff_max_repos: i64,
    /// Maximum repositories for a commit or diff search with a time filter
    pub commit_diff_with_time_filter_max_repos: i64,
    /// Maximum per-search timeout
    pub max_timeout_seconds: i64,
}

/// One repository pinned to one revision by a version context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionContextRevision {
    /// Repository name
    pub repo: String,
    /// Revision; empty means the default branch
    #[serde(default)]
    pub rev: String,
}

/// Named pinning of repositories to revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionContext {
    /// Context name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Pinned repositories, in declaration order
    #[serde(default)]
    pub revisions: Vec<VersionContextRevision>,
}

/// Experimental features section of the site configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperimentalFeatures {
    /// Version contexts available to queries
    pub version_contexts: Vec<VersionContext>,
}

/// Site configuration snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    /// Search limits
    #[serde(rename = "search.limits")]
    pub search_limits: Option<SearchLimits>,
    /// Deprecated top-level repository limit
    pub max_repos_to_search: i64,
    /// Experimental features
    pub experimental_features: ExperimentalFeatures,
    /// Only a single public code host namespace is searchable by default
    pub dotcom_mode: bool,
}

/// Whether a config file is JSON, judged by its extension in any case
pub(crate) fn is_json_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl SiteConfig {
    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;

        if is_json_path(path) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(serde_yaml::from_str(&raw)?)
        }
    }

    /// Apply environment overrides
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var(DOTCOM_MODE_ENV) {
            self.dotcom_mode = matches!(v.trim(), "1" | "true" | "TRUE" | "True");
        }
        self
    }
}

/// Derive effective search limits, replacing unset values with defaults.
///
/// A zero `maxRepos` falls back to the deprecated `maxReposToSearch`
/// before defaulting.
pub fn search_limits(config: &SiteConfig) -> SearchLimits {
    fn with_default(x: &mut i64, default: i64) {
        if *x <= 0 {
            *x = default;
        }
    }

    let mut limits = config.search_limits.unwrap_or_default();

    if limits.max_repos == 0 {
        limits.max_repos = config.max_repos_to_search;
    }

    with_default(&mut limits.max_repos, DEFAULT_MAX_REPOS);
    with_default(&mut limits.commit_diff_max_repos, DEFAULT_COMMIT_DIFF_MAX_REPOS);
    with_default(
        &mut limits.commit_diff_with_time_filter_max_repos,
        DEFAULT_COMMIT_DIFF_WITH_TIME_FILTER_MAX_REPOS,
    );
    with_default(&mut limits.max_timeout_seconds, DEFAULT_MAX_TIMEOUT_SECONDS);

    limits
}

/// Look up a version context by name
pub fn resolve_version_context<'c>(config: &'c SiteConfig, name: &str) -> Result<&'c VersionContext> {
    config
        .experimental_features
        .version_contexts
        .iter()
        .find(|vc| vc.name == name)
        .ok_or_else(|| Error::BadRequest("version context not found".to_string()))
}

/// A repo group entry: a literal repository path or a name regex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoGroupValue {
    /// Exact repository name
    Path(String),
    /// Repository name regex
    Pattern {
        /// The regex
        regex: String,
    },
}

/// User settings relevant to scope resolution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Named repository groups
    #[serde(rename = "search.repositoryGroups")]
    pub repository_groups: HashMap<String, Vec<RepoGroupValue>>,
}

impl Settings {
    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read settings '{}': {}", path.display(), e))
        })?;
        if is_json_path(path) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(serde_yaml::from_str(&raw)?)
        }
    }
}

/// Hot-swappable configuration handle.
///
/// Every `current()` call returns the snapshot in effect at that moment;
/// nothing is cached across resolutions.
#[derive(Debug, Default)]
pub struct SharedConfig {
    inner: RwLock<Arc<SiteConfig>>,
}

impl SharedConfig {
    /// Wrap a configuration snapshot
    pub fn new(config: SiteConfig) -> Self {
        Self {
            inner: RwLock::new(Arc::new(config)),
        }
    }

    /// Replace the configuration for subsequent reads
    pub fn replace(&self, config: SiteConfig) {
        *self.inner.write() = Arc::new(config);
    }
}

impl ConfigSource for SharedConfig {
    fn current(&self) -> Arc<SiteConfig> {
        Arc::clone(&self.inner.read())
    }
}
