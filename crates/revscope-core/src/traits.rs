//! Collaborator traits for scope resolution
//!
//! Methods return `impl Future + Send` so implementations stay statically
//! dispatched: no boxing, no trait objects. Implementations may use
//! `async fn` directly.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::types::{
    RepoName, RepositoryRevisions, ReposListOptions, ResolveRevisionOptions, RevisionSpecifier,
    SearchContext,
};

/// Repository metadata store
pub trait RepoStore: Send + Sync {
    /// List repositories matching the options, in store order
    fn list_repo_names(
        &self,
        options: &ReposListOptions,
    ) -> impl Future<Output = Result<Vec<RepoName>>> + Send;

    /// Count repositories matching the options, ignoring the limit
    fn count(&self, options: &ReposListOptions) -> impl Future<Output = Result<usize>> + Send;

    /// Repositories searched by default when a query names none
    fn list_default_repos(&self) -> impl Future<Output = Result<Vec<RepoName>>> + Send;
}

/// Version-control backend
pub trait VersionControl: Send + Sync {
    /// Resolve a revspec to a commit id
    fn resolve_revision(
        &self,
        repo: &RepoName,
        spec: &str,
        opts: ResolveRevisionOptions,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Whether the revision has a commit after the threshold
    fn has_commit_after(
        &self,
        repo: &RepoName,
        after: &str,
        rev: &RevisionSpecifier,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Code-index backend
pub trait IndexBackend: Send + Sync {
    /// Names of every repository the index currently serves
    fn list_indexed(&self) -> impl Future<Output = Result<HashSet<String>>> + Send;
}

/// Search-context resolution
pub trait SearchContextStore: Send + Sync {
    /// Resolve a context spec (`""`, `global`, `@user`, `@user/name`)
    fn resolve_spec(&self, spec: &str) -> impl Future<Output = Result<SearchContext>> + Send;

    /// Repository revisions pinned by a persisted context
    fn repository_revisions(
        &self,
        context_id: i64,
    ) -> impl Future<Output = Result<Vec<RepositoryRevisions>>> + Send;
}

/// Source of site configuration, read fresh on every resolution
pub trait ConfigSource: Send + Sync {
    /// The configuration in effect now
    fn current(&self) -> Arc<SiteConfig>;
}

impl ConfigSource for Arc<SiteConfig> {
    fn current(&self) -> Arc<SiteConfig> {
        Arc::clone(self)
    }
}
