//! # revscope core
//!
//! Resolves the repository and revision scope of a code search query.
//!
//! Given include/exclude name patterns (optionally pinned to revisions with
//! `name@rev1:rev2`), repo groups, search and version contexts and result
//! limits, the [`Resolver`] produces the validated repository/revision
//! pairs to search together with what was missing, excluded or cut off:
//!
//! - **Regex** for repository name patterns
//! - **Rayon** for CPU-bound per-repository work
//! - **Tokio** and **futures** for concurrent collaborator calls
//! - **git2** for the bundled local version-control backend
//!
//! ## Example
//!
//! ```no_run
//! use revscope_core::config::SharedConfig;
//! use revscope_core::git::LocalGitBackend;
//! use revscope_core::store::{Catalog, MemoryRepoStore, StaticIndex, StaticSearchContexts};
//! use revscope_core::{Options, Resolver};
//!
//! # async fn example() -> revscope_core::Result<()> {
//! let catalog = Catalog::from_path("catalog.yaml")?;
//! let store = MemoryRepoStore::from_catalog(&catalog);
//! let contexts = StaticSearchContexts::from_catalog(&catalog);
//! let index = StaticIndex::from_catalog(&catalog);
//! let vcs = LocalGitBackend::new("/srv/repos");
//! let config = SharedConfig::default();
//!
//! let resolver = Resolver::new(&store, &vcs, &index, &contexts, &config);
//! let resolved = resolver
//!     .resolve(&Options {
//!         repo_filters: vec!["github.com/org/.*@main".to_string()],
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{}", resolved);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod classify;
pub mod config;
pub mod coordination;
pub mod error;
pub mod git;
pub mod http;
pub mod patterns;
pub mod store;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{classify_result, RepoStatus, RepoStatusMap, Stats};
pub use config::{search_limits, SearchLimits, Settings, SiteConfig};
pub use coordination::Resolver;
pub use error::{Error, ErrorKind, Result};
pub use types::{
    ExcludedRepos, Options, QueryParams, RepoId, RepoName, RepositoryRevisions, Resolved,
    RevisionSpecifier, YesNoOnly,
};
