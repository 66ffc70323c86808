//! Repository catalog file

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::is_json_path;
use crate::error::{Error, Result};

/// One repository in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoRecord {
    /// Store-assigned id
    pub id: i32,
    /// Full repository name
    pub name: String,
    /// Forked from another repository
    pub fork: bool,
    /// Archived upstream
    pub archived: bool,
    /// Not publicly visible
    pub private: bool,
    /// Star count, when known
    pub stars: Option<u32>,
    /// Searched by default when no repository is named
    pub default: bool,
    /// Users whose namespace owns the repository
    pub namespace_users: Vec<i32>,
    /// Users who added the (public) repository to their namespace
    pub added_by_users: Vec<i32>,
}

/// A repository pinned by a search context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRepoRecord {
    /// Repository name
    pub name: String,
    /// Revisions; none means the default branch
    #[serde(default)]
    pub revisions: Vec<String>,
}

/// A persisted search context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContextRecord {
    /// Persisted id (non-zero)
    pub id: i64,
    /// Context name, e.g. `@alice/work`
    pub name: String,
    /// Owning user; 0 for instance-level contexts
    #[serde(default)]
    pub namespace_user_id: i32,
    /// Member repositories
    #[serde(default)]
    pub repositories: Vec<ContextRepoRecord>,
}

/// A user that owns a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User id
    pub id: i32,
    /// Username, referenced as `@username`
    pub username: String,
}

/// Everything the bundled collaborators serve
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Repositories in store order
    pub repos: Vec<RepoRecord>,
    /// Persisted search contexts
    pub contexts: Vec<SearchContextRecord>,
    /// Namespace owners
    pub users: Vec<UserRecord>,
    /// Names the index serves; every repository when absent
    pub indexed: Option<Vec<String>>,
}

impl Catalog {
    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read catalog '{}': {}", path.display(), e))
        })?;

        let catalog: Catalog = if is_json_path(path) {
            serde_json::from_str(&raw)?
        } else {
            serde_yaml::from_str(&raw)?
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject duplicate repository ids or names
    pub fn validate(&self) -> Result<()> {
        let mut ids = std::collections::HashSet::new();
        let mut names = std::collections::HashSet::new();
        for repo in &self.repos {
            if !ids.insert(repo.id) {
                return Err(Error::Config(format!("duplicate repository id {}", repo.id)));
            }
            if !names.insert(repo.name.as_str()) {
                return Err(Error::Config(format!("duplicate repository name {}", repo.name)));
            }
        }
        Ok(())
    }
}
