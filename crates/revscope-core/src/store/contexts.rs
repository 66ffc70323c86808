//! Search contexts and indexed-repository sets backed by a catalog

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::patterns::parse_repository_revisions;
use crate::store::catalog::{Catalog, SearchContextRecord};
use crate::traits::{IndexBackend, SearchContextStore};
use crate::types::{RepoName, RepositoryRevisions, RevisionSpecifier, SearchContext};

/// Resolves search-context specs against a catalog
#[derive(Debug, Clone, Default)]
pub struct StaticSearchContexts {
    users: HashMap<String, i32>,
    contexts: Vec<SearchContextRecord>,
    repo_ids: HashMap<String, i32>,
}

impl StaticSearchContexts {
    /// Build from a catalog
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            users: catalog
                .users
                .iter()
                .map(|u| (u.username.clone(), u.id))
                .collect(),
            contexts: catalog.contexts.clone(),
            repo_ids: catalog
                .repos
                .iter()
                .map(|r| (r.name.clone(), r.id))
                .collect(),
        }
    }
}

impl SearchContextStore for StaticSearchContexts {
    async fn resolve_spec(&self, spec: &str) -> Result<SearchContext> {
        if spec.is_empty() || spec == "global" {
            return Ok(SearchContext::global());
        }

        if let Some(context) = self.contexts.iter().find(|c| c.name == spec) {
            return Ok(SearchContext {
                id: context.id,
                name: context.name.clone(),
                namespace_user_id: context.namespace_user_id,
            });
        }

        // `@user` is the auto-defined context of the user's namespace.
        if let Some(username) = spec.strip_prefix('@').filter(|u| !u.contains('/')) {
            if let Some(&user_id) = self.users.get(username) {
                return Ok(SearchContext {
                    id: 0,
                    name: spec.to_string(),
                    namespace_user_id: user_id,
                });
            }
        }

        Err(Error::NotFound(format!("search context {:?} not found", spec)))
    }

    async fn repository_revisions(&self, context_id: i64) -> Result<Vec<RepositoryRevisions>> {
        let context = self
            .contexts
            .iter()
            .find(|c| c.id == context_id)
            .ok_or_else(|| Error::NotFound(format!("search context id {} not found", context_id)))?;

        Ok(context
            .repositories
            .iter()
            .filter_map(|member| {
                let id = *self.repo_ids.get(&member.name)?;
                let mut revs: Vec<RevisionSpecifier> = member
                    .revisions
                    .iter()
                    .flat_map(|r| parse_repository_revisions_list(r))
                    .collect();
                if revs.is_empty() {
                    revs.push(RevisionSpecifier::Default);
                }
                Some(RepositoryRevisions::new(RepoName::new(id, member.name.as_str()), revs))
            })
            .collect())
    }
}

/// Parse a `a:b` revision list as written after `@` in a pattern
fn parse_repository_revisions_list(revs: &str) -> Vec<RevisionSpecifier> {
    let (_, specs) = parse_repository_revisions(&format!("@{}", revs));
    specs
}

/// Fixed set of indexed repository names
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    names: HashSet<String>,
}

impl StaticIndex {
    /// Serve exactly `names`
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The catalog's indexed list, or every catalog repository
    pub fn from_catalog(catalog: &Catalog) -> Self {
        match &catalog.indexed {
            Some(names) => Self::new(names.iter().cloned()),
            None => Self::new(catalog.repos.iter().map(|r| r.name.clone())),
        }
    }
}

impl IndexBackend for StaticIndex {
    async fn list_indexed(&self) -> Result<HashSet<String>> {
        Ok(self.names.clone())
    }
}
