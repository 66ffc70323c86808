//! Catalog-backed repository store

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use regex::Regex;

use crate::error::Result;
use crate::store::catalog::{Catalog, RepoRecord};
use crate::traits::RepoStore;
use crate::types::{RepoListOrder, RepoName, ReposListOptions};

/// Compiled name filters of one listing
struct NameFilter {
    include: Vec<Regex>,
    exclude: Option<Regex>,
}

impl NameFilter {
    fn new(options: &ReposListOptions) -> Result<Self> {
        let include = options
            .include_patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let exclude = if options.exclude_pattern.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("(?i){}", options.exclude_pattern))?)
        };

        Ok(Self { include, exclude })
    }

    fn matches(&self, name: &str) -> bool {
        self.include.iter().all(|re| re.is_match(name))
            && !self.exclude.as_ref().is_some_and(|re| re.is_match(name))
    }
}

/// In-memory repository store over a [`Catalog`]
#[derive(Debug, Clone, Default)]
pub struct MemoryRepoStore {
    repos: Vec<RepoRecord>,
    context_members: HashMap<i64, HashSet<i32>>,
}

impl MemoryRepoStore {
    /// Build a store from a catalog
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let ids: HashMap<&str, i32> = catalog
            .repos
            .iter()
            .map(|r| (r.name.as_str(), r.id))
            .collect();

        let context_members = catalog
            .contexts
            .iter()
            .map(|ctx| {
                let members = ctx
                    .repositories
                    .iter()
                    .filter_map(|r| ids.get(r.name.as_str()).copied())
                    .collect();
                (ctx.id, members)
            })
            .collect();

        Self {
            repos: catalog.repos.clone(),
            context_members,
        }
    }

    /// Number of repositories in the store
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// True when the store holds no repository
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    fn visible(&self, repo: &RepoRecord, options: &ReposListOptions) -> bool {
        if (options.no_forks && repo.fork) || (options.only_forks && !repo.fork) {
            return false;
        }
        if (options.no_archived && repo.archived) || (options.only_archived && !repo.archived) {
            return false;
        }
        if (options.no_private && repo.private) || (options.only_private && !repo.private) {
            return false;
        }

        if let Some(context_id) = options.search_context_id {
            let member = self
                .context_members
                .get(&context_id)
                .is_some_and(|members| members.contains(&repo.id));
            if !member {
                return false;
            }
        }

        if let Some(user_id) = options.user_id {
            let owned = repo.namespace_users.contains(&user_id);
            let added = options.include_user_public_repos
                && !repo.private
                && repo.added_by_users.contains(&user_id);
            if !owned && !added {
                return false;
            }
        }

        true
    }

    fn matching(&self, options: &ReposListOptions) -> Result<Vec<&RepoRecord>> {
        let filter = NameFilter::new(options)?;
        let names: HashSet<&str> = options.names.iter().map(String::as_str).collect();

        let mut repos: Vec<&RepoRecord> = self
            .repos
            .par_iter()
            .filter(|repo| names.is_empty() || names.contains(repo.name.as_str()))
            .filter(|repo| filter.matches(&repo.name))
            .filter(|repo| self.visible(repo, options))
            .collect();

        if let Some(RepoListOrder::StarsDescending) = options.order_by {
            // Stable, so equal counts keep store order; unknown counts go last.
            repos.sort_by(|a, b| match (a.stars, b.stars) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }

        Ok(repos)
    }
}

fn repo_name(record: &RepoRecord) -> RepoName {
    RepoName::new(record.id, record.name.as_str())
}

impl RepoStore for MemoryRepoStore {
    async fn list_repo_names(&self, options: &ReposListOptions) -> Result<Vec<RepoName>> {
        let matching = self.matching(options)?;
        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(matching.into_iter().take(limit).map(repo_name).collect())
    }

    async fn count(&self, options: &ReposListOptions) -> Result<usize> {
        Ok(self.matching(options)?.len())
    }

    async fn list_default_repos(&self) -> Result<Vec<RepoName>> {
        Ok(self
            .repos
            .iter()
            .filter(|repo| repo.default)
            .map(repo_name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::catalog::{ContextRepoRecord, SearchContextRecord};
    use assert_matches::assert_matches;

    fn record(id: i32, name: &str) -> RepoRecord {
        RepoRecord {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    fn store() -> MemoryRepoStore {
        let catalog = Catalog {
            repos: vec![
                RepoRecord {
                    stars: Some(5),
                    default: true,
                    namespace_users: vec![7],
                    ..record(1, "github.com/a/alpha")
                },
                RepoRecord {
                    fork: true,
                    stars: Some(50),
                    ..record(2, "github.com/a/alpha-fork")
                },
                RepoRecord {
                    archived: true,
                    default: true,
                    ..record(3, "github.com/b/old")
                },
                RepoRecord {
                    private: true,
                    stars: Some(5),
                    namespace_users: vec![7],
                    ..record(4, "gitlab.com/c/secret")
                },
                RepoRecord {
                    added_by_users: vec![7],
                    stars: Some(9),
                    ..record(5, "github.com/d/shared")
                },
            ],
            contexts: vec![SearchContextRecord {
                id: 11,
                name: "@alice/work".into(),
                namespace_user_id: 7,
                repositories: vec![
                    ContextRepoRecord {
                        name: "github.com/b/old".into(),
                        revisions: vec![],
                    },
                    ContextRepoRecord {
                        name: "github.com/unknown".into(),
                        revisions: vec![],
                    },
                ],
            }],
            ..Default::default()
        };
        MemoryRepoStore::from_catalog(&catalog)
    }

    async fn names(store: &MemoryRepoStore, options: ReposListOptions) -> Vec<String> {
        store
            .list_repo_names(&options)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    #[tokio::test]
    async fn test_include_patterns_are_anded_and_case_insensitive() {
        let got = names(
            &store(),
            ReposListOptions {
                include_patterns: vec!["GITHUB".into(), "alpha".into()],
                ..Default::default()
            },
        )
        .await;
        assert_eq!(got, vec!["github.com/a/alpha", "github.com/a/alpha-fork"]);
    }

    #[tokio::test]
    async fn test_exclude_and_names() {
        let got = names(
            &store(),
            ReposListOptions {
                exclude_pattern: "FORK|old".into(),
                names: vec![
                    "github.com/a/alpha".into(),
                    "github.com/a/alpha-fork".into(),
                    "github.com/b/old".into(),
                ],
                ..Default::default()
            },
        )
        .await;
        assert_eq!(got, vec!["github.com/a/alpha"]);
    }

    #[tokio::test]
    async fn test_toggles() {
        let s = store();
        let no_forks_no_archived = ReposListOptions {
            no_forks: true,
            no_archived: true,
            no_private: true,
            ..Default::default()
        };
        assert_eq!(
            names(&s, no_forks_no_archived).await,
            vec!["github.com/a/alpha", "github.com/d/shared"]
        );

        let only_forks = ReposListOptions {
            only_forks: true,
            ..Default::default()
        };
        assert_eq!(names(&s, only_forks).await, vec!["github.com/a/alpha-fork"]);

        let only_private = ReposListOptions {
            only_private: true,
            ..Default::default()
        };
        assert_eq!(names(&s, only_private).await, vec!["gitlab.com/c/secret"]);
    }

    #[tokio::test]
    async fn test_context_and_user_scoping() {
        let s = store();
        let in_context = ReposListOptions {
            search_context_id: Some(11),
            ..Default::default()
        };
        assert_eq!(names(&s, in_context).await, vec!["github.com/b/old"]);

        let owned = ReposListOptions {
            user_id: Some(7),
            ..Default::default()
        };
        assert_eq!(
            names(&s, owned).await,
            vec!["github.com/a/alpha", "gitlab.com/c/secret"]
        );

        let with_public = ReposListOptions {
            user_id: Some(7),
            include_user_public_repos: true,
            ..Default::default()
        };
        assert_eq!(
            names(&s, with_public).await,
            vec!["github.com/a/alpha", "gitlab.com/c/secret", "github.com/d/shared"]
        );
    }

    #[tokio::test]
    async fn test_stars_order_and_limit() {
        let s = store();
        let ranked = ReposListOptions {
            order_by: Some(RepoListOrder::StarsDescending),
            ..Default::default()
        };
        assert_eq!(
            names(&s, ranked.clone()).await,
            vec![
                "github.com/a/alpha-fork",
                "github.com/d/shared",
                "github.com/a/alpha",
                "gitlab.com/c/secret",
                "github.com/b/old",
            ]
        );

        let limited = ReposListOptions {
            limit: Some(2),
            ..ranked
        };
        assert_eq!(
            names(&s, limited.clone()).await,
            vec!["github.com/a/alpha-fork", "github.com/d/shared"]
        );
        assert_eq!(s.count(&limited).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_default_repos() {
        let defaults = store().list_default_repos().await.unwrap();
        assert_eq!(
            defaults,
            vec![
                RepoName::new(1, "github.com/a/alpha"),
                RepoName::new(3, "github.com/b/old")
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_pattern_is_bad_request() {
        let err = store()
            .list_repo_names(&ReposListOptions {
                include_patterns: vec!["(".into()],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(err, Error::BadRequest(_));
    }
}
