//! In-crate fakes for collaborator traits

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::error::{Error, ErrorKind, Result};
use crate::traits::{RepoStore, VersionControl};
use crate::types::{RepoName, ReposListOptions, ResolveRevisionOptions, RevisionSpecifier};

pub(crate) fn error_of_kind(kind: ErrorKind, repo: &str, spec: &str) -> Error {
    match kind {
        ErrorKind::Deadline => Error::Deadline("context deadline exceeded".into()),
        ErrorKind::BadCommit => Error::BadCommit {
            spec: spec.into(),
            message: "not a commit".into(),
        },
        ErrorKind::RevisionNotFound => Error::RevisionNotFound {
            repo: repo.into(),
            spec: spec.into(),
        },
        ErrorKind::RepoNotFound => Error::RepoNotFound {
            repo: repo.into(),
            clone_in_progress: false,
        },
        ErrorKind::Timeout => Error::Timeout("slow".into()),
        _ => Error::Git("backend unavailable".into()),
    }
}

/// Version control with a fixed set of known revisions per repository
#[derive(Default)]
pub(crate) struct FakeVcs {
    pub known: HashSet<(String, String)>,
    pub resolve_errors: HashMap<(String, String), ErrorKind>,
    pub commits_after: HashSet<(String, String)>,
    pub commit_errors: HashMap<(String, String), ErrorKind>,
    pub resolved: Mutex<Vec<(String, String, bool)>>,
}

impl FakeVcs {
    pub fn with_revs(revs: &[(&str, &str)]) -> Self {
        Self {
            known: revs
                .iter()
                .map(|(r, s)| (r.to_string(), s.to_string()))
                .collect(),
            ..Default::default()
        }
    }
}

impl VersionControl for FakeVcs {
    async fn resolve_revision(
        &self,
        repo: &RepoName,
        spec: &str,
        opts: ResolveRevisionOptions,
    ) -> Result<String> {
        self.resolved
            .lock()
            .push((repo.name.clone(), spec.to_string(), opts.no_ensure_revision));

        let key = (repo.name.clone(), spec.to_string());
        if let Some(&kind) = self.resolve_errors.get(&key) {
            return Err(error_of_kind(kind, &repo.name, spec));
        }
        if self.known.contains(&key) {
            Ok("0123456789abcdef0123456789abcdef01234567".to_string())
        } else {
            Err(Error::RevisionNotFound {
                repo: repo.name.clone(),
                spec: spec.to_string(),
            })
        }
    }

    async fn has_commit_after(
        &self,
        repo: &RepoName,
        _after: &str,
        rev: &RevisionSpecifier,
    ) -> Result<bool> {
        let key = (repo.name.clone(), rev.to_string());
        if let Some(&kind) = self.commit_errors.get(&key) {
            return Err(error_of_kind(kind, &repo.name, &key.1));
        }
        Ok(self.commits_after.contains(&key))
    }
}

/// Store that answers counts from a table keyed by the fork/archive toggles
#[derive(Default)]
pub(crate) struct CountingStore {
    pub forks: Option<usize>,
    pub archived: Option<usize>,
    pub counted: Mutex<Vec<ReposListOptions>>,
}

impl RepoStore for CountingStore {
    async fn list_repo_names(&self, _options: &ReposListOptions) -> Result<Vec<RepoName>> {
        Ok(Vec::new())
    }

    async fn count(&self, options: &ReposListOptions) -> Result<usize> {
        self.counted.lock().push(options.clone());
        let answer = if options.only_forks {
            self.forks
        } else if options.only_archived {
            self.archived
        } else {
            Some(0)
        };
        answer.ok_or_else(|| Error::Other("count failed".into()))
    }

    async fn list_default_repos(&self) -> Result<Vec<RepoName>> {
        Ok(Vec::new())
    }
}
