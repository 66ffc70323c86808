//! Version control over a directory of local git repositories

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use git2::ErrorCode;

use crate::error::{Error, Result};
use crate::git::refs::matching_ref_tips;
use crate::git::threshold::parse_threshold;
use crate::traits::VersionControl;
use crate::types::{RepoName, ResolveRevisionOptions, RevisionSpecifier};

/// Repositories stored as `<root>/<name>` or `<root>/<name>.git`
///
/// git2::Repository is not Send/Sync, so every operation reopens the
/// repository inside `spawn_blocking`. Nothing is ever fetched from a
/// remote.
#[derive(Debug, Clone)]
pub struct LocalGitBackend {
    root: PathBuf,
}

impl LocalGitBackend {
    /// Serve repositories below `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory of a repository, if one exists on disk
    pub fn repo_dir(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        let plain = self.root.join(relative);
        if plain.is_dir() {
            return Some(plain);
        }
        let bare = self.root.join(format!("{}.git", name));
        bare.is_dir().then_some(bare)
    }

    fn open(dir: Option<PathBuf>, name: &str) -> Result<git2::Repository> {
        let Some(dir) = dir else {
            return Err(Error::RepoNotFound {
                repo: name.to_string(),
                clone_in_progress: false,
            });
        };

        // A directory that is not a repository yet is still being cloned.
        git2::Repository::open(&dir).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::RepoNotFound {
                repo: name.to_string(),
                clone_in_progress: true,
            },
            _ => Error::from(e),
        })
    }
}

/// Resolve `spec` (empty means `HEAD`) to a commit
fn find_commit<'r>(
    repo: &'r git2::Repository,
    name: &str,
    spec: &str,
) -> Result<git2::Commit<'r>> {
    let spec = if spec.is_empty() { "HEAD" } else { spec };

    let object = repo.revparse_single(spec).map_err(|e| match e.code() {
        ErrorCode::NotFound
        | ErrorCode::InvalidSpec
        | ErrorCode::Ambiguous
        | ErrorCode::UnbornBranch => Error::RevisionNotFound {
            repo: name.to_string(),
            spec: spec.to_string(),
        },
        _ => Error::from(e),
    })?;

    object.peel_to_commit().map_err(|e| Error::BadCommit {
        spec: spec.to_string(),
        message: e.message().to_string(),
    })
}

/// Commits a specifier starts from when looking at history
fn starting_points(
    repo: &git2::Repository,
    name: &str,
    rev: &RevisionSpecifier,
) -> Result<Vec<git2::Oid>> {
    match rev {
        RevisionSpecifier::RefGlob(glob) => matching_ref_tips(repo, glob),
        RevisionSpecifier::RevSpec(spec) => {
            let spec = spec.strip_prefix('^').unwrap_or(spec);
            Ok(vec![find_commit(repo, name, spec)?.id()])
        }
        RevisionSpecifier::Default | RevisionSpecifier::ExcludeRefGlob(_) => {
            Ok(vec![find_commit(repo, name, "")?.id()])
        }
    }
}

impl VersionControl for LocalGitBackend {
    async fn resolve_revision(
        &self,
        repo: &RepoName,
        spec: &str,
        _opts: ResolveRevisionOptions,
    ) -> Result<String> {
        let dir = self.repo_dir(&repo.name);
        let name = repo.name.clone();
        let spec = spec.to_string();

        tokio::task::spawn_blocking(move || {
            let repo = Self::open(dir, &name)?;
            let commit = find_commit(&repo, &name, &spec)?;
            Ok(commit.id().to_string())
        })
        .await
        .map_err(|e| Error::Runtime(format!("Task join error: {}", e)))?
    }

    async fn has_commit_after(
        &self,
        repo: &RepoName,
        after: &str,
        rev: &RevisionSpecifier,
    ) -> Result<bool> {
        let threshold = parse_threshold(after, Utc::now())?.timestamp();
        let dir = self.repo_dir(&repo.name);
        let name = repo.name.clone();
        let rev = rev.clone();

        tokio::task::spawn_blocking(move || {
            let repo = Self::open(dir, &name)?;
            for oid in starting_points(&repo, &name, &rev)? {
                // Tips carry the newest committer time of their history.
                if repo.find_commit(oid)?.time().seconds() > threshold {
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .await
        .map_err(|e| Error::Runtime(format!("Task join error: {}", e)))?
    }
}
