//! Commit-after filtering

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

use crate::error::{Error, ErrorKind};
use crate::traits::VersionControl;
use crate::types::RepositoryRevisions;

/// Maximum number of repositories checked at once
pub const COMMIT_AFTER_CONCURRENCY: usize = 128;

/// Keeps the first error recorded by any of a group of concurrent tasks
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    first: Mutex<Option<Error>>,
}

impl ErrorAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; only the first one is kept
    pub fn record(&self, err: Error) {
        let mut first = self.first.lock();
        if first.is_none() {
            *first = Some(err);
        }
    }

    /// The first recorded error, once every task is done
    pub fn into_inner(self) -> Option<Error> {
        self.first.into_inner()
    }
}

/// Keep the revisions that have a commit after `after`.
///
/// A repository survives when at least one of its revisions does, carrying
/// only the surviving revisions. Input order is preserved. Missing
/// revisions and repositories simply fail the check; any other error is
/// returned alongside the surviving set after every check has finished.
pub async fn filter_repo_has_commit_after<V: VersionControl>(
    vcs: &V,
    repos: Vec<RepositoryRevisions>,
    after: &str,
) -> (Vec<RepositoryRevisions>, Option<Error>) {
    let errors = ErrorAggregator::new();

    let pass: Vec<RepositoryRevisions> = stream::iter(repos)
        .map(|repo_revs| {
            let errors = &errors;
            async move {
                let mut kept = Vec::with_capacity(repo_revs.revs.len());
                for rev in &repo_revs.revs {
                    match vcs.has_commit_after(&repo_revs.repo, after, rev).await {
                        Ok(true) => kept.push(rev.clone()),
                        Ok(false) => {}
                        Err(e)
                            if matches!(
                                e.kind(),
                                ErrorKind::RevisionNotFound | ErrorKind::RepoNotFound
                            ) => {}
                        Err(e) => errors.record(e),
                    }
                }
                (!kept.is_empty()).then(|| RepositoryRevisions::new(repo_revs.repo, kept))
            }
        })
        .buffered(COMMIT_AFTER_CONCURRENCY)
        .filter_map(futures::future::ready)
        .collect()
        .await;

    (pass, errors.into_inner())
}
