//! Counting repositories left out by the default fork and archive policy

use crate::patterns::exactly_one_repo;
use crate::traits::RepoStore;
use crate::types::{ExcludedRepos, QueryParams, ReposListOptions};

/// Count the forks and archived repositories `options` would match but
/// which the default policy hides.
///
/// A count runs only when the query leaves its dimension unset and does not
/// name exactly one repository. Both counts run concurrently, each writing
/// its own result. A failed count is logged and reported as zero.
pub async fn compute_excluded_repositories<S: RepoStore>(
    store: &S,
    query: Option<&QueryParams>,
    options: &ReposListOptions,
) -> ExcludedRepos {
    let Some(query) = query else {
        return ExcludedRepos::default();
    };
    let single_repo = exactly_one_repo(&options.include_patterns);

    let forks = async {
        if query.fork.is_some() || single_repo {
            return 0;
        }
        let select_forks = ReposListOptions {
            only_forks: true,
            no_forks: false,
            ..options.clone()
        };
        count_or_zero(store, &select_forks, "fork").await
    };

    let archived = async {
        if query.archived.is_some() || single_repo {
            return 0;
        }
        let select_archived = ReposListOptions {
            only_archived: true,
            no_archived: false,
            ..options.clone()
        };
        count_or_zero(store, &select_archived, "archive").await
    };

    let (forks, archived) = futures::join!(forks, archived);
    ExcludedRepos { forks, archived }
}

async fn count_or_zero<S: RepoStore>(store: &S, options: &ReposListOptions, what: &str) -> usize {
    match store.count(options).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "repo count for excluded {}", what);
            0
        }
    }
}
