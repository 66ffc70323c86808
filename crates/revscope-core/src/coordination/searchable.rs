//! Default searchable repositories

use std::time::Duration;

use rayon::prelude::*;
use regex::Regex;

use crate::error::Result;
use crate::patterns::union_regexps;
use crate::traits::{IndexBackend, RepoStore};
use crate::types::RepoName;

/// Deadline for asking the index which repositories it serves
pub const INDEX_LIST_TIMEOUT: Duration = Duration::from_secs(1);

/// Default repositories that are not excluded and are currently indexed.
///
/// Exclude patterns match case-insensitively. Store order is preserved.
///
/// # Errors
///
/// Fails when the store fails, or when the index does not answer within
/// [`INDEX_LIST_TIMEOUT`] (a [`crate::Error::Deadline`]).
pub async fn searchable_repositories<S, I>(
    store: &S,
    index: &I,
    exclude_patterns: &[String],
) -> Result<Vec<RepoName>>
where
    S: RepoStore,
    I: IndexBackend,
{
    let mut repos = store
        .list_default_repos()
        .await
        .map_err(|e| e.with_context("querying database for searchable repos"))?;

    if !exclude_patterns.is_empty() {
        let exclude = Regex::new(&format!("(?i){}", union_regexps(exclude_patterns)))?;
        repos = repos
            .into_par_iter()
            .filter(|repo| !exclude.is_match(&repo.name))
            .collect();
    }

    let indexed = tokio::time::timeout(INDEX_LIST_TIMEOUT, index.list_indexed()).await??;
    repos.retain(|repo| indexed.contains(&repo.name));

    Ok(repos)
}
