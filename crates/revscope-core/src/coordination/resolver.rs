//! Repository scope resolver
//!
//! Turns query scoping [`Options`] into the validated repositories and
//! revisions to search:
//!
//! 1. expand repo groups and compile include patterns
//! 2. resolve the version context and search context
//! 3. pick the default searchable repositories, or list repositories from
//!    the store while counting default exclusions
//! 4. assign revisions per repository and validate them
//! 5. optionally keep only revisions with a recent commit

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::Instrument;

use crate::config::{resolve_version_context, search_limits, Settings, VersionContext};
use crate::coordination::commit_after::filter_repo_has_commit_after;
use crate::coordination::excluded::compute_excluded_repositories;
use crate::coordination::searchable::searchable_repositories;
use crate::coordination::validate::RevisionValidator;
use crate::error::Result;
use crate::patterns::{
    compile_patterns, repo_groups_to_include_pattern, revs_for_matched_repo, union_regexps,
    CompiledPatterns, PatternRevspec, RevisionMatch,
};
use crate::traits::{ConfigSource, IndexBackend, RepoStore, SearchContextStore, VersionControl};
use crate::types::{
    ExcludedRepos, Options, RepoId, RepoListOrder, RepoName, RepositoryRevisions,
    ReposListOptions, Resolved, RevisionSpecifier,
};

/// Resolves the repositories and revisions a query searches
pub struct Resolver<'a, S, V, I, C, K> {
    store: &'a S,
    vcs: &'a V,
    index: &'a I,
    contexts: &'a C,
    config: &'a K,
}

/// Where a repository's revisions come from
enum RevisionSource<'p> {
    Version(&'p VersionContext),
    SearchContext(HashMap<RepoId, &'p [RevisionSpecifier]>),
    Patterns(&'p [PatternRevspec]),
}

impl RevisionSource<'_> {
    fn assign(&self, repo: &RepoName) -> RevisionMatch {
        match self {
            Self::Version(vc) => RevisionMatch::Matched(
                vc.revisions
                    .iter()
                    .filter(|pin| pin.repo == repo.name)
                    .map(|pin| RevisionSpecifier::rev(pin.rev.as_str()))
                    .collect(),
            ),
            Self::SearchContext(pins) => RevisionMatch::Matched(
                pins.get(&repo.id)
                    .map(|revs| revs.to_vec())
                    .unwrap_or_default(),
            ),
            Self::Patterns(pattern_revs) => revs_for_matched_repo(&repo.name, pattern_revs),
        }
    }
}

impl<'a, S, V, I, C, K> Resolver<'a, S, V, I, C, K>
where
    S: RepoStore,
    V: VersionControl,
    I: IndexBackend,
    C: SearchContextStore,
    K: ConfigSource,
{
    /// Create a resolver over its collaborators
    pub fn new(store: &'a S, vcs: &'a V, index: &'a I, contexts: &'a C, config: &'a K) -> Self {
        Self {
            store,
            vcs,
            index,
            contexts,
            config,
        }
    }

    /// Resolve the repositories and revisions to search.
    ///
    /// Configuration is read once per call.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::BadRequest`] for an invalid include pattern or an
    ///   unknown version context
    /// - search-context, listing and default-repository failures
    /// - [`crate::Error::Deadline`] and [`crate::Error::BadCommit`] raised
    ///   while validating revisions
    /// - the first failure of the commit-after check
    pub async fn resolve(&self, op: &Options) -> Result<Resolved> {
        let span = tracing::info_span!("resolve_repositories", options = %op);
        self.resolve_inner(op).instrument(span).await
    }

    async fn resolve_inner(&self, op: &Options) -> Result<Resolved> {
        let config = self.config.current();
        let dotcom_mode = config.dotcom_mode;

        let mut include_patterns = op.repo_filters.clone();
        let exclude_patterns = &op.minus_repo_filters;

        let mut limit = match op.limit {
            0 => usize::try_from(search_limits(&config).max_repos).unwrap_or(usize::MAX),
            n => n,
        };

        if !op.repo_group_filters.is_empty() {
            let no_settings = Settings::default();
            let settings = op.user_settings.as_ref().unwrap_or(&no_settings);
            let (unioned, num_patterns) =
                repo_groups_to_include_pattern(&op.repo_group_filters, settings);
            include_patterns.push(unioned);
            tracing::debug!(num_patterns, "repogroups: adding repos to include pattern");

            // Every repository named by a group must fit.
            limit = limit.max(num_patterns);
        }

        let CompiledPatterns {
            include_patterns,
            pattern_revs,
        } = compile_patterns(&include_patterns, dotcom_mode)?;

        // Explicit revisions take precedence over a version context.
        let version_context = if pattern_revs.is_empty() && !op.version_context_name.is_empty() {
            Some(resolve_version_context(&config, &op.version_context_name)?)
        } else {
            None
        };
        let version_context_repos: Vec<String> = version_context
            .map(|vc| vc.revisions.iter().map(|pin| pin.repo.clone()).collect())
            .unwrap_or_default();

        let search_context = self.contexts.resolve_spec(&op.search_context_spec).await?;

        let type_repo = op.query.as_ref().is_some_and(|q| q.type_repo);
        let mut searchable = Vec::new();
        if dotcom_mode && include_patterns.is_empty() && !type_repo && search_context.is_global() {
            let start = Instant::now();
            searchable = searchable_repositories(self.store, self.index, exclude_patterns)
                .await
                .map_err(|e| e.with_context("getting list of default repos"))?;
            tracing::debug!(
                count = searchable.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "searchable repos"
            );
            limit = limit.max(searchable.len());
        }

        let (mut repos, excluded) = if !searchable.is_empty() {
            (searchable, ExcludedRepos::default())
        } else {
            let mut options = ReposListOptions {
                include_patterns,
                names: version_context_repos,
                exclude_pattern: union_regexps(exclude_patterns),
                // One extra so an omitted repository is noticed.
                limit: Some(limit.saturating_add(1)),
                no_forks: op.no_forks,
                only_forks: op.only_forks,
                no_archived: op.no_archived,
                only_archived: op.only_archived,
                no_private: op.only_public,
                only_private: op.only_private,
                order_by: op.ranked.then_some(RepoListOrder::StarsDescending),
                ..Default::default()
            };
            if search_context.id != 0 {
                options.search_context_id = Some(search_context.id);
            } else if search_context.namespace_user_id != 0 {
                options.user_id = Some(search_context.namespace_user_id);
                options.include_user_public_repos = true;
            }

            tracing::debug!("listing repos");
            let (listed, excluded) = futures::join!(
                self.store.list_repo_names(&options),
                compute_excluded_repositories(self.store, op.query.as_ref(), &options),
            );
            tracing::debug!(
                forks = excluded.forks,
                archived = excluded.archived,
                "listing repos done"
            );
            (listed?, excluded)
        };

        let over_limit = repos.len() > limit;
        repos.truncate(limit);

        // Auto-defined contexts search the default branch only.
        let context_revs = if search_context.is_auto_defined() {
            Vec::new()
        } else {
            self.contexts
                .repository_revisions(search_context.id)
                .await?
        };

        let source = if let Some(vc) = version_context {
            RevisionSource::Version(vc)
        } else if !context_revs.is_empty() {
            RevisionSource::SearchContext(
                context_revs
                    .iter()
                    .rev()
                    .map(|rr| (rr.repo.id, rr.revs.as_slice()))
                    .collect(),
            )
        } else {
            RevisionSource::Patterns(&pattern_revs)
        };

        let assigned: Vec<RevisionMatch> = repos.par_iter().map(|repo| source.assign(repo)).collect();

        tracing::debug!(repos = repos.len(), "validating revisions");
        let validator = RevisionValidator::new(self.vcs);
        let mut repo_revs = Vec::with_capacity(repos.len());
        let mut missing_repo_revs = Vec::new();

        for (repo, assignment) in repos.into_iter().zip(assigned) {
            let revs = match assignment {
                RevisionMatch::Matched(revs) => revs,
                RevisionMatch::Clash(clashing) => {
                    missing_repo_revs.push(RepositoryRevisions::new(repo.clone(), clashing));
                    Vec::new()
                }
            };

            let validated = validator.validate(&repo, revs).await?;
            missing_repo_revs.extend(
                validated
                    .missing
                    .into_iter()
                    .map(|rev| RepositoryRevisions::new(repo.clone(), vec![rev])),
            );
            repo_revs.push(RepositoryRevisions::new(repo, validated.revs));
        }
        tracing::debug!(missing = missing_repo_revs.len(), "validating revisions done");

        if let Some(after) = op.commit_after.as_deref().filter(|a| !a.is_empty()) {
            let start = Instant::now();
            let before = repo_revs.len();
            let (passed, err) = filter_repo_has_commit_after(self.vcs, repo_revs, after).await;
            tracing::debug!(
                removed = before - passed.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "repohascommitafter"
            );
            if let Some(err) = err {
                return Err(err);
            }
            repo_revs = passed;
        }

        Ok(Resolved {
            repo_revs,
            missing_repo_revs,
            excluded_repos: excluded,
            over_limit,
        })
    }
}
