//! Scope resolution pipeline

pub mod commit_after;
pub mod excluded;
pub mod resolver;
pub mod searchable;
pub mod validate;

pub use commit_after::{filter_repo_has_commit_after, ErrorAggregator, COMMIT_AFTER_CONCURRENCY};
pub use excluded::compute_excluded_repositories;
pub use resolver::Resolver;
pub use searchable::{searchable_repositories, INDEX_LIST_TIMEOUT};
pub use validate::{RevisionValidator, ValidatedRevisions};
