//! Repository name patterns and the revisions attached to them

pub mod compiler;
pub mod groups;
pub mod matcher;
pub mod revspec;

pub use compiler::{
    compile_patterns, exactly_one_repo, optimize_repo_pattern_with_heuristics, union_regexps,
    CompiledPatterns, PatternRevspec,
};
pub use groups::repo_groups_to_include_pattern;
pub use matcher::{revs_for_matched_repo, RevisionMatch};
pub use revspec::parse_repository_revisions;
