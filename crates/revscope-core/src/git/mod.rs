//! Local git version-control backend

pub mod backend;
pub mod refs;
pub mod threshold;

pub use backend::LocalGitBackend;
pub use refs::{normalize_ref_glob, ref_glob_matcher};
pub use threshold::parse_threshold;
