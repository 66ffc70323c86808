//! Ref glob expansion
//!
//! Follows `git log --glob` rules: a pattern without a leading `refs/` is
//! taken relative to `refs/`, and a pattern without glob characters gets an
//! implicit `/*`.

use globset::{Glob, GlobMatcher};

use crate::error::Result;

/// Normalize a user ref glob to a full-ref pattern
pub fn normalize_ref_glob(glob: &str) -> String {
    let mut pattern = if glob.starts_with("refs/") {
        glob.to_string()
    } else {
        format!("refs/{}", glob)
    };

    if !pattern.contains(['*', '?', '[']) {
        if !pattern.ends_with('/') {
            pattern.push('/');
        }
        pattern.push('*');
    }
    pattern
}

/// Compile a user ref glob
pub fn ref_glob_matcher(glob: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(&normalize_ref_glob(glob))?.compile_matcher())
}

/// Commits at the tips of every ref matching `glob`
pub fn matching_ref_tips(repo: &git2::Repository, glob: &str) -> Result<Vec<git2::Oid>> {
    let matcher = ref_glob_matcher(glob)?;
    let mut tips = Vec::new();

    for reference in repo.references()? {
        let reference = reference?;
        let Some(name) = reference.name() else {
            continue;
        };
        if !matcher.is_match(name) {
            continue;
        }
        // Refs to trees or blobs have no history.
        if let Ok(commit) = reference.peel_to_commit() {
            tips.push(commit.id());
        }
    }

    Ok(tips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ref_glob() {
        assert_eq!(normalize_ref_glob("refs/heads/*"), "refs/heads/*");
        assert_eq!(normalize_ref_glob("heads/*"), "refs/heads/*");
        assert_eq!(normalize_ref_glob("refs/tags"), "refs/tags/*");
        assert_eq!(normalize_ref_glob("tags/"), "refs/tags/*");
        assert_eq!(normalize_ref_glob("heads/release-?"), "refs/heads/release-?");
    }

    #[test]
    fn test_star_crosses_separators() {
        let matcher = ref_glob_matcher("heads/*").unwrap();
        assert!(matcher.is_match("refs/heads/main"));
        assert!(matcher.is_match("refs/heads/feature/x"));
        assert!(!matcher.is_match("refs/tags/v1"));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(ref_glob_matcher("heads/[").is_err());
    }
}
