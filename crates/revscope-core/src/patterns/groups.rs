//! Repo group expansion

use crate::config::{RepoGroupValue, Settings};
use crate::patterns::compiler::union_regexps;

/// Expand named repo groups into a single include pattern.
///
/// Paths are matched exactly, regex entries are used as written. Returns the
/// unioned pattern and the number of entries it was built from; unknown group
/// names contribute nothing. The union of no entries is the empty pattern.
pub fn repo_groups_to_include_pattern<S: AsRef<str>>(
    group_names: &[S],
    settings: &Settings,
) -> (String, usize) {
    let patterns: Vec<String> = group_names
        .iter()
        .filter_map(|name| settings.repository_groups.get(name.as_ref()))
        .flatten()
        .map(|value| match value {
            RepoGroupValue::Path(path) => format!("^{}$", regex::escape(path)),
            RepoGroupValue::Pattern { regex } => regex.clone(),
        })
        .collect();

    let count = patterns.len();
    (union_regexps(&patterns), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.repository_groups.insert(
            "core".into(),
            vec![
                RepoGroupValue::Path("github.com/a/b".into()),
                RepoGroupValue::Pattern {
                    regex: "^github\\.com/a/lib-.*".into(),
                },
            ],
        );
        settings
            .repository_groups
            .insert("docs".into(), vec![RepoGroupValue::Path("gitlab.com/d".into())]);
        settings
    }

    #[test]
    fn test_paths_are_anchored_and_escaped() {
        let (pattern, count) = repo_groups_to_include_pattern(&["docs"], &settings());
        assert_eq!(pattern, r"^gitlab\.com/d$");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_groups_are_unioned_in_request_order() {
        let (pattern, count) = repo_groups_to_include_pattern(&["docs", "core"], &settings());
        assert_eq!(
            pattern,
            r"^gitlab\.com/d$|^github\.com/a/b$|^github\.com/a/lib-.*"
        );
        assert_eq!(count, 3);

        let re = regex::Regex::new(&pattern).unwrap();
        assert!(re.is_match("github.com/a/lib-x"));
        assert!(!re.is_match("github.com/a/bb"));
    }

    #[test]
    fn test_unknown_group_is_empty() {
        let (pattern, count) = repo_groups_to_include_pattern(&["nope"], &settings());
        assert_eq!(pattern, "");
        assert_eq!(count, 0);
    }
}
