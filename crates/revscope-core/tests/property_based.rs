//! Property-based tests using proptest

use std::collections::BTreeSet;

use proptest::prelude::*;
use regex::Regex;
use revscope_core::patterns::{
    compile_patterns, parse_repository_revisions, revs_for_matched_repo, union_regexps,
    PatternRevspec, RevisionMatch,
};
use revscope_core::RevisionSpecifier;

// Revision parts without glob markers or separators
fn arb_rev() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9][a-z0-9./_-]{0,12}").expect("valid regex")
}

fn arb_specifier() -> impl Strategy<Value = RevisionSpecifier> {
    prop_oneof![
        Just(RevisionSpecifier::Default),
        "[a-c]".prop_map(RevisionSpecifier::rev),
        "refs/tags/[a-c]\\*".prop_map(RevisionSpecifier::RefGlob),
    ]
}

fn arb_rev_lists() -> impl Strategy<Value = Vec<Vec<RevisionSpecifier>>> {
    prop::collection::vec(prop::collection::vec(arb_specifier(), 1..4), 2..5)
}

fn match_all(revs: Vec<RevisionSpecifier>) -> PatternRevspec {
    PatternRevspec {
        pattern: Regex::new("(?i:.*)").unwrap(),
        revs,
    }
}

proptest! {
    #[test]
    fn test_parse_splits_at_first_at(
        name in "[a-z./]{0,20}",
        revs in prop::collection::vec(arb_rev(), 1..5),
    ) {
        let pattern = format!("{}@{}", name, revs.join(":"));
        let (parsed_name, parsed_revs) = parse_repository_revisions(&pattern);

        prop_assert_eq!(parsed_name, name.as_str());
        let expected: Vec<RevisionSpecifier> =
            revs.iter().map(|r| RevisionSpecifier::rev(r.as_str())).collect();
        prop_assert_eq!(parsed_revs, expected);
    }

    #[test]
    fn test_parse_never_yields_empty_revspec(suffix in "[a-z:]{0,12}") {
        let (_, revs) = parse_repository_revisions(&format!("repo@{}", suffix));
        prop_assert!(!revs.is_empty());
        for rev in &revs {
            prop_assert!(!matches!(rev, RevisionSpecifier::RevSpec(s) if s.is_empty()));
        }
    }

    #[test]
    fn test_compiled_patterns_keep_input_shape(
        patterns in prop::collection::vec("[a-z]{1,8}(@[a-z]{1,4})?", 0..6),
    ) {
        let compiled = compile_patterns(&patterns, false).unwrap();
        prop_assert_eq!(compiled.include_patterns.len(), patterns.len());
        prop_assert!(compiled.include_patterns.iter().all(|p| !p.contains('@')));

        let with_revs = patterns.iter().filter(|p| p.contains('@')).count();
        prop_assert_eq!(compiled.pattern_revs.len(), with_revs);
    }

    #[test]
    fn test_union_matches_any(
        patterns in prop::collection::vec("[a-d]{1,3}(\\|[a-d]{1,3})?", 1..5),
        name in "[a-d]{0,8}",
    ) {
        let union = Regex::new(&union_regexps(&patterns)).unwrap();
        let any = patterns
            .iter()
            .any(|p| Regex::new(p).unwrap().is_match(&name));
        prop_assert_eq!(union.is_match(&name), any);
    }

    #[test]
    fn test_intersection_or_clash(lists in arb_rev_lists()) {
        let patterns: Vec<PatternRevspec> = lists.iter().cloned().map(match_all).collect();
        let sets: Vec<BTreeSet<&RevisionSpecifier>> =
            lists.iter().map(|l| l.iter().collect()).collect();

        match revs_for_matched_repo("repo", &patterns) {
            RevisionMatch::Matched(revs) => {
                prop_assert!(!revs.is_empty());
                prop_assert!(revs.windows(2).all(|w| w[0] < w[1]));
                for rev in &revs {
                    prop_assert!(sets.iter().all(|s| s.contains(rev)));
                }
            }
            RevisionMatch::Clash(revs) => {
                let common = sets[0].iter().any(|rev| sets.iter().all(|s| s.contains(rev)));
                prop_assert!(!common);
                let union: BTreeSet<&RevisionSpecifier> = sets.iter().flatten().copied().collect();
                prop_assert_eq!(revs.iter().collect::<BTreeSet<_>>(), union);
                prop_assert!(revs.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_single_matching_pattern_is_verbatim(revs in prop::collection::vec(arb_specifier(), 1..5)) {
        let patterns = vec![
            match_all(revs.clone()),
            PatternRevspec {
                pattern: Regex::new("(?i:^never$)").unwrap(),
                revs: vec![RevisionSpecifier::rev("x")],
            },
        ];
        prop_assert_eq!(revs_for_matched_repo("repo", &patterns), RevisionMatch::Matched(revs));
    }
}
