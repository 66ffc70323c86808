//! Revision selection for a repository matched by revision-pinning patterns

use std::collections::HashMap;

use crate::patterns::compiler::PatternRevspec;
use crate::types::RevisionSpecifier;

/// Revisions that apply to one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionMatch {
    /// Revisions to search
    Matched(Vec<RevisionSpecifier>),
    /// Matching patterns share no revision; every distinct one, sorted
    Clash(Vec<RevisionSpecifier>),
}

/// Determine the revisions to search in `repo`.
///
/// - no matching pattern: the default specifier
/// - one matching pattern: its revisions verbatim
/// - several: the specifiers present in every matching list, sorted; when
///   there are none, a clash listing every distinct specifier, sorted
pub fn revs_for_matched_repo(repo: &str, patterns: &[PatternRevspec]) -> RevisionMatch {
    let rev_lists: Vec<&[RevisionSpecifier]> = patterns
        .iter()
        .filter(|p| p.pattern.is_match(repo))
        .map(|p| p.revs.as_slice())
        .collect();

    match rev_lists.as_slice() {
        [] => return RevisionMatch::Matched(vec![RevisionSpecifier::Default]),
        [only] => return RevisionMatch::Matched(only.to_vec()),
        _ => {}
    }

    // Number of lists each specifier appears in. A specifier repeated
    // within one list counts once for that list.
    let mut seen_in: HashMap<&RevisionSpecifier, usize> = HashMap::with_capacity(rev_lists[0].len());
    for (i, list) in rev_lists.iter().enumerate() {
        for rev in list.iter() {
            let count = seen_in.entry(rev).or_insert(0);
            if *count == i {
                *count += 1;
            }
        }
    }

    let mut matched: Vec<RevisionSpecifier> = seen_in
        .iter()
        .filter(|(_, count)| **count == rev_lists.len())
        .map(|(rev, _)| (*rev).clone())
        .collect();

    if !matched.is_empty() {
        matched.sort();
        return RevisionMatch::Matched(matched);
    }

    let mut clashing: Vec<RevisionSpecifier> = seen_in.into_keys().cloned().collect();
    clashing.sort();
    RevisionMatch::Clash(clashing)
}
