//! `name@rev1:rev2` suffix parsing

use crate::types::RevisionSpecifier;
use memchr::{memchr, memchr_iter};

/// Split a pattern into its bare name part and attached revisions.
///
/// The name ends at the first `@`. Empty `:`-separated parts are skipped;
/// a suffix with no remaining parts (`name@`) yields the default
/// specifier. A pattern without `@` has no revisions.
pub fn parse_repository_revisions(pattern: &str) -> (&str, Vec<RevisionSpecifier>) {
    let Some(at) = memchr(b'@', pattern.as_bytes()) else {
        return (pattern, Vec::new());
    };

    let name = &pattern[..at];
    let suffix = &pattern[at + 1..];

    let mut revs = Vec::new();
    let mut start = 0;
    let ends = memchr_iter(b':', suffix.as_bytes()).chain(std::iter::once(suffix.len()));
    for end in ends {
        let part = &suffix[start..end];
        if !part.is_empty() {
            revs.push(RevisionSpecifier::parse(part));
        }
        start = end + 1;
    }

    if revs.is_empty() {
        revs.push(RevisionSpecifier::Default);
    }

    (name, revs)
}
