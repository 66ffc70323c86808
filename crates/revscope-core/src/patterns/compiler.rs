//! Include-pattern compilation
//!
//! Splits revision suffixes off include patterns, validates the remaining
//! name regexes, applies name rewrites and compiles case-insensitive
//! matchers for every pattern that carried revisions.

use regex::Regex;
use regex_syntax::hir::HirKind;

use crate::error::Result;
use crate::patterns::revspec::parse_repository_revisions;
use crate::types::RevisionSpecifier;

/// Hosting namespace rewritten by the name heuristics
const GITHUB_HOST: &str = "github.com";
const GITHUB_HOST_ESCAPED: &str = r"github\.com";

/// A compiled name pattern and the revisions attached to it
#[derive(Debug, Clone)]
pub struct PatternRevspec {
    /// Case-insensitive matcher over repository names
    pub pattern: Regex,
    /// Revisions in the order they were written
    pub revs: Vec<RevisionSpecifier>,
}

/// Output of [`compile_patterns`]
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    /// Bare, rewritten include patterns in input order
    pub include_patterns: Vec<String>,
    /// One entry per include pattern that carried revisions
    pub pattern_revs: Vec<PatternRevspec>,
}

/// Compile include patterns.
///
/// Returns the rewritten bare patterns alongside the revision table; the
/// input is left untouched. A name that fails to compile is a
/// [`Error::BadRequest`] carrying the compiler diagnostic.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S], dotcom_mode: bool) -> Result<CompiledPatterns> {
    let mut compiled = CompiledPatterns {
        include_patterns: Vec::with_capacity(patterns.len()),
        pattern_revs: Vec::with_capacity(patterns.len()),
    };

    for pattern in patterns {
        let (name, revs) = parse_repository_revisions(pattern.as_ref());

        // Validate before rewriting so the diagnostic refers to what the user typed.
        Regex::new(name)?;

        let name = optimize_repo_pattern_with_heuristics(name, dotcom_mode);
        if !revs.is_empty() {
            let matcher = Regex::new(&format!("(?i:{})", name))?;
            compiled.pattern_revs.push(PatternRevspec {
                pattern: matcher,
                revs,
            });
        }
        compiled.include_patterns.push(name);
    }

    Ok(compiled)
}

/// Rewrite a repository name pattern.
///
/// In dotcom mode a pattern starting with the public host is anchored to
/// the start of the name. The dot of the host is always escaped.
pub fn optimize_repo_pattern_with_heuristics(pattern: &str, dotcom_mode: bool) -> String {
    let mut pattern = if dotcom_mode
        && (pattern.starts_with(GITHUB_HOST) || pattern.starts_with(GITHUB_HOST_ESCAPED))
    {
        format!("^{}", pattern)
    } else {
        pattern.to_string()
    };

    if pattern.contains(GITHUB_HOST) {
        pattern = pattern.replace(GITHUB_HOST, GITHUB_HOST_ESCAPED);
    }
    pattern
}

/// Join patterns into one alternation.
///
/// Patterns containing `|` are parenthesized since `|` binds loosest.
pub fn union_regexps<S: AsRef<str>>(patterns: &[S]) -> String {
    match patterns {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        _ => patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                if p.contains('|') {
                    format!("({})", p)
                } else {
                    p.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("|"),
    }
}

/// True when the filters name exactly one repository by an anchored literal.
///
/// Such queries return the repository even when it is a fork or archived,
/// so no exclusion counting is needed.
pub fn exactly_one_repo<S: AsRef<str>>(repo_filters: &[S]) -> bool {
    let [only] = repo_filters else {
        return false;
    };

    let (filter, _) = parse_repository_revisions(only.as_ref());
    let Some(inner) = filter
        .strip_prefix('^')
        .and_then(|rest| rest.strip_suffix('$'))
    else {
        return false;
    };

    match regex_syntax::Parser::new().parse(inner) {
        Ok(hir) => matches!(hir.kind(), HirKind::Literal(_)),
        Err(_) => false,
    }
}
