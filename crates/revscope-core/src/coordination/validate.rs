//! Revision validation against the version-control backend

use crate::error::{ErrorKind, Result};
use crate::traits::VersionControl;
use crate::types::{RepoName, ResolveRevisionOptions, RevisionSpecifier};

/// Outcome of validating one repository's revisions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedRevisions {
    /// Revisions to search, in input order
    pub revs: Vec<RevisionSpecifier>,
    /// Revisions that do not exist in the repository
    pub missing: Vec<RevisionSpecifier>,
}

/// Confirms that requested revisions exist before a search is planned
pub struct RevisionValidator<'a, V> {
    vcs: &'a V,
}

impl<'a, V: VersionControl> RevisionValidator<'a, V> {
    /// Create a validator over a version-control backend
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    /// Validate the revisions requested for `repo`.
    ///
    /// Ref globs and the default specifier pass through. Explicit revspecs
    /// are resolved without fetching from the remote, ignoring a leading
    /// `^`. A revision that does not exist is reported missing; any other
    /// per-revision failure drops the revision and is left for the search
    /// to surface.
    ///
    /// # Errors
    ///
    /// Deadline and bad-commit failures abort validation.
    pub async fn validate(
        &self,
        repo: &RepoName,
        revs: Vec<RevisionSpecifier>,
    ) -> Result<ValidatedRevisions> {
        let mut validated = ValidatedRevisions {
            revs: Vec::with_capacity(revs.len()),
            missing: Vec::new(),
        };

        for rev in revs {
            if !matches!(rev, RevisionSpecifier::RevSpec(_)) {
                validated.revs.push(rev);
                continue;
            }

            let spec = rev.rev_spec();
            let trimmed = spec.strip_prefix('^').unwrap_or(spec);
            let opts = ResolveRevisionOptions {
                no_ensure_revision: true,
            };

            match self.vcs.resolve_revision(repo, trimmed, opts).await {
                Ok(_) => validated.revs.push(rev),
                Err(e) => match e.kind() {
                    ErrorKind::Deadline | ErrorKind::BadCommit => return Err(e),
                    ErrorKind::RevisionNotFound => {
                        validated.missing.push(missing_display(spec));
                    }
                    _ => {
                        tracing::debug!(repo = %repo.name, rev = %spec, error = %e, "dropping revision");
                    }
                },
            }
        }

        Ok(validated)
    }
}

/// An empty revspec is reported as `HEAD`
fn missing_display(spec: &str) -> RevisionSpecifier {
    if spec.is_empty() {
        RevisionSpecifier::RevSpec("HEAD".to_string())
    } else {
        RevisionSpecifier::RevSpec(spec.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::FakeVcs;
    use assert_matches::assert_matches;

    fn revs(parts: &[&str]) -> Vec<RevisionSpecifier> {
        parts.iter().map(|r| RevisionSpecifier::parse(r)).collect()
    }

    fn repo() -> RepoName {
        RepoName::new(1, "github.com/a/b")
    }

    #[tokio::test]
    async fn test_globs_and_default_pass_through_unresolved() {
        let vcs = FakeVcs::default();
        let validated = RevisionValidator::new(&vcs)
            .validate(&repo(), revs(&["", "*refs/tags/*", "*!refs/heads/x"]))
            .await
            .unwrap();
        assert_eq!(validated.revs, revs(&["", "*refs/tags/*", "*!refs/heads/x"]));
        assert!(validated.missing.is_empty());
        assert!(vcs.resolved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_negation_stripped_for_lookup_only() {
        let vcs = FakeVcs::with_revs(&[("github.com/a/b", "main")]);
        let validated = RevisionValidator::new(&vcs)
            .validate(&repo(), revs(&["^main"]))
            .await
            .unwrap();
        assert_eq!(validated.revs, revs(&["^main"]));
        assert_eq!(
            vcs.resolved.lock().as_slice(),
            &[("github.com/a/b".to_string(), "main".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_missing_revision_recorded_and_others_kept() {
        let vcs = FakeVcs::with_revs(&[("github.com/a/b", "v1")]);
        let validated = RevisionValidator::new(&vcs)
            .validate(&repo(), revs(&["v1", "v9", "*refs/tags/*"]))
            .await
            .unwrap();
        assert_eq!(validated.revs, revs(&["v1", "*refs/tags/*"]));
        assert_eq!(validated.missing, revs(&["v9"]));
    }

    #[tokio::test]
    async fn test_other_errors_drop_silently() {
        let mut vcs = FakeVcs::with_revs(&[("github.com/a/b", "v1")]);
        vcs.resolve_errors
            .insert(("github.com/a/b".into(), "v2".into()), ErrorKind::Git);
        vcs.resolve_errors
            .insert(("github.com/a/b".into(), "v3".into()), ErrorKind::RepoNotFound);
        let validated = RevisionValidator::new(&vcs)
            .validate(&repo(), revs(&["v1", "v2", "v3"]))
            .await
            .unwrap();
        assert_eq!(validated.revs, revs(&["v1"]));
        assert!(validated.missing.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_aborts() {
        let mut vcs = FakeVcs::default();
        vcs.resolve_errors
            .insert(("github.com/a/b".into(), "v1".into()), ErrorKind::Deadline);
        let err = RevisionValidator::new(&vcs)
            .validate(&repo(), revs(&["v1", "v2"]))
            .await
            .unwrap_err();
        assert_matches!(err, Error::Deadline(_));
        assert_eq!(vcs.resolved.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_commit_aborts() {
        let mut vcs = FakeVcs::default();
        vcs.resolve_errors
            .insert(("github.com/a/b".into(), "v1".into()), ErrorKind::BadCommit);
        let err = RevisionValidator::new(&vcs)
            .validate(&repo(), revs(&["v1"]))
            .await
            .unwrap_err();
        assert_matches!(err, Error::BadCommit { .. });
    }

    #[test]
    fn test_missing_display_of_empty_is_head() {
        assert_eq!(missing_display(""), RevisionSpecifier::rev("HEAD"));
        assert_eq!(missing_display("v1"), RevisionSpecifier::rev("v1"));
    }
}
