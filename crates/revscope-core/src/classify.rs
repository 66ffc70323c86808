//! Per-repository search outcome classification
//!
//! Runs after a search over a resolved repository finishes. Recoverable
//! outcomes fold into [`RepoStatus`] bits; anything else is handed back as
//! a fatal error.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::Serialize;

use crate::error::{Error, ErrorKind};
use crate::types::{RepoId, RepositoryRevisions};

/// Bitset of per-repository search outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct RepoStatus(u8);

impl RepoStatus {
    /// No status
    pub const NONE: Self = Self(0);
    /// The repository is being cloned
    pub const CLONING: Self = Self(1);
    /// The repository does not exist
    pub const MISSING: Self = Self(2);
    /// The search hit a result limit in this repository
    pub const LIMIT_HIT: Self = Self(4);
    /// The search timed out in this repository
    pub const TIMEDOUT: Self = Self(8);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::CLONING, "Cloning"),
        (Self::MISSING, "Missing"),
        (Self::LIMIT_HIT, "LimitHit"),
        (Self::TIMEDOUT, "Timedout"),
    ];

    /// Raw bits
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no bit is set
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for RepoStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RepoStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (bit, name) in Self::NAMES {
            if self.contains(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Status per repository. Repositories without any status are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RepoStatusMap {
    statuses: BTreeMap<RepoId, RepoStatus>,
}

impl RepoStatusMap {
    /// A map holding one repository, or nothing when `status` is empty
    pub fn singleton(id: RepoId, status: RepoStatus) -> Self {
        let mut map = Self::default();
        map.update(id, status);
        map
    }

    /// OR `status` into the entry for `id`
    pub fn update(&mut self, id: RepoId, status: RepoStatus) {
        if status.is_empty() {
            return;
        }
        *self.statuses.entry(id).or_default() |= status;
    }

    /// Status of one repository; empty when unknown
    pub fn get(&self, id: RepoId) -> RepoStatus {
        self.statuses.get(&id).copied().unwrap_or_default()
    }

    /// Merge every entry of `other` into this map
    pub fn union(&mut self, other: &RepoStatusMap) {
        for (&id, &status) in &other.statuses {
            self.update(id, status);
        }
    }

    /// Number of repositories with a status
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// True when no repository has a status
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Entries ordered by repository id
    pub fn iter(&self) -> impl Iterator<Item = (RepoId, RepoStatus)> + '_ {
        self.statuses.iter().map(|(&id, &status)| (id, status))
    }

    /// Repositories that have every bit of `status` set
    pub fn filter(&self, status: RepoStatus) -> Vec<RepoId> {
        self.iter()
            .filter(|(_, s)| s.contains(status))
            .map(|(id, _)| id)
            .collect()
    }
}

/// Aggregated search statistics
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    /// Per-repository status
    pub status: RepoStatusMap,
    /// Some repository hit a result limit
    pub is_limit_hit: bool,
}

impl Stats {
    /// Fold another set of statistics into this one
    pub fn update(&mut self, other: &Stats) {
        self.status.union(&other.status);
        self.is_limit_hit |= other.is_limit_hit;
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && !self.is_limit_hit
    }
}

/// Classify the outcome of searching one repository.
///
/// Returns the statistics to record and, for outcomes that should fail the
/// whole search, the error.
pub fn classify_result(
    repo_revs: &RepositoryRevisions,
    limit_hit: bool,
    timed_out: bool,
    search_err: Option<Error>,
) -> (Stats, Option<Error>) {
    let mut status = RepoStatus::NONE;
    if limit_hit {
        status |= RepoStatus::LIMIT_HIT;
    }

    let mut fatal = None;
    match search_err {
        Some(Error::RepoNotFound {
            clone_in_progress, ..
        }) => {
            status |= if clone_in_progress {
                RepoStatus::CLONING
            } else {
                RepoStatus::MISSING
            };
        }
        // Without an explicit revision the repository is just empty.
        Some(err @ Error::RevisionNotFound { .. }) => {
            if !repo_revs.only_default_revision() {
                fatal = Some(err);
            }
        }
        Some(err) => match err.kind() {
            ErrorKind::NotFound => status |= RepoStatus::MISSING,
            _ if err.is_timeout() || err.is_temporary() || timed_out => {
                status |= RepoStatus::TIMEDOUT
            }
            _ => fatal = Some(err),
        },
        None if timed_out => status |= RepoStatus::TIMEDOUT,
        None => {}
    }

    let stats = Stats {
        status: RepoStatusMap::singleton(repo_revs.repo.id, status),
        is_limit_hit: limit_hit,
    };
    (stats, fatal)
}
