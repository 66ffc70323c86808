//! Core type definitions for repository scope resolution

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric repository identity as assigned by the repository store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub i32);

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repository identity: id plus full name (e.g. `github.com/org/repo`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RepoName {
    /// Store-assigned id
    pub id: RepoId,
    /// Full repository name
    pub name: String,
}

impl RepoName {
    /// Create a repository identity
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id: RepoId(id),
            name: name.into(),
        }
    }
}

/// A revision to search within a repository.
///
/// Variant order is significant: the derived `Ord` is the canonical
/// specifier order used when intersected or clashing revision lists are
/// sorted. The default specifier sorts first, then exclusion ref globs,
/// then ref globs, then explicit revspecs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RevisionSpecifier {
    /// Default branch (an empty revspec)
    #[default]
    Default,
    /// Glob over refs to exclude (`*!refs/heads/dev/*`)
    ExcludeRefGlob(String),
    /// Glob over refs to include (`*refs/tags/*`)
    RefGlob(String),
    /// Explicit ref name or commit, possibly negated with a leading `^`
    RevSpec(String),
}

impl RevisionSpecifier {
    /// Explicit revspec; the empty string yields the default specifier
    pub fn rev(spec: impl Into<String>) -> Self {
        let spec = spec.into();
        if spec.is_empty() {
            Self::Default
        } else {
            Self::RevSpec(spec)
        }
    }

    /// Parse one `:`-separated part of a `name@revs` suffix
    pub fn parse(part: &str) -> Self {
        if let Some(glob) = part.strip_prefix("*!") {
            Self::ExcludeRefGlob(glob.to_string())
        } else if let Some(glob) = part.strip_prefix('*') {
            Self::RefGlob(glob.to_string())
        } else {
            Self::rev(part)
        }
    }

    /// The revspec text; empty for the default specifier and for globs
    #[inline]
    pub fn rev_spec(&self) -> &str {
        match self {
            Self::RevSpec(spec) => spec,
            _ => "",
        }
    }

    /// True for inclusion and exclusion ref globs
    #[inline]
    pub const fn is_glob(&self) -> bool {
        matches!(self, Self::RefGlob(_) | Self::ExcludeRefGlob(_))
    }

    /// True for the default-branch specifier
    #[inline]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for RevisionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => Ok(()),
            Self::ExcludeRefGlob(glob) => write!(f, "*!{}", glob),
            Self::RefGlob(glob) => write!(f, "*{}", glob),
            Self::RevSpec(spec) => f.write_str(spec),
        }
    }
}

impl From<RevisionSpecifier> for String {
    fn from(rev: RevisionSpecifier) -> Self {
        rev.to_string()
    }
}

impl From<String> for RevisionSpecifier {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// A repository and the revisions of it to search
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryRevisions {
    /// Repository identity
    pub repo: RepoName,
    /// Revisions to search, in request order
    pub revs: Vec<RevisionSpecifier>,
}

impl RepositoryRevisions {
    /// Create a repository/revisions pair
    pub fn new(repo: RepoName, revs: Vec<RevisionSpecifier>) -> Self {
        Self { repo, revs }
    }

    /// True when no revision or a single one without revspec text was requested
    pub fn only_default_revision(&self) -> bool {
        match self.revs.as_slice() {
            [] => true,
            [only] => only.rev_spec().is_empty(),
            _ => false,
        }
    }
}

/// Repositories excluded by default policy rather than by explicit patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExcludedRepos {
    /// Matching repositories left out because they are forks
    pub forks: usize,
    /// Matching repositories left out because they are archived
    pub archived: usize,
}

/// Final output of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Resolved {
    /// Validated repository/revision pairs, in listing order
    pub repo_revs: Vec<RepositoryRevisions>,
    /// Requested revisions that do not exist or clash
    pub missing_repo_revs: Vec<RepositoryRevisions>,
    /// Default-policy exclusion counters
    pub excluded_repos: ExcludedRepos,
    /// More repositories matched than the limit admits
    pub over_limit: bool,
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resolved{{RepoRevs={}, MissingRepoRevs={}, OverLimit={}, ExcludedRepos{{Forks:{}, Archived:{}}}}}",
            self.repo_revs.len(),
            self.missing_repo_revs.len(),
            self.over_limit,
            self.excluded_repos.forks,
            self.excluded_repos.archived
        )
    }
}

/// Tri-state value of `fork:` and `archived:` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNoOnly {
    /// Include alongside other repositories
    Yes,
    /// Exclude
    No,
    /// Include nothing else
    Only,
}

impl YesNoOnly {
    /// Parse `yes`, `no` or `only` (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Some(Self::Yes),
            "no" | "n" | "false" => Some(Self::No),
            "only" => Some(Self::Only),
            _ => None,
        }
    }
}

/// The parts of a parsed query the resolver inspects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Explicit `fork:` parameter
    pub fork: Option<YesNoOnly>,
    /// Explicit `archived:` parameter
    pub archived: Option<YesNoOnly>,
    /// Query contains `type:repo`
    pub type_repo: bool,
}

/// Query scoping input for one resolution call
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Include patterns, optionally suffixed with `@rev[:rev...]`
    pub repo_filters: Vec<String>,
    /// Exclude patterns
    pub minus_repo_filters: Vec<String>,
    /// Repo group names from user settings
    pub repo_group_filters: Vec<String>,
    /// Search context spec (`""`, `global`, `@user`, `@user/name`)
    pub search_context_spec: String,
    /// Version context name from site configuration
    pub version_context_name: String,
    /// User settings (repo groups)
    pub user_settings: Option<crate::config::Settings>,
    /// Leave forks out
    pub no_forks: bool,
    /// Only forks
    pub only_forks: bool,
    /// Leave archived repositories out
    pub no_archived: bool,
    /// Only archived repositories
    pub only_archived: bool,
    /// Keep only revisions with a commit after this threshold
    pub commit_after: Option<String>,
    /// Only private repositories
    pub only_private: bool,
    /// Only public repositories
    pub only_public: bool,
    /// Order results by rank
    pub ranked: bool,
    /// Maximum number of repositories; 0 means the configured limit
    pub limit: usize,
    /// Parsed query; `None` disables exclusion counting
    pub query: Option<QueryParams>,
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repo_filters.is_empty() {
            f.write_str("r=[]")?;
        }
        for (i, r) in self.repo_filters.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:?}", r)?;
        }

        if !self.minus_repo_filters.is_empty() {
            write!(f, " -r=[{}]", self.minus_repo_filters.join(" "))?;
        }
        if !self.repo_group_filters.is_empty() {
            write!(f, " groups=[{}]", self.repo_group_filters.join(" "))?;
        }
        if !self.version_context_name.is_empty() {
            write!(f, " versionContext={:?}", self.version_context_name)?;
        }
        if let Some(after) = &self.commit_after {
            write!(f, " CommitAfter={:?}", after)?;
        }

        let flags = [
            (self.no_forks, " NoForks"),
            (self.only_forks, " OnlyForks"),
            (self.no_archived, " NoArchived"),
            (self.only_archived, " OnlyArchived"),
            (self.only_private, " OnlyPrivate"),
            (self.only_public, " OnlyPublic"),
        ];
        for (set, name) in flags {
            if set {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

/// Field a repository listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoListOrder {
    /// Star count, descending, unset counts last
    StarsDescending,
}

/// Listing options passed to the repository store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReposListOptions {
    /// Every pattern must match the name (case-insensitive)
    pub include_patterns: Vec<String>,
    /// Restrict to exactly these names when non-empty
    pub names: Vec<String>,
    /// Names matching this pattern are dropped; empty means none
    pub exclude_pattern: String,
    /// Maximum number of names to return
    pub limit: Option<usize>,
    /// Drop forks
    pub no_forks: bool,
    /// Keep only forks
    pub only_forks: bool,
    /// Drop archived repositories
    pub no_archived: bool,
    /// Keep only archived repositories
    pub only_archived: bool,
    /// Drop private repositories
    pub no_private: bool,
    /// Keep only private repositories
    pub only_private: bool,
    /// Restrict to members of a persisted search context
    pub search_context_id: Option<i64>,
    /// Restrict to repositories in this user's namespace
    pub user_id: Option<i32>,
    /// Also include public repositories the user added
    pub include_user_public_repos: bool,
    /// Optional ordering
    pub order_by: Option<RepoListOrder>,
}

/// A resolved search context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchContext {
    /// Persisted id; 0 for auto-defined contexts
    pub id: i64,
    /// Context name (`global`, `@user`, `@user/name`)
    pub name: String,
    /// Owning user for namespace contexts; 0 otherwise
    pub namespace_user_id: i32,
}

impl SearchContext {
    /// The instance-wide context
    pub fn global() -> Self {
        Self {
            id: 0,
            name: "global".to_string(),
            namespace_user_id: 0,
        }
    }

    /// True for the instance-wide context
    #[inline]
    pub fn is_global(&self) -> bool {
        self.name == "global" || (self.id == 0 && self.namespace_user_id == 0)
    }

    /// Auto-defined contexts are not persisted and carry no revisions
    #[inline]
    pub fn is_auto_defined(&self) -> bool {
        self.id == 0
    }
}

/// Options for revision resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveRevisionOptions {
    /// Do not ask the backend to fetch the revision from the remote
    pub no_ensure_revision: bool,
}
