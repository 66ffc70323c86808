//! Error types for revscope-core

/// Result type alias for revscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for revscope operations
///
/// Backend errors are converted into one of these variants where they are
/// received; everything downstream matches on [`ErrorKind`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed client input (bad pattern, unknown version context)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The overall deadline for the operation passed
    #[error("context deadline exceeded: {0}")]
    Deadline(String),

    /// A revision resolved to something that is not a commit
    #[error("bad commit {spec}: {message}")]
    BadCommit {
        /// Revision specifier as requested
        spec: String,
        /// Backend diagnostic
        message: String,
    },

    /// The revision does not exist in the repository
    #[error("revision not found: {repo}@{spec}")]
    RevisionNotFound {
        /// Repository name
        repo: String,
        /// Revision specifier as requested
        spec: String,
    },

    /// The repository does not exist on the version-control backend
    #[error("repository does not exist: {repo}")]
    RepoNotFound {
        /// Repository name
        repo: String,
        /// A clone of the repository is currently in progress
        clone_in_progress: bool,
    },

    /// Generic not-found condition (search context, namespace, ...)
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation timed out
    #[error("timeout: {0}")]
    Timeout(String),

    /// A retriable failure
    #[error("temporary failure: {0}")]
    Temporary(String),

    /// Git operation error
    #[error("Git error: {0}")]
    Git(String),

    /// Ref glob compilation error
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// HTTP/API error
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Runtime error (Tokio, threading, etc.)
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(String),

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::Git(err.message().to_string())
    }
}

impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::BadRequest(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::Http(err.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Error::Deadline(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Runtime(format!("Task join error: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err.to_string())
    }
}

/// Fieldless error category for zero-cost pattern matching.
///
/// Single byte representation (`#[repr(u8)]`), `Copy`, no allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// Malformed client input
    BadRequest,
    /// Configuration error
    Config,
    /// Deadline exceeded
    Deadline,
    /// Revision is not a commit
    BadCommit,
    /// Revision does not exist
    RevisionNotFound,
    /// Repository does not exist
    RepoNotFound,
    /// Generic not-found
    NotFound,
    /// Timeout
    Timeout,
    /// Retriable failure
    Temporary,
    /// Git operation error
    Git,
    /// Ref glob error
    Pattern,
    /// HTTP/API error
    Http,
    /// I/O operation error
    Io,
    /// Runtime error
    Runtime,
    /// YAML parsing error
    Yaml,
    /// JSON parsing error
    Json,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind without allocating
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::Config(_) => ErrorKind::Config,
            Error::Deadline(_) => ErrorKind::Deadline,
            Error::BadCommit { .. } => ErrorKind::BadCommit,
            Error::RevisionNotFound { .. } => ErrorKind::RevisionNotFound,
            Error::RepoNotFound { .. } => ErrorKind::RepoNotFound,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Temporary(_) => ErrorKind::Temporary,
            Error::Git(_) => ErrorKind::Git,
            Error::Pattern(_) => ErrorKind::Pattern,
            Error::Http(_) => ErrorKind::Http,
            Error::Io(_) => ErrorKind::Io,
            Error::Runtime(_) => ErrorKind::Runtime,
            Error::Yaml(_) => ErrorKind::Yaml,
            Error::Json(_) => ErrorKind::Json,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Borrow the error message
    #[inline]
    pub fn message(&self) -> &str {
        match self {
            Error::BadRequest(msg)
            | Error::Config(msg)
            | Error::Deadline(msg)
            | Error::NotFound(msg)
            | Error::Timeout(msg)
            | Error::Temporary(msg)
            | Error::Git(msg)
            | Error::Pattern(msg)
            | Error::Http(msg)
            | Error::Runtime(msg)
            | Error::Yaml(msg)
            | Error::Json(msg)
            | Error::Other(msg) => msg,
            Error::BadCommit { message, .. } => message,
            Error::RevisionNotFound { spec, .. } => spec,
            Error::RepoNotFound { repo, .. } => repo,
            Error::Io(_) => "I/O error",
        }
    }

    /// True for request-rejection errors that must never be retried.
    #[inline]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self.kind(), ErrorKind::BadRequest)
    }

    /// True for deadline and timeout conditions.
    #[inline]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind(), ErrorKind::Deadline | ErrorKind::Timeout)
    }

    /// True for retriable failures.
    #[inline]
    pub const fn is_temporary(&self) -> bool {
        matches!(self.kind(), ErrorKind::Temporary)
    }

    /// Prefix the message of a message-bearing variant, keeping its kind.
    pub fn with_context(self, prefix: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", prefix, msg);
        match self {
            Error::BadRequest(msg) => Error::BadRequest(wrap(msg)),
            Error::Config(msg) => Error::Config(wrap(msg)),
            Error::Deadline(msg) => Error::Deadline(wrap(msg)),
            Error::NotFound(msg) => Error::NotFound(wrap(msg)),
            Error::Timeout(msg) => Error::Timeout(wrap(msg)),
            Error::Temporary(msg) => Error::Temporary(wrap(msg)),
            Error::Git(msg) => Error::Git(wrap(msg)),
            Error::Pattern(msg) => Error::Pattern(wrap(msg)),
            Error::Http(msg) => Error::Http(wrap(msg)),
            Error::Runtime(msg) => Error::Runtime(wrap(msg)),
            Error::Yaml(msg) => Error::Yaml(wrap(msg)),
            Error::Json(msg) => Error::Json(wrap(msg)),
            Error::Other(msg) => Error::Other(wrap(msg)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_is_copy() {
        let err = Error::Git("test".to_string());
        let k = err.kind();
        let k2 = k;
        assert_eq!(k, k2);
    }

    #[test]
    fn test_error_kind_repr_u8() {
        assert_eq!(std::mem::size_of::<ErrorKind>(), 1);
    }

    #[test]
    fn test_error_message_borrows() {
        let err = Error::Config("bad config".to_string());
        let msg: &str = err.message();
        assert_eq!(msg, "bad config");
    }

    #[test]
    fn test_all_error_variants_have_kind() {
        let cases: Vec<(Error, ErrorKind)> = vec![
            (Error::BadRequest("b".into()), ErrorKind::BadRequest),
            (Error::Config("c".into()), ErrorKind::Config),
            (Error::Deadline("d".into()), ErrorKind::Deadline),
            (
                Error::BadCommit {
                    spec: "s".into(),
                    message: "m".into(),
                },
                ErrorKind::BadCommit,
            ),
            (
                Error::RevisionNotFound {
                    repo: "r".into(),
                    spec: "s".into(),
                },
                ErrorKind::RevisionNotFound,
            ),
            (
                Error::RepoNotFound {
                    repo: "r".into(),
                    clone_in_progress: false,
                },
                ErrorKind::RepoNotFound,
            ),
            (Error::NotFound("n".into()), ErrorKind::NotFound),
            (Error::Timeout("t".into()), ErrorKind::Timeout),
            (Error::Temporary("t".into()), ErrorKind::Temporary),
            (Error::Git("g".into()), ErrorKind::Git),
            (Error::Pattern("p".into()), ErrorKind::Pattern),
            (Error::Http("h".into()), ErrorKind::Http),
            (Error::Io(std::io::Error::other("io")), ErrorKind::Io),
            (Error::Runtime("r".into()), ErrorKind::Runtime),
            (Error::Yaml("y".into()), ErrorKind::Yaml),
            (Error::Json("j".into()), ErrorKind::Json),
            (Error::Other("o".into()), ErrorKind::Other),
        ];

        for (err, expected_kind) in cases {
            assert_eq!(err.kind(), expected_kind, "Mismatch for {:?}", err);
        }
    }

    #[test]
    fn test_bad_request_display_carries_diagnostic() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(err.is_bad_request());
        assert!(err.to_string().starts_with("bad request: "));
    }

    #[test]
    fn test_timeout_classification() {
        assert!(Error::Deadline("d".into()).is_timeout());
        assert!(Error::Timeout("t".into()).is_timeout());
        assert!(!Error::Temporary("t".into()).is_timeout());
        assert!(Error::Temporary("t".into()).is_temporary());
    }

    #[test]
    fn test_with_context_keeps_kind() {
        let err = Error::Deadline("zoekt list".into()).with_context("getting list of default repos");
        assert_eq!(err.kind(), ErrorKind::Deadline);
        assert_eq!(err.message(), "getting list of default repos: zoekt list");

        let err = Error::RevisionNotFound {
            repo: "r".into(),
            spec: "s".into(),
        }
        .with_context("ignored");
        assert_eq!(err.message(), "s");
    }
}
