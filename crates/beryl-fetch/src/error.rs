//! Error types for beryl-fetch.

use std::fmt;

use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Everything that can go wrong while fetching a source index.
///
/// The display of [`FetchError::Connection`] is the terminal-error line of
/// the output contract; downstream tooling parses it verbatim.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level refusal, unreachability or timeout. Retryable.
    #[error("Could not fetch specs from {uri} due to underlying error <{cause}>")]
    Connection { uri: Url, cause: String },

    /// The endpoint answered, but not with a usable index document.
    /// Terminates the fetch without consuming the remaining retry budget.
    #[error("Could not load spec index from {uri}: {detail}")]
    Protocol { uri: Url, detail: String },

    /// Malformed mirror or timeout configuration. Raised once, before any
    /// attempt is made.
    #[error("invalid setting {key}: {reason}")]
    Config { key: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Connection { .. } => ErrorKind::Connection,
            FetchError::Protocol { .. } => ErrorKind::Protocol,
            FetchError::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether the retry budget applies. Only connection failures count.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Connection { .. })
    }
}

/// Error classification names as they appear in retry-warning lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Protocol,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "ConnectionError"),
            ErrorKind::Protocol => write!(f, "ProtocolError"),
            ErrorKind::Config => write!(f, "ConfigError"),
        }
    }
}
