//! Per-attempt records and terminal fetch results.

use std::fmt;

use url::Url;

use crate::data::index::SourceIndex;
use crate::error::FetchError;

/// Record of a single attempt against one target.
///
/// Created when the attempt is issued, completed with the error (if any)
/// once the attempt settles, and discarded after reporting.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub target: Url,
    pub number: u32,
    pub max: u32,
    pub error: Option<FetchError>,
}

impl FetchAttempt {
    pub fn new(target: Url, number: u32, max: u32) -> Self {
        Self {
            target,
            number,
            max,
            error: None,
        }
    }
}

/// Why and after how many attempts a fetch operation gave up.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub error: FetchError,
    pub attempts: u32,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The attempt count is context for callers; the message itself is
        // the already-formatted terminal error.
        self.error.fmt(f)
    }
}

impl std::error::Error for FetchFailure {}

/// Terminal result of one fetch operation, owned by the caller.
pub type FetchOutcome = std::result::Result<SourceIndex, FetchFailure>;
