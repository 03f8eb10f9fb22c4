//! Mirror-aware fetching of package source indexes.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and payload types
//! - [`core`] - Pure transformations (resolution, retry bookkeeping, report lines)
//! - [`effects`] - I/O operations with trait abstraction
//!
//! # Key Behaviors
//!
//! - **Mirror resolution**: per-host settings override the global `all` entry
//!   field-by-field; without a configured mirror the source itself is fetched
//! - **Bounded retries**: connection failures against one target are retried
//!   back-to-back up to a fixed budget, with numbered retry warnings
//! - **Silent fallback**: with a fallback timeout configured, an unresponsive
//!   mirror is abandoned for the original source without surfacing an error

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::resolve::{Resolution, resolve};
pub use crate::core::retry::{DEFAULT_MAX_ATTEMPTS, RetrySchedule, Verdict};
pub use data::config::{
    DEFAULT_FALLBACK_TIMEOUT, FallbackTimeout, HostKey, MirrorConfig, MirrorEntry,
};
pub use data::index::{SourceIndex, SpecEntry};
pub use data::outcome::{FetchAttempt, FetchFailure, FetchOutcome};
pub use effects::fetcher::{IndexFetcher, RetryingFetcher};
pub use effects::http::{HttpClient, INDEX_PATH, TransportError};
pub use effects::sink::{Channel, ConsoleSink, MemorySink, ReportSink};

#[cfg(feature = "reqwest")]
pub use effects::http::ReqwestClient;

pub use error::{ErrorKind, FetchError, Result};
