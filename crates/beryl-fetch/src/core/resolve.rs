//! Mirror resolution: which URI to fetch, under which fallback deadline.

use std::time::Duration;

use url::Url;

use crate::data::config::{FallbackTimeout, MirrorConfig};

/// Effective fetch target for one declared source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: Url,
    pub fallback_timeout: Option<Duration>,
}

/// Pure configuration arithmetic, idempotent and side-effect free.
///
/// The host-specific entry's fields each independently override the global
/// `all` entry; unset fields fall through. Without a merged mirror URI the
/// source itself is the target and no fallback deadline applies, even when
/// a timeout is configured.
pub fn resolve(source: &Url, config: &MirrorConfig) -> Resolution {
    let host = config.host_entry(source);
    let global = config.global_entry();

    let mirror = host
        .and_then(|entry| entry.mirror.as_ref())
        .or(global.mirror.as_ref());
    let timeout = host
        .and_then(|entry| entry.fallback_timeout)
        .or(global.fallback_timeout);

    match mirror {
        Some(mirror) => Resolution {
            target: mirror.clone(),
            fallback_timeout: timeout.and_then(FallbackTimeout::limit),
        },
        None => Resolution {
            target: source.clone(),
            fallback_timeout: None,
        },
    }
}
