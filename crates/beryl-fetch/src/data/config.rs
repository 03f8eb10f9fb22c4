//! Resolved mirror and fallback-timeout settings.
//!
//! A [`MirrorConfig`] is built once per process from collaborator-supplied
//! key/value data and is read-only afterwards, so it can be shared across
//! concurrent fetch operations without locking.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::error::{FetchError, Result};

/// Duration substituted for the boolean-style `"true"` fallback marker.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(100);

const MIRROR_PREFIX: &str = "mirror.";
const FALLBACK_SUFFIX: &str = ".fallback_timeout";
const ALL_KEY: &str = "all";

/// Normalized `scheme://host:port` identity of a source URI.
///
/// Two sources are served by the same mirror entry exactly when their host
/// keys are equal; path and credentials never participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostKey(String);

impl HostKey {
    /// Derive the host key of `uri`, if it has a host at all.
    pub fn of(uri: &Url) -> Option<Self> {
        let host = uri.host_str()?.to_ascii_lowercase();
        let key = match uri.port_or_known_default() {
            Some(port) => format!("{}://{}:{}", uri.scheme(), host, port),
            None => format!("{}://{}", uri.scheme(), host),
        };
        Some(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fallback-timeout setting as configured, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTimeout {
    /// Explicitly disabled (`"false"`); shadows a global setting.
    Disabled,
    /// Boolean-style marker (`"true"`); resolves to [`DEFAULT_FALLBACK_TIMEOUT`].
    Enabled,
    /// Explicit deadline in seconds.
    Limit(Duration),
}

impl FallbackTimeout {
    /// The effective deadline, if fallback is enabled at all.
    pub fn limit(self) -> Option<Duration> {
        match self {
            FallbackTimeout::Disabled => None,
            FallbackTimeout::Enabled => Some(DEFAULT_FALLBACK_TIMEOUT),
            FallbackTimeout::Limit(limit) => Some(limit),
        }
    }

    fn parse(key: &str, value: &str) -> Result<Self> {
        match value.trim() {
            "true" => Ok(FallbackTimeout::Enabled),
            "false" => Ok(FallbackTimeout::Disabled),
            other => {
                let seconds: f64 = other.parse().map_err(|_| FetchError::Config {
                    key: key.to_string(),
                    reason: format!("expected \"true\", \"false\" or seconds, got {other:?}"),
                })?;
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(FetchError::Config {
                        key: key.to_string(),
                        reason: format!("fallback timeout must be positive, got {other:?}"),
                    });
                }
                Ok(FallbackTimeout::Limit(Duration::from_secs_f64(seconds)))
            }
        }
    }
}

/// Mirror settings for one host key (or for the global `all` entry).
///
/// Each field independently overrides the corresponding global field when
/// set; unset fields fall through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorEntry {
    pub mirror: Option<Url>,
    pub fallback_timeout: Option<FallbackTimeout>,
}

/// Immutable view of all mirror settings for one process invocation.
#[derive(Debug, Clone, Default)]
pub struct MirrorConfig {
    hosts: HashMap<HostKey, MirrorEntry>,
    all: MirrorEntry,
}

impl MirrorConfig {
    /// Build a config from plain key/value data.
    ///
    /// Recognized keys:
    /// - `mirror.<uri>` - mirror URI for the host of `<uri>`
    /// - `mirror.all` - global mirror URI (`all` is case-insensitive)
    /// - `mirror.<uri>.fallback_timeout` / `mirror.all.fallback_timeout` -
    ///   `"true"`, `"false"`, or seconds (integer or fractional)
    ///
    /// Keys outside the `mirror.` namespace are ignored; later pairs
    /// override earlier ones field-by-field. Malformed URIs or timeout
    /// values fail fast with [`FetchError::Config`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            config.apply(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let Some(rest) = key.strip_prefix(MIRROR_PREFIX) else {
            return Ok(());
        };
        if let Some(selector) = rest.strip_suffix(FALLBACK_SUFFIX) {
            let timeout = FallbackTimeout::parse(key, value)?;
            self.entry_mut(key, selector)?.fallback_timeout = Some(timeout);
        } else {
            let mirror = Url::parse(value).map_err(|e| FetchError::Config {
                key: key.to_string(),
                reason: format!("invalid mirror URI {value:?}: {e}"),
            })?;
            self.entry_mut(key, rest)?.mirror = Some(mirror);
        }
        Ok(())
    }

    fn entry_mut(&mut self, key: &str, selector: &str) -> Result<&mut MirrorEntry> {
        if selector.eq_ignore_ascii_case(ALL_KEY) {
            return Ok(&mut self.all);
        }
        let uri = Url::parse(selector).map_err(|e| FetchError::Config {
            key: key.to_string(),
            reason: format!("invalid source URI {selector:?}: {e}"),
        })?;
        let host = HostKey::of(&uri).ok_or_else(|| FetchError::Config {
            key: key.to_string(),
            reason: format!("source URI {selector:?} has no host"),
        })?;
        Ok(self.hosts.entry(host).or_default())
    }

    /// Host-specific entry applying to `source`, if any.
    pub fn host_entry(&self, source: &Url) -> Option<&MirrorEntry> {
        HostKey::of(source).and_then(|key| self.hosts.get(&key))
    }

    /// The distinguished global `all` entry.
    pub fn global_entry(&self) -> &MirrorEntry {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.all == MirrorEntry::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_host_key_normalizes_scheme_host_port() {
        let key = HostKey::of(&url("HTTP://RubyGems.ORG/specs")).unwrap();
        assert_eq!(key.as_str(), "http://rubygems.org:80");

        let explicit = HostKey::of(&url("http://127.0.0.1:9292/")).unwrap();
        assert_eq!(explicit.as_str(), "http://127.0.0.1:9292");
    }

    #[test]
    fn test_host_key_same_host_different_path() {
        let a = HostKey::of(&url("http://127.0.0.1:9292/")).unwrap();
        let b = HostKey::of(&url("http://127.0.0.1:9292/specs/latest")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_pairs_host_and_global() {
        let config = MirrorConfig::from_pairs([
            ("mirror.http://127.0.0.1:9292/", "http://mirror.example/"),
            ("mirror.http://127.0.0.1:9292/.fallback_timeout", "true"),
            ("mirror.all", "http://everywhere.example/"),
            ("mirror.ALL.fallback_timeout", "1"),
            ("unrelated.key", "ignored"),
        ])
        .unwrap();

        let host = config.host_entry(&url("http://127.0.0.1:9292/")).unwrap();
        assert_eq!(host.mirror, Some(url("http://mirror.example/")));
        assert_eq!(host.fallback_timeout, Some(FallbackTimeout::Enabled));

        let global = config.global_entry();
        assert_eq!(global.mirror, Some(url("http://everywhere.example/")));
        assert_eq!(
            global.fallback_timeout,
            Some(FallbackTimeout::Limit(Duration::from_secs(1)))
        );
    }

    #[test]
    fn test_fallback_timeout_values() {
        assert_eq!(
            FallbackTimeout::parse("k", "true").unwrap().limit(),
            Some(DEFAULT_FALLBACK_TIMEOUT)
        );
        assert_eq!(FallbackTimeout::parse("k", "false").unwrap().limit(), None);
        assert_eq!(
            FallbackTimeout::parse("k", "2").unwrap().limit(),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            FallbackTimeout::parse("k", "0.5").unwrap().limit(),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_malformed_values_fail_fast() {
        let bad_uri = MirrorConfig::from_pairs([("mirror.all", "not a uri")]);
        assert!(matches!(bad_uri, Err(FetchError::Config { .. })));

        let bad_timeout =
            MirrorConfig::from_pairs([("mirror.all.fallback_timeout", "soonish")]);
        assert!(matches!(bad_timeout, Err(FetchError::Config { .. })));

        let negative = MirrorConfig::from_pairs([("mirror.all.fallback_timeout", "-1")]);
        assert!(matches!(negative, Err(FetchError::Config { .. })));
    }

    #[test]
    fn test_later_pairs_override_field_by_field() {
        let config = MirrorConfig::from_pairs([
            ("mirror.all", "http://first.example/"),
            ("mirror.all.fallback_timeout", "true"),
            ("mirror.all", "http://second.example/"),
        ])
        .unwrap();
        let global = config.global_entry();
        assert_eq!(global.mirror, Some(url("http://second.example/")));
        assert_eq!(global.fallback_timeout, Some(FallbackTimeout::Enabled));
    }

    #[test]
    fn test_empty_config() {
        let config = MirrorConfig::from_pairs::<_, &str, &str>([]).unwrap();
        assert!(config.is_empty());
        assert!(config.host_entry(&url("http://rubygems.org/")).is_none());
    }
}
