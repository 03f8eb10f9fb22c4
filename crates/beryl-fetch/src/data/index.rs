//! Parsed spec index payloads.

use bytes::Bytes;
use semver::Version;
use serde::Deserialize;
use url::Url;

use crate::error::{FetchError, Result};

/// One spec row in a source index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecEntry {
    pub name: String,
    pub version: Version,
}

/// The decoded index payload of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIndex {
    specs: Vec<SpecEntry>,
}

impl SourceIndex {
    /// Decode an index body fetched from `uri`.
    ///
    /// The body must be a JSON array of `{ "name", "version" }` objects;
    /// anything else is a [`FetchError::Protocol`] and terminates the fetch
    /// without retries.
    pub fn parse(uri: &Url, body: &Bytes) -> Result<Self> {
        let specs = serde_json::from_slice(body).map_err(|e| FetchError::Protocol {
            uri: uri.clone(),
            detail: e.to_string(),
        })?;
        Ok(Self { specs })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// First spec with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&SpecEntry> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn specs(&self) -> &[SpecEntry] {
        &self.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("http://127.0.0.1:9292/").unwrap()
    }

    #[test]
    fn test_parse_index() {
        let body = Bytes::from_static(
            br#"[{"name":"weakling","version":"0.0.3"},{"name":"rack","version":"3.1.0"}]"#,
        );
        let index = SourceIndex::parse(&uri(), &body).unwrap();
        assert_eq!(index.len(), 2);
        let weakling = index.get("weakling").unwrap();
        assert_eq!(weakling.version, Version::new(0, 0, 3));
        assert!(index.get("nokogiri").is_none());
    }

    #[test]
    fn test_parse_empty_index() {
        let index = SourceIndex::parse(&uri(), &Bytes::from_static(b"[]")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_malformed_body_is_a_protocol_error() {
        let result = SourceIndex::parse(&uri(), &Bytes::from_static(b"<html>nope</html>"));
        let error = result.unwrap_err();
        assert!(matches!(error, FetchError::Protocol { .. }));
        assert!(!error.is_retryable());
    }
}
