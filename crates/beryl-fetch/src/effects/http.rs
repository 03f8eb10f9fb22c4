//! HTTP transport seam.

use std::future::Future;

use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Path of the index document relative to a source URI.
pub const INDEX_PATH: &str = "specs.json";

/// Why a transport attempt failed, pre-classified for retry purposes.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Refused, unreachable or timed-out connection. Retryable upstream.
    #[error("{0}")]
    Connect(String),

    /// The endpoint answered, but not with a usable response.
    #[error("{0}")]
    Protocol(String),
}

/// Minimal client surface the fetcher needs.
///
/// Implementations own redirect handling and per-request timeouts.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// GET the spec index document below `uri` and return its body.
    fn fetch_index(
        &self,
        uri: &Url,
    ) -> impl Future<Output = Result<Bytes, TransportError>> + Send;

    /// Cheap connectivity check against `uri`'s host.
    ///
    /// Resolves as soon as a connection is established; no request is
    /// issued and nothing is reported. Callers race this against a
    /// deadline and drop the future when it loses.
    fn probe(&self, uri: &Url) -> impl Future<Output = Result<(), TransportError>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use tokio::net::TcpStream;

    use super::*;

    const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Production HTTP client backed by reqwest. Probes with a raw TCP
    /// connect, so a mirror only counts as responsive once its socket
    /// accepts.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        async fn fetch_index(&self, uri: &Url) -> Result<Bytes, TransportError> {
            let endpoint = uri.join(INDEX_PATH).map_err(|e| {
                TransportError::Protocol(format!("cannot derive index URL from {uri}: {e}"))
            })?;
            let response = self.client.get(endpoint).send().await.map_err(classify)?;
            let response = response.error_for_status().map_err(classify)?;
            response.bytes().await.map_err(classify)
        }

        async fn probe(&self, uri: &Url) -> Result<(), TransportError> {
            let host = uri
                .host_str()
                .ok_or_else(|| TransportError::Protocol(format!("no host in {uri}")))?;
            let port = uri
                .port_or_known_default()
                .ok_or_else(|| TransportError::Protocol(format!("no port for {uri}")))?;
            TcpStream::connect((host, port))
                .await
                .map(drop)
                .map_err(|e| TransportError::Connect(e.to_string()))
        }
    }

    fn classify(error: reqwest::Error) -> TransportError {
        if error.is_connect() || error.is_timeout() {
            TransportError::Connect(error_chain(&error))
        } else {
            TransportError::Protocol(error_chain(&error))
        }
    }

    /// Join the full source chain so the innermost OS-level cause stays
    /// visible in reports.
    fn error_chain(error: &dyn std::error::Error) -> String {
        let mut line = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            line.push_str(": ");
            line.push_str(&cause.to_string());
            source = cause.source();
        }
        line
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
