//! Fetch orchestration: bounded retries and the mirror fallback race.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;
use url::Url;

use crate::core::report;
use crate::core::resolve::{Resolution, resolve};
use crate::core::retry::{DEFAULT_MAX_ATTEMPTS, RetrySchedule, Verdict};
use crate::data::config::MirrorConfig;
use crate::data::index::SourceIndex;
use crate::data::outcome::{FetchAttempt, FetchFailure, FetchOutcome};
use crate::effects::http::{HttpClient, TransportError};
use crate::effects::sink::ReportSink;
use crate::error::FetchError;

/// Retries one target up to a fixed attempt budget, reporting progress and
/// retry warnings as it goes. Stateless between calls; every fetch gets a
/// fresh schedule.
pub struct RetryingFetcher<'a, C: HttpClient> {
    client: &'a C,
    sink: &'a dyn ReportSink,
    max_attempts: u32,
}

impl<'a, C: HttpClient> RetryingFetcher<'a, C> {
    pub fn new(client: &'a C, sink: &'a dyn ReportSink, max_attempts: u32) -> Self {
        Self {
            client,
            sink,
            max_attempts,
        }
    }

    /// Fetch `target`, retrying connection failures back-to-back until the
    /// attempt budget is spent.
    ///
    /// Emits the one progress line for the operation, a numbered retry
    /// warning before each attempt after the first, and the terminal error
    /// line when the fetch gives up. Malformed responses terminate
    /// immediately without consuming the remaining budget.
    pub async fn fetch(&self, target: &Url) -> FetchOutcome {
        self.sink.progress(&report::fetching_source_index(target));

        let mut schedule = RetrySchedule::new(self.max_attempts);
        loop {
            let mut attempt =
                FetchAttempt::new(target.clone(), schedule.attempt(), schedule.max());
            let outcome = self.request(target).await;
            if let Err(error) = &outcome {
                attempt.error = Some(error.clone());
            }
            record(&attempt);

            match outcome {
                Ok(index) => return Ok(index),
                Err(error) if error.is_retryable() => match schedule.on_failure() {
                    Verdict::Retry { next } => {
                        self.sink
                            .warning(&report::retry_warning(next, schedule.max(), &error));
                    }
                    Verdict::Exhausted => {
                        self.sink.error(&report::terminal_error(&error));
                        return Err(FetchFailure {
                            error,
                            attempts: schedule.attempt(),
                        });
                    }
                },
                Err(error) => {
                    self.sink.error(&report::terminal_error(&error));
                    return Err(FetchFailure {
                        error,
                        attempts: schedule.attempt(),
                    });
                }
            }
        }
    }

    async fn request(&self, target: &Url) -> Result<SourceIndex, FetchError> {
        match self.client.fetch_index(target).await {
            Ok(body) => SourceIndex::parse(target, &body),
            Err(TransportError::Connect(cause)) => Err(FetchError::Connection {
                uri: target.clone(),
                cause,
            }),
            Err(TransportError::Protocol(detail)) => Err(FetchError::Protocol {
                uri: target.clone(),
                detail,
            }),
        }
    }
}

fn record(attempt: &FetchAttempt) {
    match &attempt.error {
        Some(error) => debug!(
            uri = %attempt.target,
            number = attempt.number,
            max = attempt.max,
            %error,
            "fetch attempt failed"
        ),
        None => debug!(
            uri = %attempt.target,
            number = attempt.number,
            max = attempt.max,
            "fetch attempt succeeded"
        ),
    }
}

/// Composes mirror resolution, the fallback race and retrying fetches into
/// the single operation the installer invokes.
///
/// One instance serves any number of concurrent `fetch` calls; the mirror
/// configuration is read-only and no state is retained between calls.
pub struct IndexFetcher<C: HttpClient> {
    client: C,
    config: MirrorConfig,
    sink: Arc<dyn ReportSink>,
    max_attempts: u32,
}

impl<C: HttpClient> IndexFetcher<C> {
    pub fn new(client: C, config: MirrorConfig, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            client,
            config,
            sink,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the per-target attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Fetch the spec index for `source`, honoring mirror configuration.
    ///
    /// With a fallback timeout resolved, an unresponsive mirror is
    /// silently abandoned and the original source is fetched through a
    /// fresh retry budget; no report line ever references the mirror.
    pub async fn fetch(&self, source: &Url) -> FetchOutcome {
        let Resolution {
            target,
            fallback_timeout,
        } = resolve(source, &self.config);
        let fetcher = RetryingFetcher::new(&self.client, self.sink.as_ref(), self.max_attempts);

        match fallback_timeout {
            Some(deadline) if target != *source => {
                if self.mirror_responds(&target, deadline).await {
                    fetcher.fetch(&target).await
                } else {
                    debug!(
                        mirror = %target,
                        source = %source,
                        "mirror not responding, falling back to source"
                    );
                    fetcher.fetch(source).await
                }
            }
            _ => fetcher.fetch(&target).await,
        }
    }

    /// Race a connectivity probe of the mirror against the fallback
    /// deadline. The probe emits no reports on either channel; dropping
    /// the timed-out future discards any late result.
    async fn mirror_responds(&self, mirror: &Url, deadline: Duration) -> bool {
        match timeout(deadline, self.client.probe(mirror)).await {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                debug!(mirror = %mirror, %error, "mirror probe failed");
                false
            }
            Err(_) => {
                debug!(mirror = %mirror, ?deadline, "mirror probe timed out");
                false
            }
        }
    }
}
