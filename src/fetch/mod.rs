//! Two-tier resilient fetching.
//!
//! Every document is requested from a primary URI first. If that attempt
//! times out or fails at the transport level, the request is retried exactly
//! once against the endpoint's fallback with the same per-attempt timeout.
//! There is no further retry and no backoff.

mod http;
#[cfg(any(test, feature = "test-util"))]
mod mock;

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Attempt, FetchError, FetchFailure};

pub use http::HttpTransport;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{Route, ScriptedTransport};

/// Timeout applied to each individual attempt.
pub const FETCH_TIMEOUT: Duration = Duration::from_millis(3000);

/// A raw HTTP response as seen by the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_encoding: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Byte-fetch primitive the catalog is built on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET and reads the full body.
    async fn get(&self, uri: &Url) -> Result<Response, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub primary: Url,
    pub fallback: Option<Url>,
}

impl Endpoint {
    pub fn new(primary: Url, fallback: Url) -> Self {
        Self {
            primary,
            fallback: Some(fallback),
        }
    }

    pub fn single(primary: Url) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }
}

/// A successfully fetched document, still in its transfer encoding.
#[derive(Debug, Clone)]
pub struct Payload {
    pub served_by: Attempt,
    pub uri: Url,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

/// Fetches `endpoint`, falling back once on timeout or transport failure.
///
/// A cancellation of `cancel` aborts the current attempt immediately and is
/// never retried.
pub async fn fetch(
    transport: &dyn Transport,
    endpoint: &Endpoint,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Payload, FetchError> {
    let primary = &endpoint.primary;
    let failure = match attempt(transport, primary, timeout, cancel).await {
        Ok(response) => return Ok(payload(Attempt::Primary, primary, response)),
        Err(failure) => failure,
    };

    let fallback = match &endpoint.fallback {
        Some(fallback) if failure != FetchFailure::Cancelled => fallback,
        _ => {
            return Err(FetchError {
                attempt: Attempt::Primary,
                uri: primary.clone(),
                failure,
            })
        }
    };

    warn!(%primary, %fallback, "Primary request failed ({}), trying fallback", failure);
    attempt(transport, fallback, timeout, cancel)
        .await
        .map(|response| payload(Attempt::Fallback, fallback, response))
        .map_err(|failure| FetchError {
            attempt: Attempt::Fallback,
            uri: fallback.clone(),
            failure,
        })
}

async fn attempt(
    transport: &dyn Transport,
    uri: &Url,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Response, FetchFailure> {
    debug!(%uri, "Requesting");
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
        result = tokio::time::timeout(timeout, transport.get(uri)) => result
            .map_err(|_| FetchFailure::Timeout(timeout))?
            .map_err(|e| FetchFailure::Transport(e.0))?,
    };
    if !response.is_success() {
        return Err(FetchFailure::Status(response.status));
    }
    debug!(%uri, bytes = response.body.len(), "Received response");
    Ok(response)
}

fn payload(served_by: Attempt, uri: &Url, response: Response) -> Payload {
    Payload {
        served_by,
        uri: uri.clone(),
        content_encoding: response.content_encoding,
        body: response.body,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(100);

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn endpoint() -> Endpoint {
        Endpoint::new(
            url("https://primary.example/ModLinks.xml"),
            url("https://mirror.example/ModLinks.xml"),
        )
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let transport = ScriptedTransport::new()
            .respond("https://primary.example/ModLinks.xml", "primary")
            .respond("https://mirror.example/ModLinks.xml", "mirror");

        let payload = fetch(&transport, &endpoint(), TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(payload.served_by, Attempt::Primary);
        assert_eq!(payload.body, b"primary");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn hanging_primary_falls_back_within_two_timeouts() {
        let transport = ScriptedTransport::new()
            .hang("https://primary.example/ModLinks.xml")
            .respond("https://mirror.example/ModLinks.xml", "mirror");

        let started = Instant::now();
        let payload = fetch(&transport, &endpoint(), TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(payload.served_by, Attempt::Fallback);
        assert_eq!(payload.body, b"mirror");
        assert!(started.elapsed() < TIMEOUT * 2);
    }

    #[tokio::test]
    async fn transport_failure_and_bad_status_fall_back() {
        for transport in [
            ScriptedTransport::new().fail("https://primary.example/ModLinks.xml", "connection refused"),
            ScriptedTransport::new().route(
                "https://primary.example/ModLinks.xml",
                Route::Respond {
                    response: Response {
                        status: 502,
                        ..Response::default()
                    },
                    delay: Duration::ZERO,
                },
            ),
        ] {
            let transport = transport.respond("https://mirror.example/ModLinks.xml", "mirror");
            let payload = fetch(&transport, &endpoint(), TIMEOUT, &CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(payload.served_by, Attempt::Fallback);
        }
    }

    #[tokio::test]
    async fn fallback_failure_is_terminal() {
        let transport = ScriptedTransport::new()
            .fail("https://primary.example/ModLinks.xml", "dns failure")
            .hang("https://mirror.example/ModLinks.xml");

        let err = fetch(&transport, &endpoint(), TIMEOUT, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.attempt, Attempt::Fallback);
        assert_eq!(err.uri, url("https://mirror.example/ModLinks.xml"));
        assert_eq!(err.failure, FetchFailure::Timeout(TIMEOUT));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn without_fallback_primary_failure_is_terminal() {
        let transport =
            ScriptedTransport::new().fail("https://primary.example/ModLinks.xml", "reset");
        let endpoint = Endpoint::single(url("https://primary.example/ModLinks.xml"));

        let err = fetch(&transport, &endpoint, TIMEOUT, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.attempt, Attempt::Primary);
        assert_eq!(err.failure, FetchFailure::Transport("reset".into()));
    }

    #[tokio::test]
    async fn cancellation_aborts_without_retry() {
        let transport = ScriptedTransport::new()
            .hang("https://primary.example/ModLinks.xml")
            .respond("https://mirror.example/ModLinks.xml", "mirror");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetch(&transport, &endpoint(), Duration::from_secs(30), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.failure, FetchFailure::Cancelled);
        assert_eq!(err.attempt, Attempt::Primary);
        assert!(transport.requests().len() <= 1);
    }
}
