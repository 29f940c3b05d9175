// src/checker/http.rs
// =============================================================================
// This module checks if a single link is reachable by making one HTTP request.
//
// Key functionality:
// - Makes exactly one HTTP HEAD request (lightweight, no body download)
// - Bounds the whole request by a timeout (10 seconds by default)
// - Measures how long the request took, whatever the outcome
// - Classifies the outcome as online / offline / error
//
// There are no retries here. If a link is flaky, the next monitoring pass
// will find out.
//
// Rust concepts:
// - Traits: `Probe` lets the monitor work with any prober (tests use fakes)
// - async-trait: async functions inside a trait
// - Instant: a monotonic clock for measuring elapsed time
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::link::LinkStatus;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

// Anything that can check one URL and say how it went
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, url: &str) -> ProbeResult;
}

// Why a probe ended the way it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 2xx response
    Reachable(u16),
    /// A response came back but its status can't be trusted either way
    /// (a 3xx that survived the redirect policy). Counted as online.
    Unverifiable(u16),
    /// 4xx / 5xx response
    NonSuccess(u16),
    /// The timeout fired before any response
    Timeout,
    /// DNS, connection, TLS or redirect-loop failure
    Network(String),
}

impl ProbeOutcome {
    // Maps every outcome to exactly one of online / offline / error
    pub fn status(&self) -> LinkStatus {
        match self {
            ProbeOutcome::Reachable(_) | ProbeOutcome::Unverifiable(_) => LinkStatus::Online,
            ProbeOutcome::NonSuccess(_) => LinkStatus::Offline,
            ProbeOutcome::Timeout | ProbeOutcome::Network(_) => LinkStatus::Error,
        }
    }
}

// The result of probing a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub status: LinkStatus,
    /// Wall-clock milliseconds from sending the request to the outcome
    pub response_time_ms: u64,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(outcome: ProbeOutcome, elapsed: Duration) -> Self {
        ProbeResult {
            status: outcome.status(),
            response_time_ms: elapsed.as_millis().min(u64::MAX as u128) as u64,
            outcome,
        }
    }
}

// The real prober: HEAD requests over a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    // Builds a prober whose requests are cut off after `timeout`
    //
    // The client is created once and reused (connection pooling).
    // reqwest's timeout covers the whole request and drops the connection
    // when it fires, so a hung server doesn't leak a socket.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("link-sentinel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpProber { client })
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();
        let result = self.client.head(url).send().await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(response) => classify_response(response.status()),
            Err(e) => classify_error(&e),
        };

        debug!(url, ?outcome, elapsed_ms = elapsed.as_millis() as u64, "Probe finished");
        ProbeResult::new(outcome, elapsed)
    }
}

// Sorts a response status into an outcome
//
// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect we could not follow (no Location, or too many hops
//   already counted as an error by reqwest)
// - 400-599: Client or server error
fn classify_response(status: StatusCode) -> ProbeOutcome {
    let code = status.as_u16();
    if status.is_success() {
        ProbeOutcome::Reachable(code)
    } else if status.is_redirection() || status.is_informational() {
        ProbeOutcome::Unverifiable(code)
    } else {
        ProbeOutcome::NonSuccess(code)
    }
}

// Sorts a transport error into an outcome
fn classify_error(error: &reqwest::Error) -> ProbeOutcome {
    if error.is_timeout() {
        ProbeOutcome::Timeout
    } else if error.is_redirect() {
        ProbeOutcome::Network("Too many redirects".to_string())
    } else if error.is_connect() {
        ProbeOutcome::Network(format!("Connection failed: {}", error))
    } else {
        ProbeOutcome::Network(error.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD and not GET?
//    - HEAD asks for the headers only, the server sends no body
//    - We only care whether the link answers, not what it says
//
// 2. Why Instant and not Utc::now()?
//    - Instant is monotonic: it never jumps backwards if the system clock
//      is adjusted, so elapsed times can't go negative
//
// 3. Why a trait?
//    - The monitor only needs "something that probes"
//    - Tests hand it a scripted fake and never touch the network
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves a single canned response and reports the request line it saw
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 2048];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{}/health", addr), handle)
    }

    #[test]
    fn test_outcome_maps_to_one_status() {
        assert_eq!(ProbeOutcome::Reachable(200).status(), LinkStatus::Online);
        assert_eq!(ProbeOutcome::Unverifiable(304).status(), LinkStatus::Online);
        assert_eq!(ProbeOutcome::NonSuccess(503).status(), LinkStatus::Offline);
        assert_eq!(ProbeOutcome::Timeout.status(), LinkStatus::Error);
        assert_eq!(ProbeOutcome::Network("dns".into()).status(), LinkStatus::Error);
    }

    #[test]
    fn test_classify_response_codes() {
        assert_eq!(classify_response(StatusCode::NO_CONTENT), ProbeOutcome::Reachable(204));
        assert_eq!(classify_response(StatusCode::NOT_MODIFIED), ProbeOutcome::Unverifiable(304));
        assert_eq!(classify_response(StatusCode::NOT_FOUND), ProbeOutcome::NonSuccess(404));
        assert_eq!(classify_response(StatusCode::BAD_GATEWAY), ProbeOutcome::NonSuccess(502));
    }

    #[tokio::test]
    async fn test_probe_online_uses_head() {
        let (url, server) =
            serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let prober = HttpProber::new(DEFAULT_PROBE_TIMEOUT).unwrap();

        let result = prober.probe(&url).await;

        assert_eq!(result.status, LinkStatus::Online);
        assert_eq!(result.outcome, ProbeOutcome::Reachable(200));
        assert!(result.response_time_ms <= DEFAULT_PROBE_TIMEOUT.as_millis() as u64);
        assert!(server.await.unwrap().starts_with("HEAD /health"));
    }

    #[tokio::test]
    async fn test_probe_offline_on_server_error() {
        let (url, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let prober = HttpProber::new(DEFAULT_PROBE_TIMEOUT).unwrap();

        let result = prober.probe(&url).await;

        assert_eq!(result.status, LinkStatus::Offline);
        assert_eq!(result.outcome, ProbeOutcome::NonSuccess(503));
    }

    #[tokio::test]
    async fn test_probe_error_when_nothing_listens() {
        // Bind then drop to get a port that is very likely closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new(DEFAULT_PROBE_TIMEOUT).unwrap();
        let result = prober.probe(&format!("http://{}/", addr)).await;

        assert_eq!(result.status, LinkStatus::Error);
        assert!(matches!(result.outcome, ProbeOutcome::Network(_)));
    }

    #[tokio::test]
    async fn test_probe_times_out_and_reports_error() {
        // Accepts the connection but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let timeout = Duration::from_millis(300);
        let prober = HttpProber::new(timeout).unwrap();
        let result = prober.probe(&format!("http://{}/", addr)).await;

        assert_eq!(result.status, LinkStatus::Error);
        assert_eq!(result.outcome, ProbeOutcome::Timeout);
        assert!(result.response_time_ms >= 250);
        assert!(result.response_time_ms < 5_000);
    }
}
