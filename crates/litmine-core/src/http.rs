//! Blocking HTTP JSON fetch over a shared async client.
//!
//! Uses async reqwest internally with tokio::time::timeout per request,
//! but presents a sync interface: harvesting is single-threaded and each
//! page fetch blocks until response or timeout.

use std::io;
use std::sync::LazyLock;
use std::time::Duration;

use serde_json::Value;

/// Connect timeout, separate from the per-request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error from one page fetch.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O error (includes request timeout)
    Io(io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// HTTP 429 gets its own, longer cooldown; everything else is retried
    /// on the shorter transient delay.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Http {
                status: Some(429),
                ..
            }
        )
    }
}

impl From<io::Error> for FetchError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// One GET request returning the response body as parsed JSON.
///
/// Non-2xx statuses become `FetchError::Http` carrying the status (429
/// included, so callers can apply the rate-limit cooldown). A body that
/// is not valid JSON is an `Http` error without a status.
pub fn get_json(
    url: &str,
    params: &[(&str, String)],
    user_agent: &str,
    timeout: Duration,
) -> Result<Value, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let request = async {
            let resp = SHARED_CLIENT
                .get(url)
                .query(params)
                .header(reqwest::header::USER_AGENT, user_agent)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Http {
                    status: Some(status.as_u16()),
                    message: format!("request to {url} failed"),
                });
            }

            let body = resp.text().await.map_err(|e| FetchError::from_reqwest(&e))?;
            serde_json::from_str(&body).map_err(|e| FetchError::Http {
                status: None,
                message: format!("invalid JSON body: {e}"),
            })
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("request timed out after {}s", timeout.as_secs()),
            ))),
        }
    })
}
