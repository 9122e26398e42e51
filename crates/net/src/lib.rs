//! # Network Service
//!
//! Blocking HTTP(S) GET of markup documents. The response body is handed back
//! unread as a [`std::io::Read`] so the tokenizer can consume it while it
//! arrives. Transport problems are reported as [`NetworkError`] and never
//! mixed up with what the markup contains.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::redirect::Policy;
use serde::Deserialize;
use tracing::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum number of redirects to follow.
pub const MAX_REDIRECTS: usize = 20;

/// Default request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header value.
pub const USER_AGENT: &str = concat!("elemtree/", env!("CARGO_PKG_VERSION"));

/// Client settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header value.
    pub user_agent: String,
    /// Whole-request timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
    /// Redirect hops to follow before giving up.
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout_secs: TIMEOUT_SECS,
            max_redirects: MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

/// Network errors.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
    #[error("failed to set up HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl NetworkError {
    /// Whether the failure was the request running out of time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request { source, .. } | Self::Body { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Parse and check an absolute `http`/`https` URL.
pub fn parse_url(url: &str) -> Result<Url, NetworkError> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::UnsupportedScheme(other.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NetworkService
// ─────────────────────────────────────────────────────────────────────────────

/// A response whose body has not been read yet.
pub type Body = Response;

/// The network entry point: one configured client, reused for every fetch.
#[derive(Debug, Clone)]
pub struct NetworkService {
    client: Client,
    config: FetchConfig,
}

impl NetworkService {
    /// Create a network service with the given settings.
    pub fn new(config: FetchConfig) -> Result<Self, NetworkError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(NetworkError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url`. Only 2xx responses are returned.
    pub fn fetch(&self, url: &str) -> Result<Body, NetworkError> {
        let parsed = parse_url(url)?;
        debug!(%parsed, "fetching document");

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, "text/html, application/xhtml+xml, */*;q=0.8")
            .send()
            .map_err(|source| NetworkError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "non-success response");
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        info!(
            url,
            final_url = %response.url(),
            status = status.as_u16(),
            content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown"),
            "document response received"
        );
        Ok(response)
    }

    /// GET `url` and read the whole body as text, decoded per its charset.
    pub fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        self.fetch(url)?.text().map_err(|source| NetworkError::Body {
            url: url.to_string(),
            source,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
