//! HTTP transport for the weather feeds
//!
//! One `FeedClient` performs one GET per call and accumulates the response
//! body into a buffer sized to the actual payload. Retries are left to the
//! caller; every call carries its own deadline, which is the only time limit
//! applied to the request.

use std::time::Duration;

use tracing::{debug, warn};

use crate::endpoint::FeedUrls;
use crate::error::{Result, TransportFailure};

/// Default User-Agent sent with every request
const DEFAULT_USER_AGENT: &str = concat!("xoap-core/", env!("CARGO_PKG_VERSION"));

/// Upper bound on the initial body buffer taken from Content-Length
const MAX_PREALLOCATED_BODY: usize = 1 << 20;

/// Status and full body of one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FeedResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Configuration for the feed HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deadline in seconds for sessions that do not set their own (default: 30)
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Provider endpoint base URLs
    pub urls: FeedUrls,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            urls: FeedUrls::default(),
        }
    }
}

/// HTTP client for the TWCi and Weather Underground XML feeds
///
/// Owned by exactly one session, so sessions never share transport state.
#[derive(Debug)]
pub struct FeedClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    config: ClientConfig,
}

impl FeedClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(TransportFailure::from)?;

        Ok(Self { client, config })
    }

    /// Endpoint base URLs this client talks to.
    pub fn urls(&self) -> &FeedUrls {
        &self.config.urls
    }

    /// Deadline applied when the caller does not pass one.
    pub fn default_deadline(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Perform one GET round trip and return the status with the full body.
    ///
    /// A 4xx answer that still carries a body is handed back with its status:
    /// the provider reports its error envelopes that way, so only the caller
    /// can tell an envelope from any other error page. Any other non-success
    /// status is a transport failure.
    ///
    /// # Errors
    /// - `TransportFailure::Timeout` - `deadline` expired before the body was read
    /// - `TransportFailure::Status` - non-success status without a usable body
    /// - `TransportFailure::Request` - connection or read error
    pub async fn fetch_bytes(&self, url: &str, deadline: Duration) -> Result<FeedResponse> {
        match tokio::time::timeout(deadline, self.read_body(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?deadline, "request deadline expired");
                Err(TransportFailure::Timeout.into())
            }
        }
    }

    async fn read_body(&self, url: &str) -> Result<FeedResponse> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportFailure::from)?;
        let status = response.status();

        let capacity = response
            .content_length()
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0)
            .min(MAX_PREALLOCATED_BODY);
        let mut body = Vec::with_capacity(capacity);
        while let Some(chunk) = response.chunk().await.map_err(TransportFailure::from)? {
            body.extend_from_slice(&chunk);
        }

        if status.is_success() || (status.is_client_error() && !body.is_empty()) {
            debug!(status = status.as_u16(), bytes = body.len(), "response received");
            return Ok(FeedResponse {
                status: status.as_u16(),
                body,
            });
        }

        Err(TransportFailure::Status(status.as_u16()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("xoap-core/"));
        assert_eq!(config.urls, FeedUrls::default());
    }

    #[test]
    fn test_client_creation() {
        let client = FeedClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = ClientConfig {
            timeout_secs: 5,
            urls: FeedUrls::with_base("http://127.0.0.1:9"),
            ..ClientConfig::default()
        };
        let client = FeedClient::with_config(config).unwrap();
        assert_eq!(client.default_deadline(), Duration::from_secs(5));
        assert_eq!(client.urls().search, "http://127.0.0.1:9/search/search");
    }

    #[test]
    fn test_response_success_range() {
        let response = |status| FeedResponse {
            status,
            body: Vec::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(404).is_success());
        assert!(!response(301).is_success());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let client = FeedClient::new().unwrap();
        let result = client
            .fetch_bytes("http://127.0.0.1:9/nothing", Duration::from_secs(2))
            .await;
        assert!(matches!(
            result,
            Err(crate::error::XoapError::Transport(_))
        ));
    }
}
