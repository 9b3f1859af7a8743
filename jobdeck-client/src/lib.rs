//! Jobdeck HTTP Client
//!
//! A type-safe HTTP client for the CI engine's JSON API.
//!
//! Every call resolves to one of three distinguishable outcomes besides
//! success: a network failure, a non-2xx status, or a 2xx body reporting
//! `success: false`. See [`ClientError`].
//!
//! # Example
//!
//! ```no_run
//! use jobdeck_client::CiClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CiClient::new("http://localhost:5000");
//!
//!     for job in client.list_jobs().await? {
//!         println!("{} ({} parameters)", job.name, job.parameters.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod executions;
mod gateway;
mod history;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use gateway::CiGateway;

use jobdeck_core::dto::envelope::{Envelope, ErrorBody};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the CI engine API
///
/// Endpoints are grouped into:
/// - Catalog reads (jobs, clusters)
/// - Trigger and test results
/// - Recent executions and job history
#[derive(Debug, Clone)]
pub struct CiClient {
    /// Base URL of the engine API (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl CiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the engine API (e.g., "http://localhost:5000")
    ///
    /// # Example
    /// ```
    /// use jobdeck_client::CiClient;
    ///
    /// let client = CiClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the engine API
    /// * `timeout` - Per-request network timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the engine API
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the engine API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from path segments
    ///
    /// Segments are percent-encoded, so job names containing spaces or
    /// slashes stay a single segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("bad base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest(format!("base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =============================================================================
    // Generic Calls
    // =============================================================================

    /// Issue a request and decode the JSON response
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `url` - Endpoint, usually from [`endpoint`](Self::endpoint)
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    /// The decoded body of a 2xx response
    pub async fn call<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Issue a request whose response is a `{success, message, data}` envelope
    ///
    /// `success: false` becomes [`ClientError::Application`] carrying the
    /// engine's message verbatim.
    pub async fn call_enveloped<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let envelope: Envelope<T> = self.call(method, url, body).await?;
        unwrap_envelope(envelope)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx statuses become [`ClientError::ApiError`], using the
    /// envelope's message when the body carries one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), error_message(&text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Convert an envelope into its payload
pub(crate) fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T> {
    if !envelope.success {
        return Err(ClientError::Application(
            envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Request rejected by the CI engine".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| ClientError::ParseError("successful response carried no data".to_string()))
}

/// Best-effort message from the body of a failed response
fn error_message(text: &str) -> String {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) if !message.is_empty() => message,
        _ if text.trim().is_empty() => "Unknown error".to_string(),
        _ => text.trim().to_string(),
    }
}
