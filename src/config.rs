//! Configuration for talking to the receipt API.
//!
//! Everything the HTTP layer needs lives in [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The defaults match the web upload form: a
//! fixed `http://localhost:8080` base URL and no timeout, so a call
//! waits until the server answers or the connection drops.

use crate::error::ReceiptError;
use serde::{Deserialize, Serialize};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for a [`crate::api::HttpReceiptApi`].
///
/// # Example
/// ```rust
/// use receipt_extract::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://receipts.internal:8080")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.request_timeout_secs, Some(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix of the API. Default: `http://localhost:8080`.
    ///
    /// Endpoint paths (`/api/receipts/...`) are appended to this, so a
    /// prefix such as `https://gateway/receipts-svc` is preserved.
    pub base_url: String,

    /// Whole-request timeout in seconds. Default: none.
    pub request_timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Default: none.
    pub connect_timeout_secs: Option<u64>,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parse and validate [`Self::base_url`].
    pub fn parsed_base_url(&self) -> Result<reqwest::Url, ReceiptError> {
        let url = reqwest::Url::parse(self.base_url.trim()).map_err(|e| {
            ReceiptError::InvalidConfig(format!("base URL '{}' is not a URL: {e}", self.base_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ReceiptError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ReceiptError::InvalidConfig(format!(
                "base URL '{}' cannot carry a path",
                self.base_url
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ReceiptError::InvalidConfig(format!(
                "base URL '{}' must not have a query or fragment",
                self.base_url
            )));
        }
        Ok(url)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// `0` means no timeout.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = (secs > 0).then_some(secs);
        self
    }

    /// `0` means no timeout.
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = (secs > 0).then_some(secs);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ReceiptError> {
        self.config.parsed_base_url()?;
        if self.config.user_agent.trim().is_empty() {
            return Err(ReceiptError::InvalidConfig(
                "user agent must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
