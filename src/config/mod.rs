//! Client configuration.
//!
//! - [`ClientConfig`]: settings shared by every request a client sends
//! - [`ClientConfigBuilder`]: a builder for [`ClientConfig`]
//! - [`BaseUrl`]: a validated API base URL
//!
//! # Example
//!
//! ```rust
//! use rest_model::{BaseUrl, ClientConfig};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com").unwrap())
//!     .base_path("/v1")
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_path(), "/v1");
//! ```

mod newtypes;

pub use newtypes::BaseUrl;

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for HTTP clients.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: BaseUrl,
    base_path: String,
    user_agent_prefix: Option<String>,
    default_headers: HashMap<String, String>,
    timeout: Option<Duration>,
    tries: u32,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the path prefix for every request (e.g. `/v1`), or `""`.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns extra headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns how many times a request is tried on 429 and 500 responses.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `base_url` is required.
///
/// # Defaults
///
/// - `base_path`: `""`
/// - `user_agent_prefix`: `None`
/// - `default_headers`: empty
/// - `timeout`: `None` (no timeout)
/// - `tries`: `1` (no retries)
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<BaseUrl>,
    base_path: Option<String>,
    user_agent_prefix: Option<String>,
    default_headers: HashMap<String, String>,
    timeout: Option<Duration>,
    tries: Option<u32>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets a path prefix for every request.
    ///
    /// A leading slash is added and trailing slashes are removed.
    #[must_use]
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times a request is tried on 429 and 500 responses.
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let base_path = self
            .base_path
            .map(|path| path.trim().trim_matches('/').to_string())
            .filter(|path| !path.is_empty())
            .map_or_else(String::new, |path| format!("/{path}"));

        Ok(ClientConfig {
            base_url,
            base_path,
            user_agent_prefix: self.user_agent_prefix,
            default_headers: self.default_headers,
            timeout: self.timeout,
            tries: self.tries.unwrap_or(1).max(1),
        })
    }
}
