//! HTTP client for REST API communication.
//!
//! This module provides the [`HttpClient`] type, which sends JSON requests
//! to the configured base URL and retries 429 and 500 responses when the
//! request allows more than one try.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ClientConfig;

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for a REST API.
///
/// The client handles:
/// - URL construction from the base URL and base path
/// - Default headers including User-Agent and Accept
/// - Automatic retry logic for 429 and 500 responses
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use rest_model::{BaseUrl, ClientConfig, HttpClient, HttpMethod, HttpRequest};
///
/// let config = ClientConfig::builder()
///     .base_url(BaseUrl::new("https://api.example.com")?)
///     .build()?;
/// let client = HttpClient::new(&config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "users").build()?;
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    /// Base URI (e.g., `https://api.example.com`).
    base_uri: String,
    /// Base path (e.g., `/v1`), or empty.
    base_path: String,
    default_headers: HashMap<String, String>,
    tries: u32,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g. TLS initialization failure).
    pub fn new(config: &ClientConfig) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{user_agent_prefix}rest-model v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        for (name, value) in config.default_headers() {
            default_headers.insert(name.clone(), value.clone());
        }

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_uri: config.base_url().as_ref().to_string(),
            base_path: config.base_path().to_string(),
            default_headers,
            tries: config.tries(),
        })
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the base path for this client.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the number of tries applied to requests that ask for one.
    #[must_use]
    pub const fn default_tries(&self) -> u32 {
        self.tries
    }

    /// Sends an HTTP request.
    ///
    /// A request with `tries == 1` uses the client's configured tries.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}{}/{}", self.base_uri, self.base_path, request.path);
        let max_tries = if request.tries > 1 { request.tries } else { self.tries };

        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };
            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }
            if let Some(query) = &request.query {
                req_builder = req_builder.query(query);
            }
            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.to_string());
            }

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();
            let body = Self::parse_body(code, body_text);

            let response = HttpResponse::new(code, res_headers, body);

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = Self::serialize_error(&response);
            let error_reference = response.request_id().map(String::from);

            let should_retry = code == 429 || code == 500;
            if !should_retry || max_tries <= 1 {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference,
                }));
            }

            if tries >= max_tries {
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: max_tries,
                    message: error_message,
                    error_reference,
                }));
            }

            let delay = Self::calculate_retry_delay(&response, code);
            tracing::warn!(
                path = %request.path,
                status = code,
                attempt = tries,
                "Retrying request in {:?}",
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_body(code: u16, body_text: String) -> Value {
        if body_text.trim().is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(&body_text).unwrap_or_else(|_| {
            // Keep unparseable 5xx bodies for the error message
            if code >= 500 {
                serde_json::json!({ "raw_body": body_text })
            } else {
                serde_json::json!({})
            }
        })
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// 429 honors `Retry-After`; 500 always waits the fixed delay.
    fn calculate_retry_delay(response: &HttpResponse, status: u16) -> Duration {
        if status == 429 {
            if let Some(delay) = response
                .retry_request_after
                .and_then(|retry_after| Duration::try_from_secs_f64(retry_after).ok())
            {
                return delay;
            }
        }
        Duration::from_secs(RETRY_WAIT_TIME)
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for key in ["errors", "error", "error_description", "raw_body"] {
            if let Some(value) = response.body.get(key) {
                error_body.insert(key.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaseUrl;

    fn create_test_config() -> ClientConfig {
        ClientConfig::builder()
            .base_url(BaseUrl::new("https://api.example.com").unwrap())
            .base_path("/v1")
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_construction_from_config() {
        let client = HttpClient::new(&create_test_config()).unwrap();

        assert_eq!(client.base_uri(), "https://api.example.com");
        assert_eq!(client.base_path(), "/v1");
        assert_eq!(client.default_tries(), 1);
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = HttpClient::new(&create_test_config()).unwrap();

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("rest-model v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = ClientConfig::builder()
            .base_url(BaseUrl::new("https://api.example.com").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("MyApp/1.0 | "));
    }

    #[test]
    fn test_configured_headers_are_defaults() {
        let config = ClientConfig::builder()
            .base_url(BaseUrl::new("https://api.example.com").unwrap())
            .header("Authorization", "Bearer token")
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Bearer token".to_string())
        );
        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_serialize_error_collects_known_fields() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["abc-123".to_string()]);
        let response = HttpResponse::new(
            422,
            headers,
            serde_json::json!({"errors": {"name": ["is blank"]}, "other": 1}),
        );

        let message = HttpClient::serialize_error(&response);
        assert!(message.contains(r#""errors":{"name":["is blank"]}"#));
        assert!(message.contains("abc-123"));
        assert!(!message.contains("other"));
    }

    #[test]
    fn test_retry_delay_ignores_unusable_retry_after() {
        let with_retry_after = |value: f64| HttpResponse {
            code: 429,
            headers: HashMap::new(),
            body: serde_json::json!({}),
            retry_request_after: Some(value),
        };

        assert_eq!(
            HttpClient::calculate_retry_delay(&with_retry_after(2.5), 429),
            Duration::from_millis(2500)
        );
        for unusable in [-1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                HttpClient::calculate_retry_delay(&with_retry_after(unusable), 429),
                Duration::from_secs(RETRY_WAIT_TIME)
            );
        }
    }

    #[test]
    fn test_empty_body_decodes_to_empty_object() {
        assert_eq!(HttpClient::parse_body(204, String::new()), serde_json::json!({}));
        assert_eq!(
            HttpClient::parse_body(502, "Bad Gateway".to_string()),
            serde_json::json!({"raw_body": "Bad Gateway"})
        );
    }
}
