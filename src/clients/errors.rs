//! HTTP error types.
//!
//! - [`HttpResponseError`]: a non-2xx response
//! - [`MaxHttpRetriesExceededError`]: 429/500 responses outlasted the
//!   configured tries
//! - [`InvalidHttpRequestError`]: a request rejected before sending
//! - [`HttpError`]: all of the above plus network failures
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("{}", response.body),
//!     Err(HttpError::Response(e)) => println!("Status {}: {}", e.code, e.message),
//!     Err(e) => println!("Request failed: {e}"),
//! }
//! ```

use thiserror::Error;

/// A non-successful HTTP response.
///
/// `message` holds a JSON object with the `errors`, `error` and
/// `error_description` fields found in the response body, plus an
/// `error_reference` when the server sent an `X-Request-Id`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code.
    pub code: u16,
    /// Serialized error message in JSON format.
    pub message: String,
    /// The `X-Request-Id` of the response, if any.
    pub error_reference: Option<String>,
}

/// Retries were exhausted on 429 or 500 responses.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// Serialized error message from the last response.
    pub message: String,
    pub error_reference: Option<String>,
}

/// A request that failed validation before it was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was built without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for HTTP operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the status code of the response that caused the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            Self::InvalidRequest(_) | Self::Network(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_displays_message() {
        let error = HttpResponseError {
            code: 404,
            message: r#"{"error":"Not Found"}"#.to_string(),
            error_reference: None,
        };
        assert_eq!(error.to_string(), r#"{"error":"Not Found"}"#);
    }

    #[test]
    fn test_max_retries_error_includes_retry_count() {
        let error = MaxHttpRetriesExceededError {
            code: 429,
            tries: 3,
            message: r#"{"error":"Rate limited"}"#.to_string(),
            error_reference: None,
        };
        let message = error.to_string();
        assert!(message.contains("Exceeded maximum retry count of 3"));
    }

    #[test]
    fn test_status_is_exposed() {
        let error = HttpError::from(HttpResponseError {
            code: 422,
            message: "{}".to_string(),
            error_reference: None,
        });
        assert_eq!(error.status(), Some(422));

        let error = HttpError::from(InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        });
        assert_eq!(error.status(), None);
    }
}
