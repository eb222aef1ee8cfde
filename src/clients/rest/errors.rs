//! REST-specific error types.
//!
//! - [`RestError::InvalidPath`]: a path that is empty after normalization
//! - [`RestError::Http`]: wraps underlying HTTP errors
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::clients::rest::RestError;
//!
//! match client.get("users", None).await {
//!     Ok(response) => println!("Users: {}", response.body),
//!     Err(RestError::InvalidPath { path }) => println!("Invalid path: {path}"),
//!     Err(RestError::Http(e)) => println!("HTTP error: {e}"),
//! }
//! ```

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for REST requests.
#[derive(Debug, Error)]
pub enum RestError {
    /// The path is empty after normalization.
    #[error("Invalid REST API path: {path}")]
    InvalidPath {
        /// The path that was provided.
        path: String,
    },

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}
