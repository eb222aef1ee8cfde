//! Configuration error types.
//!
//! Client configuration and model registration both fail fast with a
//! [`ConfigError`]. Errors raised while talking to the server live in
//! [`crate::clients`] and [`crate::rest`].
//!
//! # Example
//!
//! ```rust
//! use rest_model::{BaseUrl, ConfigError};
//!
//! let result = BaseUrl::new("api.example.com");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring clients and models.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide a URL with scheme (e.g., 'https://api.example.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Model type name is empty.
    #[error("Model name cannot be empty.")]
    EmptyModelName,

    /// A model with this name is already registered.
    #[error("A model named '{name}' is already registered.")]
    DuplicateModel {
        /// The duplicated type name.
        name: String,
    },

    /// The parent model is not registered.
    #[error("Cannot register '{name}': parent model '{parent}' is not registered.")]
    UnknownParent {
        /// The model being registered.
        name: String,
        /// The missing parent.
        parent: String,
    },
}
