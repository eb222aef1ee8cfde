//! JSON REST client.
//!
//! - [`RestClient`]: `get()`, `post()`, `put()`, `delete()` over
//!   [`HttpClient`](crate::clients::HttpClient)
//! - [`RestError`]: error type for REST requests
//!
//! # Path Normalization
//!
//! Leading and trailing slashes are stripped (`/users/1/` -> `users/1`) and
//! the result is appended to the configured base path. Empty paths are
//! rejected with [`RestError::InvalidPath`].

mod client;
mod errors;

pub use client::RestClient;
pub use errors::RestError;
