//! HTTP client types.
//!
//! - [`HttpClient`]: the async HTTP client
//! - [`HttpRequest`]: a request to send
//! - [`HttpResponse`]: a decoded response
//! - [`HttpMethod`]: GET, POST, PUT, DELETE
//! - [`rest::RestClient`]: the JSON REST client models talk through
//! - [`rest::RestError`]: REST-specific errors
//!
//! # Retry Behavior
//!
//! - **429 (Rate Limited)**: retried after `Retry-After`, or 1 second if absent
//! - **500 (Server Error)**: retried after a fixed 1 second
//! - **Other errors**: returned immediately
//!
//! The default `tries` is 1, meaning no retries. Set
//! [`ClientConfigBuilder::tries`](crate::ClientConfigBuilder::tries) or
//! [`HttpRequestBuilder::tries`] to enable them.

mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod rest;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;

pub use rest::{RestClient, RestError};
