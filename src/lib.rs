//! # rest-model
//!
//! Object mapping for JSON REST APIs: typed model configuration, root
//! element negotiation, selective request serialization and lazily-fetched
//! associations.
//!
//! ## Overview
//!
//! This crate provides:
//! - Client configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - An async HTTP client with retry handling ([`HttpClient`], [`RestClient`])
//! - Per-model configuration ([`ModelConfig`]) kept in a [`ModelRegistry`]
//! - Resources with change tracking ([`Resource`]) and their type-level
//!   operations ([`Model`])
//! - `has_many`, `has_one` and `belongs_to` associations that fetch on
//!   first use ([`AssociationProxy`])
//!
//! ## Quick Start
//!
//! ```rust
//! use rest_model::{AssociationDecl, BaseUrl, ClientConfig, ModelConfig, ModelRegistry};
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let mut registry = ModelRegistry::new();
//! registry
//!     .register(
//!         ModelConfig::builder("User")
//!             .include_root_in_json(true)
//!             .parse_root_in_json(true)
//!             .association(AssociationDecl::has_many("comments")),
//!     )
//!     .unwrap();
//! registry.register(ModelConfig::builder("Comment")).unwrap();
//! let registry = registry.into_shared();
//!
//! let users = registry.model("User").unwrap();
//! let user = users.build(serde_json::Map::new());
//! assert!(user.is_new());
//! # let _ = config;
//! ```
//!
//! ## Fetching Resources
//!
//! ```rust,ignore
//! use rest_model::{Params, RestClient};
//!
//! let client = RestClient::new(&config)?;
//!
//! let mut user = users.find(&client, 1, &Params::new()).await?.unwrap();
//! user.set("fullname", serde_json::json!("Lindsay Fünke"));
//! user.save(&client).await?;
//!
//! let mut comments = user.association("comments")?;
//! let loaded = comments.load(&client).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: models live in an explicit registry
//! - **Fail-fast validation**: configuration is checked on construction
//! - **Thread-safe**: configuration and clients are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{BaseUrl, ClientConfig, ClientConfigBuilder};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError, RestClient,
    RestError,
};

// Re-export object mapping types
pub use rest::{
    AssociationDecl, AssociationKind, AssociationProxy, AttrValue, Attributes, Collection, Model,
    ModelConfig, ModelConfigBuilder, ModelRegistry, ParseFormat, Params, Resource, ResourceError,
    RootSetting, Transport,
};
