//! REST object mapping.
//!
//! This module maps JSON payloads from a REST API onto resources and back:
//!
//! - **[`ModelConfig`] / [`ModelRegistry`]**: per-type configuration (root
//!   handling, selective serialization, paths, associations) and lazy
//!   resolution of type names
//! - **[`Model`] / [`Resource`]**: type-level operations (`find`, `all`,
//!   `build`, `create`) and mutable instances with change tracking
//! - **[`shape`]**: root element extraction and wrapping, including the
//!   `active_model_serializers` plural convention
//! - **[`AssociationProxy`]**: lazy, chainable `has_many`, `has_one` and
//!   `belongs_to` relationships that fetch on first use
//! - **[`NestedAssigner`]**: nested attribute assignment for single-valued
//!   associations
//!
//! All requests go through the [`Transport`] trait, which
//! [`RestClient`](crate::RestClient) implements.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::rest::{AssociationDecl, ModelConfig, ModelRegistry, Params};
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(
//!     ModelConfig::builder("Foo::User")
//!         .parse_root_in_json(true)
//!         .association(AssociationDecl::has_many("comments")),
//! )?;
//! registry.register(ModelConfig::builder("Foo::Comment"))?;
//! let registry = registry.into_shared();
//!
//! let users = registry.model("Foo::User")?;
//! let user = users.find(&client, 1, &Params::new()).await?.unwrap();
//!
//! let mut comments = user.association("comments")?;
//! for comment in comments.load(&client).await?.clone().into_collection() {
//!     println!("{}", comment.to_json());
//! }
//! ```

mod association;
mod errors;
mod model;
mod nested;
mod path;
mod proxy;
mod registry;
mod resource;
mod serializer;
mod tracking;
mod transport;
mod value;

pub mod naming;
pub mod shape;

// Public exports
pub use association::{Association, AssociationDecl, AssociationKind};
pub use errors::ResourceError;
pub use model::{ModelConfig, ModelConfigBuilder, ParseFormat, RootSetting};
pub use nested::NestedAssigner;
pub use path::{build_path, path_segment, PathBuilder, PathResult, PathUnavailable};
pub use proxy::AssociationProxy;
pub use registry::{Model, ModelRegistry};
pub use resource::Resource;
pub use serializer::encode;
pub use shape::{RawPayload, Shape};
pub use tracking::Attributes;
pub use transport::{params_from, to_query, Params, Transport};
pub use value::{AttrValue, Collection};
