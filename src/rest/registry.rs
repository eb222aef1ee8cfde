//! Model registration and type-level operations.
//!
//! A [`ModelRegistry`] owns every registered [`ModelConfig`] by its full
//! type name. Association targets are stored as names and resolved through
//! the registry on first use, so declarations may refer to types that are
//! registered later.
//!
//! A [`Model`] is a cheap handle pairing one configuration with the registry
//! it belongs to. It carries the type-level operations: parsing payloads,
//! building and instantiating resources, and the `find`/`all`/`get` requests.
//!
//! # Name Resolution
//!
//! A target name is looked up "nearby" first: for `Foo::User` declaring
//! `has_many :comments`, `Foo::Comment` is tried before `Comment`.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::{AssociationDecl, ModelConfig, ModelRegistry};
//! use serde_json::json;
//!
//! let mut registry = ModelRegistry::new();
//! registry
//!     .register(ModelConfig::builder("Foo::User").association(AssociationDecl::has_many("comments")))
//!     .unwrap();
//! registry.register(ModelConfig::builder("Foo::Comment")).unwrap();
//!
//! let registry = registry.into_shared();
//! let user = registry.model("Foo::User").unwrap();
//! let resource = user.instantiate(json!({"id": 1, "name": "Tobias"}).as_object().cloned().unwrap());
//! assert!(!resource.attributes().is_dirty());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::rest::association::AssociationDecl;
use crate::rest::errors::ResourceError;
use crate::rest::model::{ModelConfig, ModelConfigBuilder};
use crate::rest::nested;
use crate::rest::path::build_path;
use crate::rest::resource::Resource;
use crate::rest::serializer;
use crate::rest::shape::{self, RawPayload, Shape};
use crate::rest::tracking::Attributes;
use crate::rest::transport::{Params, Transport};
use crate::rest::value::{json_is_blank, AttrValue, Collection};

/// Registered model configurations, keyed by full type name.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<ModelConfig>>,
}

// Verify registry types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ModelRegistry>();
    assert_send_sync::<Model>();
};

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and registers a model configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateModel`] if the name is taken, or any
    /// error from [`ModelConfigBuilder::build`].
    pub fn register(&mut self, builder: ModelConfigBuilder) -> Result<Arc<ModelConfig>, ConfigError> {
        let config = Arc::new(builder.build()?);
        let name = config.name().to_string();
        if self.models.contains_key(&name) {
            return Err(ConfigError::DuplicateModel { name });
        }

        tracing::debug!(model = %name, "Registered model");
        self.models.insert(name, Arc::clone(&config));
        Ok(config)
    }

    /// Registers a model that inherits from an already registered one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownParent`] if `parent` is not registered,
    /// plus any error from [`register`](Self::register).
    pub fn register_inheriting(
        &mut self,
        builder: ModelConfigBuilder,
        parent: &str,
    ) -> Result<Arc<ModelConfig>, ConfigError> {
        let parent_config = self
            .get(parent)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownParent {
                name: builder.name().to_string(),
                parent: parent.to_string(),
            })?;
        self.register(builder.inherits(&parent_config))
    }

    /// Returns the configuration registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ModelConfig>> {
        self.models.get(name)
    }

    /// Returns the number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolves `class_name` as seen from the type `from`.
    ///
    /// Tries `<namespace of from>::<class_name>` first, then `class_name`
    /// itself. A leading `::` forces a global lookup.
    #[must_use]
    pub fn resolve_nearby(&self, from: &str, class_name: &str) -> Option<&Arc<ModelConfig>> {
        if let Some(global) = class_name.strip_prefix("::") {
            return self.get(global);
        }

        if let Some((namespace, _)) = from.rsplit_once("::") {
            if let Some(config) = self.get(&format!("{namespace}::{class_name}")) {
                return Some(config);
            }
        }

        self.get(class_name)
    }

    /// Freezes the registry for sharing.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns a handle to the model registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownModel`] if `name` is not registered.
    pub fn model(self: &Arc<Self>, name: &str) -> Result<Model, ResourceError> {
        let config = self.get(name).ok_or_else(|| ResourceError::UnknownModel {
            name: name.to_string(),
        })?;
        Ok(Model::new(Arc::clone(config), Arc::clone(self)))
    }
}

/// A registered model type.
#[derive(Clone)]
pub struct Model {
    config: Arc<ModelConfig>,
    registry: Arc<ModelRegistry>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.config.name())
            .finish_non_exhaustive()
    }
}

impl Model {
    pub(crate) const fn new(config: Arc<ModelConfig>, registry: Arc<ModelRegistry>) -> Self {
        Self { config, registry }
    }

    /// Returns the full type name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Creates an empty, unsaved resource.
    #[must_use]
    pub fn new_resource(&self) -> Resource {
        Resource::new(self.clone(), Attributes::new())
    }

    /// Builds a resource from caller-supplied attributes.
    ///
    /// Every attribute is marked changed.
    #[must_use]
    pub fn build(&self, attrs: Map<String, Value>) -> Resource {
        let mut resource = self.new_resource();
        for (key, value) in attrs {
            resource.set(key, value);
        }
        resource
    }

    /// Instantiates a resource from server data.
    ///
    /// Nested association data is resolved into resources. Nothing is
    /// marked changed.
    #[must_use]
    pub fn instantiate(&self, data: Map<String, Value>) -> Resource {
        let mut resource = self.new_resource();
        nested::load_payload(&mut resource, data);
        resource
    }

    /// Unwraps a single-resource payload from the parsed root element.
    #[must_use]
    pub fn parse(&self, body: Value) -> Value {
        shape::extract(&self.config, body)
    }

    /// Encodes attributes into a request body for this model.
    #[must_use]
    pub fn to_request_params(&self, attributes: &Attributes) -> Value {
        serializer::encode(attributes, &self.config)
    }

    /// Resolves the target model of an association declared on this model.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownModel`] if the target is not
    /// registered.
    pub fn resolve_target(&self, decl: &AssociationDecl) -> Result<Self, ResourceError> {
        let config = self
            .registry
            .resolve_nearby(self.name(), decl.target_name())
            .ok_or_else(|| ResourceError::UnknownModel {
                name: decl.target_name().to_string(),
            })?;
        Ok(Self::new(Arc::clone(config), Arc::clone(&self.registry)))
    }

    /// Issues a GET and materializes the response.
    ///
    /// The response is resolved against `shape`: one payload becomes a
    /// [`Resource`] and several become a [`Collection`]. Anything that is not
    /// an object is returned as plain JSON.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged.
    pub async fn get<T: Transport>(
        &self,
        transport: &T,
        path: &str,
        params: &Params,
        shape: Shape,
    ) -> Result<AttrValue, ResourceError> {
        tracing::debug!(model = %self.name(), path = %path, ?shape, "GET");
        let body = transport.fetch(path, params).await?;
        Ok(self.materialize(shape::resolve(&self.config, body, shape)))
    }

    /// Finds one resource by identifier.
    ///
    /// A blank `id` returns `None` without a request.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathUnavailable`] if the member path needs
    /// values `params` does not provide, and transport errors unchanged.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let user = users.find(&client, 1, &Params::new()).await?;
    /// ```
    pub async fn find<T: Transport>(
        &self,
        transport: &T,
        id: impl Into<Value>,
        params: &Params,
    ) -> Result<Option<Resource>, ResourceError> {
        let id = id.into();
        if json_is_blank(&id) {
            return Ok(None);
        }

        let primary_key = self.config.primary_key();
        let path = build_path(self.config.resource_path(), |key| {
            if key == primary_key {
                Some(id.clone())
            } else {
                params.get(key).cloned()
            }
        })?;

        let value = self.get(transport, &path, params, Shape::Single).await?;
        Ok(value.into_resource())
    }

    /// Lists resources from the collection path.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathUnavailable`] if the collection path
    /// needs values `params` does not provide, and transport errors
    /// unchanged.
    pub async fn all<T: Transport>(
        &self,
        transport: &T,
        params: &Params,
    ) -> Result<Collection, ResourceError> {
        let path = build_path(self.config.collection_path(), |key| params.get(key).cloned())?;
        let value = self.get(transport, &path, params, Shape::Collection).await?;
        Ok(value.into_collection())
    }

    /// Builds a resource and saves it.
    ///
    /// # Errors
    ///
    /// See [`Resource::save`].
    pub async fn create<T: Transport>(
        &self,
        transport: &T,
        attrs: Map<String, Value>,
    ) -> Result<Resource, ResourceError> {
        let mut resource = self.build(attrs);
        resource.save(transport).await?;
        Ok(resource)
    }

    /// Builds a new resource, asking the server for a template first when
    /// `request_new_object_on_build` is set.
    ///
    /// The template request is a GET to the member path with `new` as the
    /// identifier and `attrs` as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathUnavailable`] and transport errors for
    /// the template request.
    pub async fn build_remote<T: Transport>(
        &self,
        transport: &T,
        attrs: Map<String, Value>,
    ) -> Result<Resource, ResourceError> {
        if !self.config.request_new_object_on_build() {
            return Ok(self.build(attrs));
        }

        let primary_key = self.config.primary_key();
        let path = build_path(self.config.resource_path(), |key| {
            if key == primary_key {
                Some(Value::String("new".to_string()))
            } else {
                attrs.get(key).cloned()
            }
        })?;

        tracing::debug!(model = %self.name(), path = %path, "Requesting new object template");
        let body = transport.fetch(&path, &attrs).await?;
        match self.parse(body) {
            Value::Object(data) => Ok(self.build(data)),
            other => {
                tracing::debug!(
                    model = %self.name(),
                    "New object template is not an object, building from attributes: {}",
                    other
                );
                Ok(self.build(attrs))
            }
        }
    }

    fn materialize(&self, payload: RawPayload) -> AttrValue {
        match payload {
            RawPayload::One(Value::Object(data)) => self.instantiate(data).into(),
            RawPayload::One(other) => AttrValue::Json(other),
            RawPayload::Many(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(data) => Some(self.instantiate(data)),
                    other => {
                        tracing::debug!(
                            model = %self.name(),
                            "Skipping non-object collection member: {}",
                            other
                        );
                        None
                    }
                })
                .collect::<Collection>()
                .into(),
        }
    }
}
