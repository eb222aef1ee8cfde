//! Resource instances.
//!
//! A [`Resource`] is a mutable record of one registered model type: an
//! attribute map with change tracking plus the [`Model`] handle it was
//! created from. Resources are created through the model
//! ([`Model::build`], [`Model::instantiate`], `find`, `all`) rather than
//! directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::rest::{Params, ResourceError};
//!
//! let mut user = users.find(&client, 1, &Params::new()).await?.unwrap();
//! user.set("fullname", serde_json::json!("Lindsay Fünke"));
//! user.save(&client).await?;
//!
//! let comments = user.association("comments")?;
//! let approved = comments.where_(params_from(&ApprovedOnly { approved: true })?);
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::clients::HttpMethod;
use crate::rest::association::Association;
use crate::rest::errors::ResourceError;
use crate::rest::nested::{self, NestedAssigner};
use crate::rest::path::{build_path, PathResult};
use crate::rest::proxy::{AssociationCache, AssociationProxy};
use crate::rest::registry::Model;
use crate::rest::tracking::Attributes;
use crate::rest::transport::{Params, Transport};
use crate::rest::value::{json_is_blank, AttrValue};

/// A single resource of a registered model type.
#[derive(Debug, Clone)]
pub struct Resource {
    model: Model,
    attributes: Attributes,
    associations: AssociationCache,
}

// Verify Resource is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resource>();
};

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.model.name() == other.model.name() && self.attributes == other.attributes
    }
}

impl Resource {
    pub(crate) fn new(model: Model, attributes: Attributes) -> Self {
        Self {
            model,
            attributes,
            associations: AssociationCache::default(),
        }
    }

    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        self.associations.clear();
        &mut self.attributes
    }

    pub(crate) const fn association_cache(&self) -> &AssociationCache {
        &self.associations
    }

    /// Returns the attribute stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Sets an attribute, marking it changed if the value differs.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> bool {
        self.attributes_mut().set(key, value)
    }

    /// Merges `attrs` into the resource, marking each differing key changed.
    pub fn assign_attributes(&mut self, attrs: Map<String, Value>) {
        let attributes = self.attributes_mut();
        for (key, value) in attrs {
            attributes.set(key, value);
        }
    }

    /// Returns the primary key value, if present and not blank.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.attributes
            .get(self.model.config().primary_key())
            .and_then(AttrValue::as_json)
            .filter(|value| !json_is_blank(value))
    }

    /// Returns `true` if the resource has no primary key value yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Builds the collection path, filling placeholders from `params` and
    /// then from attributes.
    ///
    /// # Errors
    ///
    /// Returns [`PathUnavailable`](crate::rest::PathUnavailable) when a
    /// placeholder has no value.
    pub fn collection_path(&self, params: &Params) -> PathResult {
        self.build_own_path(self.model.config().collection_path(), params)
    }

    /// Builds the member path, filling placeholders from `params` and then
    /// from attributes.
    ///
    /// # Errors
    ///
    /// Returns [`PathUnavailable`](crate::rest::PathUnavailable) when a
    /// placeholder has no value, which includes an unsaved resource.
    pub fn member_path(&self, params: &Params) -> PathResult {
        self.build_own_path(self.model.config().resource_path(), params)
    }

    /// Builds the member path for saved resources and the collection path
    /// for new ones.
    ///
    /// # Errors
    ///
    /// Returns [`PathUnavailable`](crate::rest::PathUnavailable) when a
    /// placeholder has no value.
    pub fn request_path(&self, params: &Params) -> PathResult {
        if self.is_new() {
            self.collection_path(params)
        } else {
            self.member_path(params)
        }
    }

    fn build_own_path(&self, template: &str, params: &Params) -> PathResult {
        build_path(template, |key| {
            params.get(key).cloned().or_else(|| {
                self.attributes
                    .get(key)
                    .and_then(AttrValue::as_json)
                    .cloned()
            })
        })
    }

    /// Encodes the resource into a request body.
    #[must_use]
    pub fn to_request_params(&self) -> Value {
        self.model.to_request_params(&self.attributes)
    }

    /// Returns every attribute as plain JSON, nested resources included.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.to_json_map())
    }

    /// Deserializes the resource's attributes into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialization`] if the attributes do not
    /// match `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// #[derive(Deserialize)]
    /// struct User { id: u64, fullname: String }
    ///
    /// let user: User = resource.to_typed()?;
    /// ```
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, ResourceError> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    /// Returns a lazy proxy for the association called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAssociation`] if the model declares no
    /// such association and [`ResourceError::UnknownModel`] if its target
    /// type is not registered.
    pub fn association(&self, name: &str) -> Result<AssociationProxy<'_>, ResourceError> {
        let decl = self
            .model
            .config()
            .association(name)
            .ok_or_else(|| ResourceError::UnknownAssociation {
                model: self.model.name().to_string(),
                name: name.to_string(),
            })?;
        let target = self.model.resolve_target(decl)?;
        Ok(AssociationProxy::new(Association::new(self, decl, target)))
    }

    /// Assigns nested attributes to a single-valued association.
    ///
    /// # Errors
    ///
    /// See [`NestedAssigner::assign`].
    pub fn assign_nested_attributes(
        &mut self,
        name: &str,
        attrs: Map<String, Value>,
    ) -> Result<(), ResourceError> {
        NestedAssigner::for_association(&self.model, name)?.assign(self, attrs)
    }

    /// Creates or updates the resource on the server.
    ///
    /// New resources are POSTed to the collection path, saved ones PUT to
    /// the member path. Server data in the response is loaded back into the
    /// resource and all changes are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathUnavailable`] if the path cannot be
    /// built, and transport errors unchanged. The resource is left as it
    /// was on error.
    pub async fn save<T: Transport>(&mut self, transport: &T) -> Result<(), ResourceError> {
        let no_params = Params::new();
        let (method, path) = if self.is_new() {
            (HttpMethod::Post, self.collection_path(&no_params)?)
        } else {
            (HttpMethod::Put, self.member_path(&no_params)?)
        };

        tracing::debug!(
            model = %self.model.name(),
            method = %method,
            path = %path,
            "Saving resource"
        );

        let body = transport.send(method, &path, self.to_request_params()).await?;
        if let Value::Object(data) = self.model.parse(body) {
            nested::load_payload(self, data);
        }
        self.attributes_mut().mark_clean();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::model::ModelConfig;
    use crate::rest::registry::ModelRegistry;
    use serde::Deserialize;
    use serde_json::json;

    fn user_model() -> Model {
        let mut registry = ModelRegistry::new();
        registry
            .register(ModelConfig::builder("Foo::User").collection_path("organizations/{organization_id}/users"))
            .unwrap();
        registry.into_shared().model("Foo::User").unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_request_path_depends_on_id() {
        let model = user_model();
        let saved = model.instantiate(object(json!({"id": 2, "organization_id": 1})));
        let unsaved = model.build(object(json!({"organization_id": 1})));

        assert_eq!(saved.request_path(&Params::new()).unwrap(), "organizations/1/users/2");
        assert_eq!(unsaved.request_path(&Params::new()).unwrap(), "organizations/1/users");
        assert!(unsaved.member_path(&Params::new()).is_err());
    }

    #[test]
    fn test_params_fill_placeholders_before_attributes() {
        let model = user_model();
        let resource = model.instantiate(object(json!({"id": 2, "organization_id": 1})));
        let params = object(json!({"organization_id": 9}));

        assert_eq!(resource.member_path(&params).unwrap(), "organizations/9/users/2");
    }

    #[test]
    fn test_blank_id_means_new() {
        let model = user_model();
        let resource = model.instantiate(object(json!({"id": "", "name": "A"})));
        assert!(resource.is_new());
        assert!(resource.id().is_none());
    }

    #[test]
    fn test_assign_attributes_marks_changes() {
        let model = user_model();
        let mut resource = model.instantiate(object(json!({"id": 1, "name": "A"})));

        resource.assign_attributes(object(json!({"name": "A", "email": "a@example.com"})));

        assert!(!resource.attributes().is_changed("name"));
        assert!(resource.attributes().is_changed("email"));
    }

    #[test]
    fn test_to_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: u64,
            name: String,
        }

        let model = user_model();
        let resource = model.instantiate(object(json!({"id": 1, "name": "Tobias"})));
        let user: User = resource.to_typed().unwrap();

        assert_eq!(
            user,
            User {
                id: 1,
                name: "Tobias".to_string()
            }
        );

        let mismatch: Result<Vec<u8>, _> = resource.to_typed();
        assert!(matches!(mismatch, Err(ResourceError::Serialization(_))));
    }

    #[test]
    fn test_unknown_association() {
        let model = user_model();
        let resource = model.new_resource();

        assert!(matches!(
            resource.association("comments"),
            Err(ResourceError::UnknownAssociation { .. })
        ));
    }
}
