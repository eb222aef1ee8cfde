//! Per-type model configuration.
//!
//! A [`ModelConfig`] describes how one resource type is read from and
//! written to the wire: root wrapping, root parsing, selective serialization,
//! request paths and association declarations.
//!
//! Configuration is built once with [`ModelConfigBuilder`] and never mutated
//! afterwards. A type can inherit from a parent type's resolved
//! configuration; every setting the child does not set explicitly is taken
//! from the parent. The root element and request paths are the exception:
//! they always derive from the type's own name.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::{ModelConfig, ParseFormat};
//! use std::sync::Arc;
//!
//! let base = Arc::new(
//!     ModelConfig::builder("Foo::Model")
//!         .parse_root_in_json(true)
//!         .parse_format(ParseFormat::ActiveModelSerializers)
//!         .build()
//!         .unwrap(),
//! );
//!
//! let user = ModelConfig::builder("User").inherits(&base).build().unwrap();
//! assert_eq!(user.root_element(), "user");
//! assert_eq!(user.parsed_root_element(), Some("user"));
//! assert_eq!(user.pluralized_parsed_root_element().as_deref(), Some("users"));
//! assert_eq!(user.collection_path(), "users");
//! ```

use std::sync::Arc;

use crate::error::ConfigError;
use crate::rest::association::AssociationDecl;
use crate::rest::naming::{pluralize, root_element_for};

/// Root handling for `include_root_in_json` and `parse_root_in_json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootSetting {
    /// No root element.
    #[default]
    Off,
    /// Use the type's root element.
    Default,
    /// Use an explicit root name.
    Named(String),
}

impl RootSetting {
    /// Resolves the effective root key against a type's root element.
    #[must_use]
    pub fn resolve<'a>(&'a self, root_element: &'a str) -> Option<&'a str> {
        match self {
            Self::Off => None,
            Self::Default => Some(root_element),
            Self::Named(name) => Some(name.as_str()),
        }
    }
}

impl From<bool> for RootSetting {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Default
        } else {
            Self::Off
        }
    }
}

impl From<&str> for RootSetting {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for RootSetting {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// Payload conventions for root parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseFormat {
    /// Single and plural payloads use the same root key.
    #[default]
    Plain,
    /// Plural payloads are nested under the pluralized root key
    /// (`{"users": [...]}`), as produced by `active_model_serializers`.
    ActiveModelSerializers,
}

/// Resolved, immutable configuration for one resource type.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    name: String,
    parent: Option<Arc<ModelConfig>>,
    root_element: String,
    include_root_in_json: RootSetting,
    parse_root_in_json: RootSetting,
    parse_format: ParseFormat,
    send_only_modified_attributes: bool,
    send_up_child_params: bool,
    request_new_object_on_build: bool,
    primary_key: String,
    collection_path: String,
    resource_path: String,
    associations: Vec<AssociationDecl>,
}

// Verify ModelConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ModelConfig>();
};

impl ModelConfig {
    /// Starts configuring the type called `name` (e.g. `"Foo::User"`).
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModelConfigBuilder {
        ModelConfigBuilder::new(name)
    }

    /// Returns the full type name, including any namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent type's configuration, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns the root element (`Foo::BlogPost` defaults to `blog_post`).
    #[must_use]
    pub fn root_element(&self) -> &str {
        &self.root_element
    }

    #[must_use]
    pub const fn include_root_in_json(&self) -> &RootSetting {
        &self.include_root_in_json
    }

    #[must_use]
    pub const fn parse_root_in_json(&self) -> &RootSetting {
        &self.parse_root_in_json
    }

    #[must_use]
    pub const fn parse_format(&self) -> ParseFormat {
        self.parse_format
    }

    #[must_use]
    pub const fn send_only_modified_attributes(&self) -> bool {
        self.send_only_modified_attributes
    }

    #[must_use]
    pub const fn send_up_child_params(&self) -> bool {
        self.send_up_child_params
    }

    #[must_use]
    pub const fn request_new_object_on_build(&self) -> bool {
        self.request_new_object_on_build
    }

    /// Returns the primary key attribute (default `id`).
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the collection path template (default: pluralized root element).
    #[must_use]
    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    /// Returns the member path template (default `<collection_path>/{id}`).
    #[must_use]
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Returns all association declarations, inherited ones first.
    #[must_use]
    pub fn associations(&self) -> &[AssociationDecl] {
        &self.associations
    }

    /// Looks up an association declaration by name.
    #[must_use]
    pub fn association(&self, name: &str) -> Option<&AssociationDecl> {
        self.associations.iter().find(|decl| decl.name() == name)
    }

    /// Returns the key request bodies are wrapped under, if any.
    #[must_use]
    pub fn included_root_element(&self) -> Option<&str> {
        self.include_root_in_json.resolve(&self.root_element)
    }

    /// Returns the key response payloads are unwrapped from, if any.
    #[must_use]
    pub fn parsed_root_element(&self) -> Option<&str> {
        self.parse_root_in_json.resolve(&self.root_element)
    }

    /// Returns the plural key used for `active_model_serializers` collections.
    #[must_use]
    pub fn pluralized_parsed_root_element(&self) -> Option<String> {
        self.parsed_root_element().map(pluralize)
    }

    #[must_use]
    pub fn is_active_model_serializers_format(&self) -> bool {
        self.parse_format == ParseFormat::ActiveModelSerializers
    }
}

/// Builder for [`ModelConfig`].
///
/// Every setting is optional. Unset settings are inherited from the parent
/// given to [`inherits`](Self::inherits) or fall back to these defaults:
///
/// - roots: [`RootSetting::Off`]
/// - `parse_format`: [`ParseFormat::Plain`]
/// - flags: `false`
/// - `primary_key`: `"id"`
///
/// `root_element`, `collection_path` and `resource_path` are never inherited.
#[derive(Debug)]
pub struct ModelConfigBuilder {
    name: String,
    parent: Option<Arc<ModelConfig>>,
    root_element: Option<String>,
    include_root_in_json: Option<RootSetting>,
    parse_root_in_json: Option<RootSetting>,
    parse_format: Option<ParseFormat>,
    send_only_modified_attributes: Option<bool>,
    send_up_child_params: Option<bool>,
    request_new_object_on_build: Option<bool>,
    primary_key: Option<String>,
    collection_path: Option<String>,
    resource_path: Option<String>,
    associations: Vec<AssociationDecl>,
}

impl ModelConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            root_element: None,
            include_root_in_json: None,
            parse_root_in_json: None,
            parse_format: None,
            send_only_modified_attributes: None,
            send_up_child_params: None,
            request_new_object_on_build: None,
            primary_key: None,
            collection_path: None,
            resource_path: None,
            associations: Vec::new(),
        }
    }

    /// Returns the type name being configured.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inherits unset settings and associations from `parent`.
    #[must_use]
    pub fn inherits(mut self, parent: &Arc<ModelConfig>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Overrides the root element derived from the type name.
    #[must_use]
    pub fn root_element(mut self, root: impl Into<String>) -> Self {
        self.root_element = Some(root.into());
        self
    }

    /// Wraps request bodies under a root key.
    ///
    /// Accepts `true`/`false` or an explicit root name.
    #[must_use]
    pub fn include_root_in_json(mut self, setting: impl Into<RootSetting>) -> Self {
        self.include_root_in_json = Some(setting.into());
        self
    }

    /// Unwraps response payloads from a root key.
    ///
    /// Accepts `true`/`false` or an explicit root name.
    #[must_use]
    pub fn parse_root_in_json(mut self, setting: impl Into<RootSetting>) -> Self {
        self.parse_root_in_json = Some(setting.into());
        self
    }

    #[must_use]
    pub const fn parse_format(mut self, format: ParseFormat) -> Self {
        self.parse_format = Some(format);
        self
    }

    /// Sends only changed attributes in request bodies.
    #[must_use]
    pub const fn send_only_modified_attributes(mut self, enabled: bool) -> Self {
        self.send_only_modified_attributes = Some(enabled);
        self
    }

    /// Serializes nested resources with their own request parameters.
    #[must_use]
    pub const fn send_up_child_params(mut self, enabled: bool) -> Self {
        self.send_up_child_params = Some(enabled);
        self
    }

    /// Asks the server for a template object when building new resources.
    #[must_use]
    pub const fn request_new_object_on_build(mut self, enabled: bool) -> Self {
        self.request_new_object_on_build = Some(enabled);
        self
    }

    #[must_use]
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn collection_path(mut self, path: impl Into<String>) -> Self {
        self.collection_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    /// Declares an association.
    ///
    /// A declaration with the same name as an inherited one replaces it.
    #[must_use]
    pub fn association(mut self, decl: AssociationDecl) -> Self {
        self.associations.retain(|existing| existing.name() != decl.name());
        self.associations.push(decl);
        self
    }

    /// Resolves inheritance and defaults into a [`ModelConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyModelName`] if the type name (or the
    /// root element derived from it) is empty.
    pub fn build(self) -> Result<ModelConfig, ConfigError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyModelName);
        }

        let root_element = self
            .root_element
            .unwrap_or_else(|| root_element_for(&name));
        if root_element.is_empty() {
            return Err(ConfigError::EmptyModelName);
        }

        let parent = self.parent;
        let inherited = |pick: fn(&ModelConfig) -> RootSetting| {
            parent.as_deref().map(pick).unwrap_or_default()
        };

        let include_root_in_json = self
            .include_root_in_json
            .unwrap_or_else(|| inherited(|p| p.include_root_in_json.clone()));
        let parse_root_in_json = self
            .parse_root_in_json
            .unwrap_or_else(|| inherited(|p| p.parse_root_in_json.clone()));
        let parse_format = self
            .parse_format
            .or_else(|| parent.as_deref().map(ModelConfig::parse_format))
            .unwrap_or_default();
        let flag = |own: Option<bool>, pick: fn(&ModelConfig) -> bool| {
            own.or_else(|| parent.as_deref().map(pick)).unwrap_or(false)
        };
        let send_only_modified_attributes = flag(
            self.send_only_modified_attributes,
            ModelConfig::send_only_modified_attributes,
        );
        let send_up_child_params = flag(self.send_up_child_params, ModelConfig::send_up_child_params);
        let request_new_object_on_build = flag(
            self.request_new_object_on_build,
            ModelConfig::request_new_object_on_build,
        );
        let primary_key = self
            .primary_key
            .or_else(|| parent.as_deref().map(|p| p.primary_key.clone()))
            .unwrap_or_else(|| "id".to_string());

        let collection_path = self
            .collection_path
            .unwrap_or_else(|| pluralize(&root_element));
        let resource_path = self
            .resource_path
            .unwrap_or_else(|| format!("{collection_path}/{{{primary_key}}}"));

        let mut associations: Vec<AssociationDecl> = parent
            .as_deref()
            .map(|p| p.associations.clone())
            .unwrap_or_default();
        for decl in self.associations {
            associations.retain(|existing| existing.name() != decl.name());
            associations.push(decl);
        }

        Ok(ModelConfig {
            name,
            parent,
            root_element,
            include_root_in_json,
            parse_root_in_json,
            parse_format,
            send_only_modified_attributes,
            send_up_child_params,
            request_new_object_on_build,
            primary_key,
            collection_path,
            resource_path,
            associations,
        })
    }
}
