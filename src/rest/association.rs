//! Association declarations and their runtime counterpart.
//!
//! An [`AssociationDecl`] is declared once on a [`ModelConfig`]
//! (`has_many :comments`, `has_one :role`, `belongs_to :organization`) and
//! never changes. An [`Association`] binds a declaration to one parent
//! resource at access time: it carries query parameters, knows how to build
//! its request path from the parent, and fetches the target data when the
//! parent does not already hold it.
//!
//! # Default Values
//!
//! | Kind | Target | Path | Default |
//! |------|--------|------|---------|
//! | `has_many :comments` | `Comment` | `/comments` | empty collection |
//! | `has_one :role` | `Role` | `/role` | `null` |
//! | `belongs_to :organization` | `Organization` | `/organizations/{id}` | `null` |
//!
//! [`ModelConfig`]: crate::rest::ModelConfig

use serde_json::{Map, Value};

use crate::rest::errors::ResourceError;
use crate::rest::naming::{classify, pluralize};
use crate::rest::path::{build_path, path_segment, PathBuilder};
use crate::rest::registry::Model;
use crate::rest::resource::Resource;
use crate::rest::shape::Shape;
use crate::rest::transport::{Params, Transport};
use crate::rest::value::{AttrValue, Collection};

/// The relationship kind of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// The parent owns a list of target resources.
    HasMany,
    /// The parent owns one target resource.
    HasOne,
    /// The parent refers to one target resource by foreign key.
    BelongsTo,
}

impl AssociationKind {
    /// Returns the response shape a fetch of this kind expects.
    #[must_use]
    pub const fn shape(self) -> Shape {
        match self {
            Self::HasMany => Shape::Collection,
            Self::HasOne | Self::BelongsTo => Shape::Single,
        }
    }
}

/// An immutable association declaration.
///
/// Targets are named, not referenced, so a declaration can point at a type
/// registered later. The name is resolved on first use.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationDecl {
    kind: AssociationKind,
    name: String,
    class_name: String,
    path: String,
    data_key: String,
    foreign_key: String,
    include_in_parse: bool,
    default: AttrValue,
}

impl AssociationDecl {
    fn new(kind: AssociationKind, name: &str) -> Self {
        let path = match kind {
            AssociationKind::HasMany | AssociationKind::HasOne => format!("/{name}"),
            AssociationKind::BelongsTo => format!("/{}/{{id}}", pluralize(name)),
        };
        let default = match kind {
            AssociationKind::HasMany => AttrValue::Collection(Collection::new()),
            AssociationKind::HasOne | AssociationKind::BelongsTo => AttrValue::Json(Value::Null),
        };

        Self {
            kind,
            name: name.to_string(),
            class_name: classify(name),
            path,
            data_key: name.to_string(),
            foreign_key: format!("{name}_id"),
            include_in_parse: false,
            default,
        }
    }

    /// Declares a `has_many` association.
    #[must_use]
    pub fn has_many(name: &str) -> Self {
        Self::new(AssociationKind::HasMany, name)
    }

    /// Declares a `has_one` association.
    #[must_use]
    pub fn has_one(name: &str) -> Self {
        Self::new(AssociationKind::HasOne, name)
    }

    /// Declares a `belongs_to` association.
    #[must_use]
    pub fn belongs_to(name: &str) -> Self {
        Self::new(AssociationKind::BelongsTo, name)
    }

    /// Overrides the target type name (`"Foo::Comment"` or `"Comment"`).
    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Overrides the path suffix (or, for `belongs_to`, the path template).
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Overrides the key nested data is read from.
    #[must_use]
    pub fn data_key(mut self, data_key: impl Into<String>) -> Self {
        self.data_key = data_key.into();
        self
    }

    /// Overrides the foreign key attribute (`belongs_to` only).
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = foreign_key.into();
        self
    }

    /// Keeps this association's data in request bodies.
    #[must_use]
    pub const fn include_in_parse(mut self, include: bool) -> Self {
        self.include_in_parse = include;
        self
    }

    /// Overrides the value returned when the parent has no data.
    #[must_use]
    pub fn default(mut self, default: impl Into<AttrValue>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> AssociationKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn data_key_name(&self) -> &str {
        &self.data_key
    }

    #[must_use]
    pub fn foreign_key_name(&self) -> &str {
        &self.foreign_key
    }

    #[must_use]
    pub const fn is_included_in_parse(&self) -> bool {
        self.include_in_parse
    }

    /// Returns a fresh copy of the declared default.
    #[must_use]
    pub fn default_value(&self) -> AttrValue {
        self.default.clone()
    }

    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.kind.shape()
    }
}

/// One association bound to one parent resource.
///
/// Created by [`Resource::association`] (wrapped in an
/// [`AssociationProxy`](crate::rest::AssociationProxy)). Chaining with
/// [`where_`](Self::where_) returns a new association and leaves the
/// receiver untouched.
#[derive(Debug, Clone)]
pub struct Association<'a> {
    parent: &'a Resource,
    decl: &'a AssociationDecl,
    target: Model,
    params: Params,
}

impl<'a> Association<'a> {
    pub(crate) fn new(parent: &'a Resource, decl: &'a AssociationDecl, target: Model) -> Self {
        Self {
            parent,
            decl,
            target,
            params: Params::new(),
        }
    }

    #[must_use]
    pub const fn parent(&self) -> &'a Resource {
        self.parent
    }

    #[must_use]
    pub const fn declaration(&self) -> &'a AssociationDecl {
        self.decl
    }

    /// Returns the resolved target model.
    #[must_use]
    pub const fn target(&self) -> &Model {
        &self.target
    }

    /// Returns the accumulated query parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the value the parent already holds for this association.
    #[must_use]
    pub fn existing(&self) -> Option<&'a AttrValue> {
        self.parent.attributes().get(self.decl.name())
    }

    /// Fetches the associated data, or returns what the parent already has.
    ///
    /// - A parent with no attributes at all, or one holding an explicit
    ///   null or empty value with no parameters, yields the default.
    /// - A parent holding a non-blank value with no parameters yields a
    ///   copy of that value.
    /// - Otherwise the target is requested through `transport`. When the
    ///   request path cannot be built yet (unsaved parent), the default is
    ///   returned without a request.
    ///
    /// Fetched data is never written back onto the parent.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged, and [`ResourceError::UnknownModel`]
    /// if the target type is not registered.
    pub async fn fetch<T: Transport>(&self, transport: &T) -> Result<AttrValue, ResourceError> {
        let attributes = self.parent.attributes();
        if attributes.is_empty() {
            return Ok(self.decl.default_value());
        }

        let existing = self.existing();
        if self.params.is_empty() {
            if existing.is_some_and(AttrValue::is_nil_or_empty) {
                return Ok(self.decl.default_value());
            }
            if let Some(value) = existing.filter(|value| !value.is_blank()) {
                return Ok(value.clone());
            }
        }

        if self.decl.kind() == AssociationKind::BelongsTo && self.foreign_key_is_blank() {
            return Ok(self.decl.default_value());
        }

        let Some(path) = self.request_path() else {
            return Ok(self.decl.default_value());
        };

        tracing::debug!(
            parent = %self.parent.model().name(),
            association = %self.decl.name(),
            path = %path,
            "Fetching association"
        );

        self.target
            .get(transport, &path, &self.params, self.decl.shape())
            .await
    }

    /// Fetches with `extra` merged over the current parameters.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn fetch_with<T: Transport>(
        &self,
        transport: &T,
        extra: Params,
    ) -> Result<AttrValue, ResourceError> {
        self.where_(extra).fetch(transport).await
    }

    /// Returns a copy with `extra` merged into the parameters.
    ///
    /// Values in `extra` win. When `extra` is empty and the parent holds no
    /// value, the copy is identical to the receiver.
    #[doc(alias = "where")]
    #[must_use]
    pub fn where_(&self, extra: Params) -> Self {
        let mut chained = self.clone();
        if extra.is_empty() && self.existing().map_or(true, AttrValue::is_blank) {
            return chained;
        }
        chained.params.extend(extra);
        chained
    }

    /// Alias for [`where_`](Self::where_).
    #[must_use]
    pub fn all(&self, extra: Params) -> Self {
        self.where_(extra)
    }

    /// Fetches one member of the association by identifier.
    ///
    /// A blank `id` returns `None` without a request, as does a parent whose
    /// path is not available yet.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged.
    pub async fn find<T: Transport>(
        &self,
        transport: &T,
        id: impl Into<Value>,
    ) -> Result<Option<Resource>, ResourceError> {
        let id = id.into();
        let Some(segment) = path_segment(&id) else {
            return Ok(None);
        };

        if self.decl.kind() == AssociationKind::BelongsTo {
            return self.target.find(transport, id, &self.params).await;
        }

        let path = PathBuilder::new(self.parent).build(|parent| {
            parent.member_path(&self.params).map(|base| {
                format!(
                    "{base}{}/{}",
                    self.decl.path_template(),
                    urlencoding::encode(&segment)
                )
            })
        });
        let Some(path) = path else {
            return Ok(None);
        };

        let value = self
            .target
            .get(transport, &path, &self.params, Shape::Single)
            .await?;
        Ok(value.into_resource())
    }

    /// Builds a new target resource linked to the parent.
    ///
    /// For `has_many` and `has_one`, the parent's foreign key
    /// (`<parent root element>_id`) is set to the parent's identifier.
    ///
    /// # Errors
    ///
    /// Returns transport errors when the target requests a template object
    /// from the server.
    pub async fn build<T: Transport>(
        &self,
        transport: &T,
        mut attrs: Map<String, Value>,
    ) -> Result<Resource, ResourceError> {
        if self.decl.kind() != AssociationKind::BelongsTo {
            let key = format!("{}_id", self.parent.model().config().root_element());
            let parent_id = self.parent.id().cloned().unwrap_or(Value::Null);
            attrs.insert(key, parent_id);
        }
        self.target.build_remote(transport, attrs).await
    }

    fn foreign_key_is_blank(&self) -> bool {
        let attributes = self.parent.attributes();
        let blank = |key: &str| attributes.get(key).map_or(true, AttrValue::is_blank);
        blank(self.decl.foreign_key_name()) && blank(self.decl.data_key_name())
    }

    fn request_path(&self) -> Option<String> {
        let builder = PathBuilder::new(self.parent);
        match self.decl.kind() {
            AssociationKind::HasMany | AssociationKind::HasOne => builder.build(|parent| {
                parent
                    .member_path(&self.params)
                    .map(|base| format!("{base}{}", self.decl.path_template()))
            }),
            AssociationKind::BelongsTo => builder.build(|parent| {
                let target_key = self.target.config().primary_key();
                let foreign_key = parent
                    .attributes()
                    .get(self.decl.foreign_key_name())
                    .and_then(AttrValue::as_json)
                    .cloned();

                // The template's `{id}` always names the target's key.
                build_path(self.decl.path_template(), |key| {
                    if key == target_key || key == "id" {
                        return foreign_key.clone();
                    }
                    self.params
                        .get(key)
                        .cloned()
                        .or_else(|| parent.attributes().get(key).and_then(AttrValue::as_json).cloned())
                })
                .map(|path| path.trim_start_matches('/').to_string())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_many_defaults() {
        let decl = AssociationDecl::has_many("comments");

        assert_eq!(decl.kind(), AssociationKind::HasMany);
        assert_eq!(decl.target_name(), "Comment");
        assert_eq!(decl.path_template(), "/comments");
        assert_eq!(decl.data_key_name(), "comments");
        assert!(!decl.is_included_in_parse());
        assert_eq!(decl.default_value(), AttrValue::Collection(Collection::new()));
        assert_eq!(decl.shape(), Shape::Collection);
    }

    #[test]
    fn test_has_one_defaults() {
        let decl = AssociationDecl::has_one("role");

        assert_eq!(decl.target_name(), "Role");
        assert_eq!(decl.path_template(), "/role");
        assert_eq!(decl.default_value(), AttrValue::Json(Value::Null));
        assert_eq!(decl.shape(), Shape::Single);
    }

    #[test]
    fn test_belongs_to_defaults() {
        let decl = AssociationDecl::belongs_to("organization");

        assert_eq!(decl.target_name(), "Organization");
        assert_eq!(decl.path_template(), "/organizations/{id}");
        assert_eq!(decl.foreign_key_name(), "organization_id");
        assert_eq!(decl.data_key_name(), "organization");
    }

    #[test]
    fn test_overrides() {
        let decl = AssociationDecl::has_many("posts")
            .class_name("Foo::Article")
            .path("/articles")
            .data_key("article_list")
            .include_in_parse(true)
            .default(serde_json::json!([]));

        assert_eq!(decl.name(), "posts");
        assert_eq!(decl.target_name(), "Foo::Article");
        assert_eq!(decl.path_template(), "/articles");
        assert_eq!(decl.data_key_name(), "article_list");
        assert!(decl.is_included_in_parse());
        assert_eq!(decl.default_value(), AttrValue::Json(serde_json::json!([])));
    }

    #[test]
    fn test_irregular_names_classify() {
        assert_eq!(AssociationDecl::has_many("people").target_name(), "Person");
        assert_eq!(
            AssociationDecl::has_many("blog_posts").target_name(),
            "BlogPost"
        );
    }
}
