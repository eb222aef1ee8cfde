//! Attribute values and resolved collections.
//!
//! An attribute is either plain JSON, a nested [`Resource`] or a
//! [`Collection`] of resources. Nested values appear once association data
//! has been parsed out of a payload or assigned through nested attributes.

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::rest::resource::Resource;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Plain JSON (scalars, arrays and objects that are not associations).
    Json(Value),
    /// A nested resource.
    Resource(Box<Resource>),
    /// A resolved list of resources.
    Collection(Collection),
}

impl AttrValue {
    /// Returns `true` for null, `false`, empty or whitespace-only strings,
    /// empty arrays and objects, and empty collections.
    ///
    /// A nested resource is never blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Json(value) => json_is_blank(value),
            Self::Resource(_) => false,
            Self::Collection(collection) => collection.is_empty(),
        }
    }

    /// Returns `true` for null and for empty strings, arrays, objects and
    /// collections.
    ///
    /// Unlike [`is_blank`](Self::is_blank), `false` and whitespace strings
    /// are not considered empty.
    #[must_use]
    pub fn is_nil_or_empty(&self) -> bool {
        match self {
            Self::Json(Value::Null) => true,
            Self::Json(Value::String(s)) => s.is_empty(),
            Self::Json(Value::Array(items)) => items.is_empty(),
            Self::Json(Value::Object(map)) => map.is_empty(),
            Self::Json(_) | Self::Resource(_) => false,
            Self::Collection(collection) => collection.is_empty(),
        }
    }

    /// Returns the plain JSON form of this value.
    ///
    /// Nested resources are rendered with all of their attributes.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Resource(resource) => resource.to_json(),
            Self::Collection(collection) => collection.to_json_value(),
        }
    }

    /// Returns the JSON value, if this is plain JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested resource, if any.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(resource) => Some(&**resource),
            _ => None,
        }
    }

    /// Returns the collection, if any.
    #[must_use]
    pub const fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Converts this value into a resource.
    ///
    /// A collection yields its first member. Plain JSON yields `None`.
    #[must_use]
    pub fn into_resource(self) -> Option<Resource> {
        match self {
            Self::Resource(resource) => Some(*resource),
            Self::Collection(collection) => collection.into_iter().next(),
            Self::Json(_) => None,
        }
    }

    /// Converts this value into a collection.
    ///
    /// A single resource becomes a one-element collection. Plain JSON yields
    /// an empty collection.
    #[must_use]
    pub fn into_collection(self) -> Collection {
        match self {
            Self::Collection(collection) => collection,
            Self::Resource(resource) => Collection::from(vec![*resource]),
            Self::Json(_) => Collection::default(),
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Resource> for AttrValue {
    fn from(resource: Resource) -> Self {
        Self::Resource(Box::new(resource))
    }
}

impl From<Collection> for AttrValue {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

/// Blank test for raw JSON values.
pub(crate) fn json_is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) | Value::Number(_) => false,
    }
}

/// An ordered list of resources parsed from plural data.
///
/// Derefs to `Vec<Resource>`, so slice and vector methods are available
/// directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Resource>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns the members as a JSON array of their full attributes.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        Value::Array(self.items.iter().map(Resource::to_json).collect())
    }

    /// Consumes the collection and returns the members.
    #[must_use]
    pub fn into_inner(self) -> Vec<Resource> {
        self.items
    }
}

impl From<Vec<Resource>> for Collection {
    fn from(items: Vec<Resource>) -> Self {
        Self { items }
    }
}

impl FromIterator<Resource> for Collection {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Collection {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Deref for Collection {
    type Target = Vec<Resource>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl DerefMut for Collection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}
