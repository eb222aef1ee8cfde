//! Root element negotiation for response and request bodies.
//!
//! On the way in, [`extract`] unwraps a payload from the model's parsed root
//! element and [`resolve`] decides whether a response holds one resource or
//! many. On the way out, [`wrap`] nests request parameters under the
//! included root element.
//!
//! Extraction is permissive: a missing root key, or a body of an unexpected
//! shape, falls back to the body itself instead of failing.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::{shape, ModelConfig};
//! use serde_json::json;
//!
//! let config = ModelConfig::builder("Foo::User")
//!     .parse_root_in_json(true)
//!     .include_root_in_json(true)
//!     .build()
//!     .unwrap();
//!
//! let body = json!({"user": {"id": 1, "name": "A"}});
//! let inner = shape::extract(&config, body.clone());
//! assert_eq!(inner, json!({"id": 1, "name": "A"}));
//!
//! let wrapped = shape::wrap(&config, inner.as_object().cloned().unwrap());
//! assert_eq!(wrapped, body);
//! ```

use serde_json::{Map, Value};

use crate::rest::model::ModelConfig;

/// The shape a request expects its response to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One resource (`find`, `has_one`, `belongs_to`).
    Single,
    /// A list of resources (`all`, `has_many`).
    Collection,
}

/// A response body after root extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Data for a single resource.
    One(Value),
    /// Data for each member of a collection, already extracted.
    Many(Vec<Value>),
}

/// Unwraps `body` from the model's parsed root element.
///
/// Returns `body` unchanged when root parsing is off, when `body` is not an
/// object, or when the root key is absent.
#[must_use]
pub fn extract(config: &ModelConfig, body: Value) -> Value {
    let Some(root) = config.parsed_root_element() else {
        return body;
    };

    match body {
        Value::Object(mut map) => match map.remove(root) {
            Some(inner) => inner,
            None => {
                tracing::debug!(
                    model = %config.name(),
                    root,
                    "Root element absent from payload, using payload as-is"
                );
                Value::Object(map)
            }
        },
        other => other,
    }
}

/// Locates the array in a collection response.
///
/// With the `active_model_serializers` format, a non-array body is expected
/// to hold the array under the pluralized root element. Otherwise the body
/// is returned unchanged.
#[must_use]
pub fn extract_array(config: &ModelConfig, body: Value) -> Value {
    if !config.is_active_model_serializers_format() || body.is_array() {
        return body;
    }
    let Some(plural) = config.pluralized_parsed_root_element() else {
        return body;
    };

    match body {
        Value::Object(mut map) => match map.remove(&plural) {
            Some(items) => items,
            None => {
                tracing::debug!(
                    model = %config.name(),
                    root = %plural,
                    "Plural root element absent from collection payload, using payload as-is"
                );
                Value::Object(map)
            }
        },
        other => other,
    }
}

/// Resolves a decoded response body into one or many resource payloads.
///
/// An array body always yields [`RawPayload::Many`], each item passed
/// through [`extract`]. For [`Shape::Collection`] the array is first looked
/// up with [`extract_array`].
#[must_use]
pub fn resolve(config: &ModelConfig, body: Value, shape: Shape) -> RawPayload {
    let body = match shape {
        Shape::Collection => extract_array(config, body),
        Shape::Single => body,
    };

    match body {
        Value::Array(items) => RawPayload::Many(
            items
                .into_iter()
                .map(|item| extract(config, item))
                .collect(),
        ),
        other => RawPayload::One(extract(config, other)),
    }
}

/// Wraps request parameters under the model's included root element.
#[must_use]
pub fn wrap(config: &ModelConfig, params: Map<String, Value>) -> Value {
    match config.included_root_element() {
        Some(root) => {
            let mut wrapped = Map::with_capacity(1);
            wrapped.insert(root.to_string(), Value::Object(params));
            Value::Object(wrapped)
        }
        None => Value::Object(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::model::{ModelConfigBuilder, ParseFormat};
    use serde_json::json;

    fn model_config(build: impl FnOnce(ModelConfigBuilder) -> ModelConfigBuilder) -> ModelConfig {
        build(ModelConfig::builder("Foo::User")).build().unwrap()
    }

    #[test]
    fn test_extract_is_identity_without_parse_root() {
        let config = model_config(|b| b);
        let body = json!({"user": {"id": 1}});
        assert_eq!(extract(&config, body.clone()), body);
    }

    #[test]
    fn test_extract_unwraps_default_root() {
        let config = model_config(|b| b.parse_root_in_json(true));
        let body = json!({"user": {"id": 1, "name": "A"}});
        assert_eq!(extract(&config, body), json!({"id": 1, "name": "A"}));
    }

    #[test]
    fn test_extract_falls_back_when_root_absent() {
        let config = model_config(|b| b.parse_root_in_json(true));
        let body = json!({"id": 1, "name": "A"});
        assert_eq!(extract(&config, body.clone()), body);
    }

    #[test]
    fn test_extract_uses_named_root() {
        let config = model_config(|b| b.parse_root_in_json("person"));
        let body = json!({"person": {"id": 1}});
        assert_eq!(extract(&config, body), json!({"id": 1}));
    }

    #[test]
    fn test_extract_leaves_non_objects_alone() {
        let config = model_config(|b| b.parse_root_in_json(true));
        assert_eq!(extract(&config, json!([1, 2])), json!([1, 2]));
        assert_eq!(extract(&config, json!("text")), json!("text"));
    }

    #[test]
    fn test_resolve_collection_with_plain_format_extracts_each_item() {
        let config = model_config(|b| b.parse_root_in_json(true));
        let body = json!([{"user": {"id": 1, "fullname": "Lindsay"}}]);

        assert_eq!(
            resolve(&config, body, Shape::Collection),
            RawPayload::Many(vec![json!({"id": 1, "fullname": "Lindsay"})])
        );
    }

    #[test]
    fn test_resolve_collection_with_ams_uses_pluralized_root() {
        let config = model_config(|b| {
            b.parse_root_in_json(true)
                .parse_format(ParseFormat::ActiveModelSerializers)
        });
        let body = json!({"users": [{"id": 1, "name": "X"}]});

        assert_eq!(
            resolve(&config, body, Shape::Collection),
            RawPayload::Many(vec![json!({"id": 1, "name": "X"})])
        );
    }

    #[test]
    fn test_resolve_collection_without_ams_keeps_object() {
        let config = model_config(|b| b.parse_root_in_json(true));
        let body = json!({"users": [{"id": 1}]});

        assert_eq!(
            resolve(&config, body.clone(), Shape::Collection),
            RawPayload::One(body)
        );
    }

    #[test]
    fn test_ams_named_root_is_pluralized() {
        let config = model_config(|b| {
            b.parse_root_in_json("person")
                .parse_format(ParseFormat::ActiveModelSerializers)
        });
        let body = json!({"people": [{"id": 1}]});

        assert_eq!(
            resolve(&config, body, Shape::Collection),
            RawPayload::Many(vec![json!({"id": 1})])
        );
    }

    #[test]
    fn test_resolve_single_with_ams_uses_singular_root() {
        let config = model_config(|b| {
            b.parse_root_in_json(true)
                .parse_format(ParseFormat::ActiveModelSerializers)
        });
        let body = json!({"user": {"id": 1}});

        assert_eq!(
            resolve(&config, body, Shape::Single),
            RawPayload::One(json!({"id": 1}))
        );
    }

    #[test]
    fn test_wrap_with_default_and_named_root() {
        let mut params = Map::new();
        params.insert("name".to_string(), json!("A"));

        let config = model_config(|b| b.include_root_in_json(true));
        assert_eq!(wrap(&config, params.clone()), json!({"user": {"name": "A"}}));

        let config = model_config(|b| b.include_root_in_json("person"));
        assert_eq!(wrap(&config, params.clone()), json!({"person": {"name": "A"}}));

        let config = model_config(|b| b);
        assert_eq!(wrap(&config, params), json!({"name": "A"}));
    }
}
