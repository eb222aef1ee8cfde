//! Request body encoding.
//!
//! [`encode`] turns a resource's attributes into the JSON body sent on
//! create and update:
//!
//! 1. Association data keys are dropped unless the declaration sets
//!    `include_in_parse`.
//! 2. With `send_only_modified_attributes`, only changed keys are kept.
//!    Keys that are absent stay absent.
//! 3. With `send_up_child_params`, nested resources and collections are
//!    encoded with their own model's rules. Otherwise they are sent as plain
//!    JSON of all their attributes.
//! 4. The result is wrapped under the included root element, if any.

use serde_json::{Map, Value};

use crate::rest::model::ModelConfig;
use crate::rest::shape;
use crate::rest::tracking::Attributes;
use crate::rest::value::AttrValue;

/// Encodes `attributes` into a request body for a model with `config`.
#[must_use]
pub fn encode(attributes: &Attributes, config: &ModelConfig) -> Value {
    let excluded: Vec<&str> = config
        .associations()
        .iter()
        .filter(|decl| !decl.is_included_in_parse())
        .map(|decl| decl.data_key_name())
        .collect();

    let params: Map<String, Value> = attributes
        .iter()
        .filter(|(key, _)| !excluded.contains(key))
        .filter(|(key, _)| !config.send_only_modified_attributes() || attributes.is_changed(key))
        .map(|(key, value)| (key.to_string(), encode_value(value, config)))
        .collect();

    shape::wrap(config, params)
}

fn encode_value(value: &AttrValue, config: &ModelConfig) -> Value {
    if !config.send_up_child_params() {
        return value.to_json_value();
    }

    match value {
        AttrValue::Json(json) => json.clone(),
        AttrValue::Resource(resource) => resource.to_request_params(),
        AttrValue::Collection(collection) => {
            Value::Array(collection.iter().map(|item| item.to_request_params()).collect())
        }
    }
}
