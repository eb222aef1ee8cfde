//! The HTTP boundary used by models and associations.
//!
//! Models never talk to an HTTP client directly. They go through the
//! [`Transport`] trait, which returns decoded JSON bodies and nothing else.
//! [`RestClient`] implements it; tests can substitute an in-memory transport.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::{HttpMethod, RestClient};
use crate::rest::errors::ResourceError;

/// Query parameters accumulated by models and associations.
pub type Params = Map<String, Value>;

/// A request/response capability returning decoded JSON.
///
/// Each call is a single request. Transport failures are returned as-is and
/// never retried by the caller.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Issues a GET for `path` with `params` as the query string.
    async fn fetch(&self, path: &str, params: &Params) -> Result<Value, ResourceError>;

    /// Sends `body` to `path` with `method`.
    async fn send(&self, method: HttpMethod, path: &str, body: Value)
        -> Result<Value, ResourceError>;
}

impl Transport for RestClient {
    async fn fetch(&self, path: &str, params: &Params) -> Result<Value, ResourceError> {
        let query = (!params.is_empty()).then(|| to_query(params));
        let response = self.get(path, query).await?;
        Ok(response.body)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Value,
    ) -> Result<Value, ResourceError> {
        let response = match method {
            HttpMethod::Get => self.get(path, None).await?,
            HttpMethod::Post => self.post(path, body, None).await?,
            HttpMethod::Put => self.put(path, body, None).await?,
            HttpMethod::Delete => self.delete(path, None).await?,
        };
        Ok(response.body)
    }
}

/// Flattens query parameters into string pairs.
///
/// - Null values are skipped
/// - Strings are used as-is
/// - Numbers and booleans use their JSON text
/// - Arrays are comma-joined; members that are themselves arrays or objects
///   use their JSON text
/// - Objects are expanded into bracketed keys, so `{"filter": {"state":
///   "open"}}` becomes `filter[state]=open`, recursively
///
/// Repeated keys (`ids[]=1&ids[]=2`) cannot be expressed by the returned
/// map, which is why arrays are joined instead.
#[must_use]
pub fn to_query(params: &Params) -> HashMap<String, String> {
    let mut query = HashMap::with_capacity(params.len());
    for (key, value) in params {
        flatten_into(&mut query, key.clone(), value);
    }
    query
}

fn flatten_into(query: &mut HashMap<String, String>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            query.insert(key, s.clone());
        }
        Value::Bool(_) | Value::Number(_) => {
            query.insert(key, value.to_string());
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            query.insert(key, joined);
        }
        Value::Object(map) => {
            for (child, nested) in map {
                flatten_into(query, format!("{key}[{child}]"), nested);
            }
        }
    }
}

/// Converts a serializable params struct into [`Params`].
///
/// # Errors
///
/// Returns [`ResourceError::Serialization`] if `value` does not serialize
/// to a JSON object.
pub fn params_from<T: Serialize>(value: &T) -> Result<Params, ResourceError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Params::new()),
        other => Err(ResourceError::Serialization(serde::de::Error::custom(
            format!("query parameters must serialize to an object, got {other}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_to_query_flattens_values() {
        let query = to_query(&params(json!({
            "approved": 1,
            "author": "tobias",
            "draft": false,
            "ids": [1, 2, 3],
            "tags": ["a", "b"],
            "deleted_at": null,
        })));

        assert_eq!(query.get("approved"), Some(&"1".to_string()));
        assert_eq!(query.get("author"), Some(&"tobias".to_string()));
        assert_eq!(query.get("draft"), Some(&"false".to_string()));
        assert_eq!(query.get("ids"), Some(&"1,2,3".to_string()));
        assert_eq!(query.get("tags"), Some(&"a,b".to_string()));
        assert!(!query.contains_key("deleted_at"));
    }

    #[test]
    fn test_to_query_expands_objects_into_brackets() {
        let query = to_query(&params(json!({
            "filter": {
                "state": "open",
                "author": {"id": 7, "deleted": null},
                "labels": ["bug", "ui"],
            },
        })));

        assert_eq!(query.len(), 3);
        assert_eq!(query.get("filter[state]"), Some(&"open".to_string()));
        assert_eq!(query.get("filter[author][id]"), Some(&"7".to_string()));
        assert_eq!(query.get("filter[labels]"), Some(&"bug,ui".to_string()));
        assert!(!query.contains_key("filter"));
    }

    #[test]
    fn test_params_from_struct() {
        #[derive(Serialize)]
        struct CommentQuery {
            approved: bool,
            limit: u32,
        }

        let params = params_from(&CommentQuery {
            approved: true,
            limit: 10,
        })
        .unwrap();

        assert_eq!(params.get("approved"), Some(&json!(true)));
        assert_eq!(params.get("limit"), Some(&json!(10)));
    }

    #[test]
    fn test_params_from_rejects_non_objects() {
        let result = params_from(&vec![1, 2]);
        assert!(matches!(result, Err(ResourceError::Serialization(_))));
    }
}
