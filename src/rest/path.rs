//! Request path building for resources and associations.
//!
//! Path templates use `{name}` placeholders that are filled from a
//! resource's attributes and the current query parameters:
//!
//! - `users` - a collection path with no placeholders
//! - `users/{id}` - a member path
//! - `users/{user_id}/comments/{id}` - a nested member path
//!
//! A placeholder that cannot be filled yields [`PathUnavailable`]. This is an
//! expected condition (an unsaved resource has no `id` yet), so
//! [`PathBuilder::build`] turns it into `None` instead of an error.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::build_path;
//! use serde_json::json;
//!
//! let path = build_path("users/{user_id}/comments/{id}", |key| match key {
//!     "user_id" => Some(json!(1)),
//!     "id" => Some(json!("a b")),
//!     _ => None,
//! });
//! assert_eq!(path.unwrap(), "users/1/comments/a%20b");
//!
//! let missing = build_path("users/{id}", |_| None);
//! assert!(missing.is_err());
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::rest::resource::Resource;

/// A path template placeholder could not be filled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Missing value for '{placeholder}' in path '{template}'")]
pub struct PathUnavailable {
    /// The placeholder name, without braces.
    pub placeholder: String,
    /// The template being built.
    pub template: String,
}

/// Result of building a request path.
pub type PathResult = Result<String, PathUnavailable>;

/// Renders a JSON value as a path segment.
///
/// Null and blank strings have no segment. Strings are used as-is and other
/// values use their JSON text.
#[must_use]
pub fn path_segment(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Fills `{name}` placeholders in `template`.
///
/// Each placeholder is looked up as `name` and then as `_name`. Values are
/// percent-encoded.
///
/// # Errors
///
/// Returns [`PathUnavailable`] for the first placeholder with no usable
/// value.
pub fn build_path<F>(template: &str, lookup: F) -> PathResult
where
    F: Fn(&str) -> Option<Value>,
{
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        result.push_str(&rest[..open]);

        let key = &rest[open + 1..close];
        let segment = lookup(key)
            .as_ref()
            .and_then(path_segment)
            .or_else(|| lookup(&format!("_{key}")).as_ref().and_then(path_segment))
            .ok_or_else(|| PathUnavailable {
                placeholder: key.to_string(),
                template: template.to_string(),
            })?;
        result.push_str(&urlencoding::encode(&segment));

        rest = &rest[close + 1..];
    }
    result.push_str(rest);

    Ok(result)
}

/// Evaluates path expressions against a resource.
///
/// An expression that fails with [`PathUnavailable`] yields `None`. Callers
/// treat `None` as "cannot resolve right now" and fall back to a default.
#[derive(Debug, Clone, Copy)]
pub struct PathBuilder<'a> {
    resource: &'a Resource,
}

impl<'a> PathBuilder<'a> {
    /// Creates a builder bound to `resource`.
    #[must_use]
    pub const fn new(resource: &'a Resource) -> Self {
        Self { resource }
    }

    /// Runs `expression` and swallows [`PathUnavailable`].
    pub fn build<F>(&self, expression: F) -> Option<String>
    where
        F: FnOnce(&'a Resource) -> PathResult,
    {
        match expression(self.resource) {
            Ok(path) => Some(path),
            Err(unavailable) => {
                tracing::debug!(
                    model = %self.resource.model().name(),
                    placeholder = %unavailable.placeholder,
                    "Path not available: {}",
                    unavailable
                );
                None
            }
        }
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PathUnavailable>();
    assert_send_sync::<PathBuilder<'static>>();
};
