//! Error types for resource and association operations.
//!
//! Expected "not ready yet" conditions are not errors here: an association
//! whose path cannot be built returns its default value, and `find` with a
//! blank identifier returns `None`. What remains are lookup failures,
//! misuse of nested assignment, and transport failures passed through from
//! the HTTP collaborator.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::rest::ResourceError;
//!
//! match user.association("comments") {
//!     Ok(comments) => { /* ... */ }
//!     Err(ResourceError::UnknownAssociation { model, name }) => {
//!         println!("{model} does not declare {name}");
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use crate::clients::{HttpError, RestError};
use crate::rest::path::PathUnavailable;
use thiserror::Error;

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No model with this name is registered.
    ///
    /// Association targets are resolved by name on first use, so this is
    /// reported when the association is accessed, not when it is declared.
    #[error("No model named '{name}' is registered")]
    UnknownModel {
        /// The type name that was looked up.
        name: String,
    },

    /// The model declares no association with this name.
    #[error("{model} has no association named '{name}'")]
    UnknownAssociation {
        /// The model the association was requested on.
        model: String,
        /// The requested association name.
        name: String,
    },

    /// Nested attributes could not be assigned.
    #[error("Cannot assign nested attributes to '{association}': {reason}")]
    NestedAssignment {
        /// The association name.
        association: String,
        /// Why the assignment was rejected.
        reason: String,
    },

    /// A request path could not be built for an operation that needs one.
    #[error(transparent)]
    PathUnavailable(#[from] PathUnavailable),

    /// A resource could not be converted to or from a typed value.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A REST-level error occurred.
    #[error(transparent)]
    Rest(#[from] RestError),
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpResponseError;

    #[test]
    fn test_unknown_association_message() {
        let error = ResourceError::UnknownAssociation {
            model: "Foo::User".to_string(),
            name: "posts".to_string(),
        };
        assert_eq!(error.to_string(), "Foo::User has no association named 'posts'");
    }

    #[test]
    fn test_path_unavailable_converts_transparently() {
        let unavailable = PathUnavailable {
            placeholder: "id".to_string(),
            template: "users/{id}".to_string(),
        };
        let error: ResourceError = unavailable.into();

        assert!(matches!(error, ResourceError::PathUnavailable(_)));
        assert!(error.to_string().contains("users/{id}"));
    }

    #[test]
    fn test_http_error_passes_through() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 503,
            message: r#"{"error":"Unavailable"}"#.to_string(),
            error_reference: None,
        });
        let error: ResourceError = http_error.into();

        assert_eq!(error.to_string(), r#"{"error":"Unavailable"}"#);
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ResourceError::UnknownModel {
            name: "Gang".to_string(),
        };
        let _: &dyn std::error::Error = &error;
    }
}
