//! Error types for the dispatch core.
//!
//! Request-time failures are represented by [`DispatchError`]. Errors are
//! never translated into degraded responses inside the core: they travel
//! on the failure channel of a [`DeferredResult`](crate::DeferredResult)
//! to the boundary layer, which renders them into the wire error format.
//!
//! # Taxonomy
//!
//! - [`DispatchError::ResourceNotFound`]: the requested resource type
//!   has no registry entry (404 class, names the missing type).
//! - [`DispatchError::RequestBodyMismatch`]: the request body declares a
//!   type that is neither the endpoint type nor a registered subtype of
//!   it (4xx class, carries verb and both type names).
//! - [`DispatchError::Repository`]: an upstream repository failure,
//!   passed through the mapping chain unchanged. The core never retries.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_core::DispatchError;
//!
//! let error = DispatchError::ResourceNotFound {
//!     resource_type: "tasks".to_string(),
//! };
//! assert!(error.to_string().contains("tasks"));
//! assert_eq!(error.status_code(), 404);
//! ```

use thiserror::Error;

use crate::http::HttpMethod;
use crate::parser::IdKind;

/// Errors that can occur while dispatching a request.
///
/// Each variant carries enough context to render a diagnosable wire
/// error: missing type names, mismatched body types with the verb that
/// triggered the check, unparseable path ids.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested resource type has no registry entry.
    #[error("Resource of type '{resource_type}' not found. No repository is registered for it.")]
    ResourceNotFound {
        /// The exact type name that was requested.
        resource_type: String,
    },

    /// The path names a relationship or field the resource type does not declare.
    #[error("Resource type '{resource_type}' has no field or relationship named '{field}'.")]
    ResourceFieldNotFound {
        /// The resource type that was addressed.
        resource_type: String,
        /// The unknown relationship or field name from the path.
        field: String,
    },

    /// The request body's declared type is incompatible with the endpoint type.
    #[error(
        "Inconsistent type definition between path and body for {method}: \
         endpoint type '{expected}', body type '{actual}'."
    )]
    RequestBodyMismatch {
        /// The verb of the offending request.
        method: HttpMethod,
        /// The type registered for the endpoint path.
        expected: String,
        /// The type declared by the request body.
        actual: String,
    },

    /// A body-mutating request arrived without a primary data section.
    #[error("A request body with primary data is required for {method} requests.")]
    RequestBodyMissing {
        /// The verb of the offending request.
        method: HttpMethod,
    },

    /// The raw URL path could not be parsed into a resource path.
    #[error("Cannot parse '{path}' as a resource path.")]
    InvalidPath {
        /// The raw path that was rejected.
        path: String,
    },

    /// A path id string could not be converted to the repository's id type.
    #[error("Cannot parse id '{value}' as {kind} for resource type '{resource_type}'.")]
    IdParse {
        /// The raw id segment from the path.
        value: String,
        /// The id kind declared by the resource's registry entry.
        kind: IdKind,
        /// The resource type whose id field rejected the value.
        resource_type: String,
    },

    /// No controller accepts the given path shape and verb.
    #[error("No handler accepts {method} requests for this resource path.")]
    MethodNotAllowed {
        /// The verb that no controller accepted.
        method: HttpMethod,
    },

    /// A repository call failed; the failure propagates unchanged.
    #[error("Repository call failed: {0}")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A domain object could not be serialized into document form.
    #[error("Failed to serialize resource data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DispatchError {
    /// Wraps an arbitrary repository failure for propagation.
    ///
    /// Retry policy, if any, belongs to the repository implementation;
    /// the core only carries the failure to the caller.
    pub fn repository<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Repository(Box::new(source))
    }

    /// Maps the error to the HTTP status class a boundary layer should use.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ResourceNotFound { .. } | Self::ResourceFieldNotFound { .. } => 404,
            Self::RequestBodyMismatch { .. }
            | Self::RequestBodyMissing { .. }
            | Self::InvalidPath { .. }
            | Self::IdParse { .. } => 400,
            Self::MethodNotAllowed { .. } => 405,
            Self::Repository(_) | Self::Serialization(_) => 500,
        }
    }
}

// Verify DispatchError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DispatchError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_names_the_missing_type() {
        let error = DispatchError::ResourceNotFound {
            resource_type: "memoranda".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("memoranda"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_body_mismatch_names_both_types_and_the_verb() {
        let error = DispatchError::RequestBodyMismatch {
            method: HttpMethod::Post,
            expected: "tasks".to_string(),
            actual: "projects".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("POST"));
        assert!(message.contains("tasks"));
        assert!(message.contains("projects"));
    }

    #[test]
    fn test_status_codes_follow_the_taxonomy() {
        assert_eq!(
            DispatchError::ResourceNotFound {
                resource_type: "tasks".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            DispatchError::RequestBodyMissing {
                method: HttpMethod::Patch
            }
            .status_code(),
            400
        );
        assert_eq!(
            DispatchError::MethodNotAllowed {
                method: HttpMethod::Post
            }
            .status_code(),
            405
        );
    }

    #[test]
    fn test_repository_failures_keep_their_source() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "store offline");
        let error = DispatchError::repository(source);
        assert_eq!(error.status_code(), 500);
        assert!(error.to_string().contains("store offline"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = DispatchError::MethodNotAllowed {
            method: HttpMethod::Get,
        };
        let _: &dyn std::error::Error = &error;
    }
}
