//! Parsed resource-path model.
//!
//! A [`JsonPath`] is the parsed representation of the resource part of an
//! inbound URL: the resource type, any id segments, and an optional
//! nested segment addressing either a relationship
//! (`tasks/1/relationships/project`) or the related field itself
//! (`tasks/1/project`). Paths are immutable once built; controllers only
//! read them.
//!
//! # Path forms
//!
//! | raw path                         | shape                         |
//! |----------------------------------|-------------------------------|
//! | `tasks`                          | collection, no ids            |
//! | `tasks/1`                        | single, one id                |
//! | `tasks/1,2,3`                    | collection, id filter         |
//! | `tasks/1/project`                | field segment                 |
//! | `tasks/1/relationships/project`  | relationship segment          |
//!
//! # Example
//!
//! ```rust
//! use jsonapi_core::path::{JsonPath, PathSegment};
//!
//! let path = JsonPath::parse("tasks/1,2").unwrap();
//! assert_eq!(path.resource_type(), "tasks");
//! assert!(path.is_collection());
//! assert_eq!(path.ids(), &["1", "2"]);
//!
//! let path = JsonPath::parse("tasks/1/relationships/project").unwrap();
//! assert_eq!(
//!     path.segment(),
//!     Some(&PathSegment::Relationship("project".to_string()))
//! );
//! ```

use crate::error::DispatchError;

/// A nested path segment following the resource id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// The `relationships/{name}` form: addresses relationship linkage.
    Relationship(String),
    /// The `{name}` form: addresses the related resources themselves.
    Field(String),
}

impl PathSegment {
    /// Returns the relationship or field name the segment addresses.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Relationship(name) | Self::Field(name) => name,
        }
    }
}

/// An immutable parsed resource path.
///
/// Built by [`JsonPath::parse`] from a raw URL path, or directly by a
/// host transport that has already split the URL. Consumed read-only by
/// the controllers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonPath {
    resource_type: String,
    ids: Vec<String>,
    segment: Option<PathSegment>,
}

impl JsonPath {
    /// A plain collection path (`tasks`).
    #[must_use]
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: Vec::new(),
            segment: None,
        }
    }

    /// A collection path narrowed by an id filter (`tasks/1,2`).
    #[must_use]
    pub fn collection_of_ids(resource_type: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids,
            segment: None,
        }
    }

    /// A single-resource path (`tasks/1`).
    #[must_use]
    pub fn single(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: vec![id.into()],
            segment: None,
        }
    }

    /// A relationship path (`tasks/1/relationships/project`).
    #[must_use]
    pub fn relationship(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: vec![id.into()],
            segment: Some(PathSegment::Relationship(name.into())),
        }
    }

    /// A related-field path (`tasks/1/project`).
    #[must_use]
    pub fn field(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            ids: vec![id.into()],
            segment: Some(PathSegment::Field(name.into())),
        }
    }

    /// Parses a raw URL path into a resource path.
    ///
    /// Parsing is purely syntactic; whether the type or relationship is
    /// actually registered is checked later by the controllers.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidPath`] for empty paths, empty
    /// segments, a bare `relationships` segment, or segments past the
    /// relationship name.
    pub fn parse(raw: &str) -> Result<Self, DispatchError> {
        let invalid = || DispatchError::InvalidPath {
            path: raw.to_string(),
        };

        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid());
        }

        let resource_type = segments[0];
        match segments.len() {
            1 => Ok(Self::collection(resource_type)),
            2 => {
                let ids: Vec<String> = segments[1].split(',').map(str::to_string).collect();
                if ids.iter().any(String::is_empty) {
                    return Err(invalid());
                }
                Ok(Self::collection_of_ids(resource_type, ids))
            }
            3 => {
                if segments[1].contains(',') || segments[2] == "relationships" {
                    return Err(invalid());
                }
                Ok(Self::field(resource_type, segments[1], segments[2]))
            }
            4 if segments[2] == "relationships" => {
                if segments[1].contains(',') {
                    return Err(invalid());
                }
                Ok(Self::relationship(resource_type, segments[1], segments[3]))
            }
            _ => Err(invalid()),
        }
    }

    /// The resource type name addressed by the path.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The raw id strings from the path, in path order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The nested relationship or field segment, if any.
    #[must_use]
    pub const fn segment(&self) -> Option<&PathSegment> {
        self.segment.as_ref()
    }

    /// Whether the path addresses a collection of resources.
    ///
    /// A path with exactly one id is a single-resource path; zero ids or
    /// an id filter of several ids address a collection.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.ids.len() != 1
    }

    /// Whether the path carries any id filter at all.
    #[must_use]
    pub fn has_ids(&self) -> bool {
        !self.ids.is_empty()
    }
}

// Verify JsonPath is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JsonPath>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_collection() {
        let path = JsonPath::parse("tasks").unwrap();
        assert_eq!(path.resource_type(), "tasks");
        assert!(path.is_collection());
        assert!(!path.has_ids());
        assert!(path.segment().is_none());
    }

    #[test]
    fn test_parse_single_resource() {
        let path = JsonPath::parse("tasks/1").unwrap();
        assert!(!path.is_collection());
        assert_eq!(path.ids(), &["1"]);
    }

    #[test]
    fn test_parse_id_filtered_collection() {
        let path = JsonPath::parse("tasks/1,2,3").unwrap();
        assert!(path.is_collection());
        assert_eq!(path.ids(), &["1", "2", "3"]);
    }

    #[test]
    fn test_parse_field_path() {
        let path = JsonPath::parse("tasks/1/project").unwrap();
        assert_eq!(
            path.segment(),
            Some(&PathSegment::Field("project".to_string()))
        );
        assert!(!path.is_collection());
    }

    #[test]
    fn test_parse_relationship_path() {
        let path = JsonPath::parse("tasks/1/relationships/project").unwrap();
        assert_eq!(
            path.segment(),
            Some(&PathSegment::Relationship("project".to_string()))
        );
        assert_eq!(path.segment().unwrap().name(), "project");
    }

    #[test]
    fn test_parse_tolerates_surrounding_slashes() {
        let path = JsonPath::parse("/tasks/1/").unwrap();
        assert_eq!(path, JsonPath::single("tasks", "1"));
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        for raw in [
            "",
            "/",
            "tasks//1",
            "tasks/1/relationships",
            "tasks/1/relationships/project/extra",
            "tasks/1,2/project",
            "tasks/1,2/relationships/project",
            "tasks/1,,2",
        ] {
            let error = JsonPath::parse(raw).unwrap_err();
            assert!(
                matches!(error, DispatchError::InvalidPath { ref path } if path == raw),
                "expected InvalidPath for {raw:?}"
            );
        }
    }

    #[test]
    fn test_constructors_match_parsed_forms() {
        assert_eq!(JsonPath::parse("tasks").unwrap(), JsonPath::collection("tasks"));
        assert_eq!(
            JsonPath::parse("tasks/1,2").unwrap(),
            JsonPath::collection_of_ids("tasks", vec!["1".into(), "2".into()])
        );
        assert_eq!(
            JsonPath::parse("tasks/1/relationships/project").unwrap(),
            JsonPath::relationship("tasks", "1", "project")
        );
        assert_eq!(
            JsonPath::parse("tasks/1/project").unwrap(),
            JsonPath::field("tasks", "1", "project")
        );
    }
}
