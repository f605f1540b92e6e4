//! Repository contracts and the uniform invocation surface.
//!
//! User-supplied repositories implement [`ResourceRepository`] for the
//! resource operations and [`RelationshipRepository`] for relationship
//! traversal and mutation. Both are object-safe async traits so a
//! heterogeneous set of repositories can live behind one registry.
//!
//! Controllers never call a repository trait object directly: they go
//! through [`ResourceRepositoryAdapter`] and
//! [`RelationshipRepositoryAdapter`], which turn every call into a
//! [`DeferredResult`](crate::DeferredResult). A repository may complete
//! synchronously or suspend on external I/O; either way the controller
//! composes against the same deferred surface.

mod adapter;

pub use adapter::{RelationshipRepositoryAdapter, ResourceRepositoryAdapter};

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::document::Resource;
use crate::error::DispatchError;
use crate::parser::ResourceId;
use crate::query::QueryAdapter;

/// The found entity or entities of a repository call.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResponseData {
    /// Nothing was found.
    #[default]
    None,
    /// A single raw domain object, already in JSON value form.
    One(Value),
    /// A collection of raw domain objects.
    Many(Vec<Value>),
}

/// The result wrapper of a repository call.
///
/// Carries the found entity or entities plus any side-loaded related
/// objects, keyed by relationship name, that the document mapper may
/// hoist into a response document's `included` section. `meta` is an
/// opaque payload forwarded to the boundary layer untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonApiResponse {
    data: ResponseData,
    linked: BTreeMap<String, Vec<Value>>,
    meta: Option<Value>,
}

impl JsonApiResponse {
    /// A response with no found data.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A response carrying one found entity.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Serialization`] when the entity cannot be
    /// serialized into JSON value form.
    pub fn one<T: Serialize>(entity: &T) -> Result<Self, DispatchError> {
        Ok(Self {
            data: ResponseData::One(serde_json::to_value(entity)?),
            ..Self::default()
        })
    }

    /// A response carrying a collection of found entities.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Serialization`] when an entity cannot be
    /// serialized into JSON value form.
    pub fn many<'a, T, I>(entities: I) -> Result<Self, DispatchError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let values = entities
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            data: ResponseData::Many(values),
            ..Self::default()
        })
    }

    /// Attaches side-loaded related objects under a relationship name.
    #[must_use]
    pub fn with_linked(mut self, name: impl Into<String>, objects: Vec<Value>) -> Self {
        self.linked.insert(name.into(), objects);
        self
    }

    /// Attaches an opaque meta payload.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The found entity or entities.
    #[must_use]
    pub const fn data(&self) -> &ResponseData {
        &self.data
    }

    /// Consumes the response into its parts: data, linked, meta.
    #[must_use]
    pub fn into_parts(self) -> (ResponseData, BTreeMap<String, Vec<Value>>, Option<Value>) {
        (self.data, self.linked, self.meta)
    }

    /// The side-loaded objects for one relationship name.
    #[must_use]
    pub fn linked(&self, name: &str) -> Option<&[Value]> {
        self.linked.get(name).map(Vec::as_slice)
    }

    /// The opaque meta payload, if any.
    #[must_use]
    pub const fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }
}

/// Find/create/update/delete backend for one resource type.
///
/// Implementations decide their own storage and retry policy; failures
/// returned here propagate to the caller unchanged.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Finds all resources matching the query.
    async fn find_all(&self, query: &QueryAdapter) -> Result<JsonApiResponse, DispatchError>;

    /// Finds all resources with the given ids, narrowed by the query.
    async fn find_all_by_ids(
        &self,
        ids: &[ResourceId],
        query: &QueryAdapter,
    ) -> Result<JsonApiResponse, DispatchError>;

    /// Finds one resource by id.
    async fn find_one(
        &self,
        id: &ResourceId,
        query: &QueryAdapter,
    ) -> Result<JsonApiResponse, DispatchError>;

    /// Creates a resource from a request-body resource object.
    async fn create(
        &self,
        resource: Resource,
        query: &QueryAdapter,
    ) -> Result<JsonApiResponse, DispatchError>;

    /// Updates a resource from a request-body resource object.
    async fn update(
        &self,
        resource: Resource,
        query: &QueryAdapter,
    ) -> Result<JsonApiResponse, DispatchError>;

    /// Deletes one resource by id.
    async fn delete(&self, id: &ResourceId) -> Result<(), DispatchError>;
}

/// Relationship traversal and mutation backend for one resource type.
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Finds the resources related to a source resource via one relationship.
    async fn find_related(
        &self,
        source_id: &ResourceId,
        name: &str,
        query: &QueryAdapter,
    ) -> Result<JsonApiResponse, DispatchError>;

    /// Replaces the relationship's targets; an empty slice clears it.
    async fn set_relation(
        &self,
        source_id: &ResourceId,
        name: &str,
        targets: &[ResourceId],
        query: &QueryAdapter,
    ) -> Result<(), DispatchError>;

    /// Adds targets to a to-many relationship.
    async fn add_relations(
        &self,
        source_id: &ResourceId,
        name: &str,
        targets: &[ResourceId],
        query: &QueryAdapter,
    ) -> Result<(), DispatchError>;

    /// Removes targets from a to-many relationship.
    async fn remove_relations(
        &self,
        source_id: &ResourceId,
        name: &str,
        targets: &[ResourceId],
        query: &QueryAdapter,
    ) -> Result<(), DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Task {
        id: i64,
        name: String,
    }

    #[test]
    fn test_none_carries_no_data() {
        let response = JsonApiResponse::none();
        assert_eq!(response.data(), &ResponseData::None);
        assert!(response.meta().is_none());
    }

    #[test]
    fn test_one_serializes_the_entity() {
        let task = Task {
            id: 1,
            name: "sample task".to_string(),
        };
        let response = JsonApiResponse::one(&task).unwrap();
        assert_eq!(
            response.data(),
            &ResponseData::One(json!({"id": 1, "name": "sample task"}))
        );
    }

    #[test]
    fn test_many_preserves_entity_order() {
        let tasks = vec![
            Task {
                id: 2,
                name: "b".to_string(),
            },
            Task {
                id: 1,
                name: "a".to_string(),
            },
        ];
        let response = JsonApiResponse::many(&tasks).unwrap();
        let ResponseData::Many(values) = response.data() else {
            panic!("expected Many");
        };
        assert_eq!(values[0]["id"], json!(2));
        assert_eq!(values[1]["id"], json!(1));
    }

    #[test]
    fn test_linked_objects_are_keyed_by_relationship() {
        let response = JsonApiResponse::none()
            .with_linked("project", vec![json!({"id": 2, "name": "sample project"})]);
        assert_eq!(response.linked("project").unwrap().len(), 1);
        assert!(response.linked("assignee").is_none());
    }
}
