//! Deferred-result adapters over repository trait objects.
//!
//! An adapter owns a shared handle to one repository and exposes every
//! operation as a [`DeferredResult`], giving controllers a uniform
//! composition surface regardless of how the repository completes.
//! Failures produced inside a repository pass through unchanged.

use std::sync::Arc;

use crate::deferred::DeferredResult;
use crate::document::Resource;
use crate::parser::ResourceId;
use crate::query::QueryAdapter;
use crate::repository::{JsonApiResponse, RelationshipRepository, ResourceRepository};

/// Uniform deferred surface over one resource repository.
#[derive(Clone)]
pub struct ResourceRepositoryAdapter {
    repository: Arc<dyn ResourceRepository>,
}

impl ResourceRepositoryAdapter {
    /// Wraps a repository handle.
    #[must_use]
    pub fn new(repository: Arc<dyn ResourceRepository>) -> Self {
        Self { repository }
    }

    /// Invokes the repository's find-all-with-query operation.
    pub fn find_all(&self, query: QueryAdapter) -> DeferredResult<JsonApiResponse> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move { repository.find_all(&query).await })
    }

    /// Invokes the repository's find-all-by-ids-with-query operation.
    pub fn find_all_by_ids(
        &self,
        ids: Vec<ResourceId>,
        query: QueryAdapter,
    ) -> DeferredResult<JsonApiResponse> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move { repository.find_all_by_ids(&ids, &query).await })
    }

    /// Invokes the repository's find-one operation.
    pub fn find_one(&self, id: ResourceId, query: QueryAdapter) -> DeferredResult<JsonApiResponse> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move { repository.find_one(&id, &query).await })
    }

    /// Invokes the repository's create operation.
    pub fn create(&self, resource: Resource, query: QueryAdapter) -> DeferredResult<JsonApiResponse> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move { repository.create(resource, &query).await })
    }

    /// Invokes the repository's update operation.
    pub fn update(&self, resource: Resource, query: QueryAdapter) -> DeferredResult<JsonApiResponse> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move { repository.update(resource, &query).await })
    }

    /// Invokes the repository's delete operation.
    pub fn delete(&self, id: ResourceId) -> DeferredResult<()> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move { repository.delete(&id).await })
    }
}

impl std::fmt::Debug for ResourceRepositoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRepositoryAdapter").finish_non_exhaustive()
    }
}

/// Uniform deferred surface over one relationship repository.
#[derive(Clone)]
pub struct RelationshipRepositoryAdapter {
    repository: Arc<dyn RelationshipRepository>,
}

impl RelationshipRepositoryAdapter {
    /// Wraps a relationship repository handle.
    #[must_use]
    pub fn new(repository: Arc<dyn RelationshipRepository>) -> Self {
        Self { repository }
    }

    /// Invokes the repository's find-related operation.
    pub fn find_related(
        &self,
        source_id: ResourceId,
        name: String,
        query: QueryAdapter,
    ) -> DeferredResult<JsonApiResponse> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(
            async move { repository.find_related(&source_id, &name, &query).await },
        )
    }

    /// Replaces the relationship's targets.
    pub fn set_relation(
        &self,
        source_id: ResourceId,
        name: String,
        targets: Vec<ResourceId>,
        query: QueryAdapter,
    ) -> DeferredResult<()> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move {
            repository
                .set_relation(&source_id, &name, &targets, &query)
                .await
        })
    }

    /// Adds targets to a to-many relationship.
    pub fn add_relations(
        &self,
        source_id: ResourceId,
        name: String,
        targets: Vec<ResourceId>,
        query: QueryAdapter,
    ) -> DeferredResult<()> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move {
            repository
                .add_relations(&source_id, &name, &targets, &query)
                .await
        })
    }

    /// Removes targets from a to-many relationship.
    pub fn remove_relations(
        &self,
        source_id: ResourceId,
        name: String,
        targets: Vec<ResourceId>,
        query: QueryAdapter,
    ) -> DeferredResult<()> {
        let repository = Arc::clone(&self.repository);
        DeferredResult::from_future(async move {
            repository
                .remove_relations(&source_id, &name, &targets, &query)
                .await
        })
    }
}

impl std::fmt::Debug for RelationshipRepositoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipRepositoryAdapter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::DispatchError;
    use crate::repository::ResponseData;

    struct OneTask;

    #[async_trait]
    impl ResourceRepository for OneTask {
        async fn find_all(&self, _query: &QueryAdapter) -> Result<JsonApiResponse, DispatchError> {
            Ok(JsonApiResponse::many(&[json!({"id": 1, "name": "sample task"})])?)
        }

        async fn find_all_by_ids(
            &self,
            ids: &[ResourceId],
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            if ids.contains(&ResourceId::Integer(1)) {
                Ok(JsonApiResponse::many(&[json!({"id": 1, "name": "sample task"})])?)
            } else {
                Ok(JsonApiResponse::none())
            }
        }

        async fn find_one(
            &self,
            _id: &ResourceId,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            Ok(JsonApiResponse::none())
        }

        async fn create(
            &self,
            _resource: Resource,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            Err(DispatchError::repository(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "read-only store",
            )))
        }

        async fn update(
            &self,
            _resource: Resource,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            Ok(JsonApiResponse::none())
        }

        async fn delete(&self, _id: &ResourceId) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_adapter_defers_find_all() {
        let adapter = ResourceRepositoryAdapter::new(Arc::new(OneTask));
        let response = adapter.find_all(QueryAdapter::empty()).resolve().await.unwrap();
        assert!(matches!(response.data(), ResponseData::Many(values) if values.len() == 1));
    }

    #[test]
    fn test_adapter_resolves_without_a_full_runtime() {
        let adapter = ResourceRepositoryAdapter::new(Arc::new(OneTask));
        let response = tokio_test::block_on(
            adapter
                .find_one(ResourceId::Integer(9), QueryAdapter::empty())
                .resolve(),
        )
        .unwrap();
        assert_eq!(response.data(), &ResponseData::None);
    }

    #[tokio::test]
    async fn test_adapter_passes_repository_failures_through() {
        let adapter = ResourceRepositoryAdapter::new(Arc::new(OneTask));
        let error = adapter
            .create(Resource::new("tasks"), QueryAdapter::empty())
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::Repository(_)));
        assert!(error.to_string().contains("read-only store"));
    }
}
