//! The controller set: one handler per path shape and verb.
//!
//! Every controller answers two questions. [`Controller::is_acceptable`]
//! is a pure predicate over the parsed path shape and the verb: it never
//! consults the registry, so the dispatcher can probe the whole set
//! against any request without side effects. [`Controller::handle_async`]
//! performs the actual work: registry lookup, id parsing, body
//! verification, repository invocation and document mapping, composed as
//! a [`DeferredResult`] chain.
//!
//! Body-mutating controllers verify that the body's declared type is the
//! endpoint type or a registered subtype of it *before* any repository
//! call; a mismatch never reaches user code.

mod collection_get;
mod field_get;
mod relationship_get;
mod relationship_upsert;
mod resource_delete;
mod resource_get;
mod resource_patch;
mod resource_post;

pub use collection_get::CollectionGet;
pub use field_get::FieldResourceGet;
pub use relationship_get::RelationshipsGet;
pub use relationship_upsert::{RelationshipsDelete, RelationshipsPatch, RelationshipsPost};
pub use resource_delete::ResourceDelete;
pub use resource_get::ResourceGet;
pub use resource_patch::ResourcePatch;
pub use resource_post::ResourcePost;

use std::sync::Arc;

use crate::deferred::DeferredResult;
use crate::document::{
    DefaultDocumentMapper, Document, DocumentMapper, DocumentMappingConfig, Nullable,
    ParameterProvider, Resource, ResourceData,
};
use crate::error::DispatchError;
use crate::http::HttpMethod;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::registry::{RegistryEntry, ResourceRegistry};
use crate::response::Response;

pub(crate) const HTTP_OK: u16 = 200;
pub(crate) const HTTP_CREATED: u16 = 201;
pub(crate) const HTTP_NO_CONTENT: u16 = 204;

/// Shared dependencies handed to every controller at construction.
#[derive(Clone)]
pub struct ControllerContext {
    registry: Arc<ResourceRegistry>,
    mapper: Arc<dyn DocumentMapper>,
}

impl ControllerContext {
    /// Creates a context with an explicit document mapper.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>, mapper: Arc<dyn DocumentMapper>) -> Self {
        Self { registry, mapper }
    }

    /// Creates a context using the registry-driven default mapper.
    #[must_use]
    pub fn with_default_mapper(registry: Arc<ResourceRegistry>) -> Self {
        let mapper = Arc::new(DefaultDocumentMapper::new(Arc::clone(&registry)));
        Self { registry, mapper }
    }

    /// The boot-time resource registry.
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// A shared handle on the document mapper.
    #[must_use]
    pub fn mapper(&self) -> Arc<dyn DocumentMapper> {
        Arc::clone(&self.mapper)
    }
}

impl std::fmt::Debug for ControllerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerContext").finish_non_exhaustive()
    }
}

/// One request handler in the controller set.
pub trait Controller: Send + Sync {
    /// The handler's name, used in dispatch diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this handler accepts the path shape and verb.
    ///
    /// Pure over its inputs: no registry lookups, no side effects. The
    /// dispatcher relies on this to validate at startup that no two
    /// handlers overlap.
    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool;

    /// Handles an accepted request.
    ///
    /// Never panics on bad input: every failure travels on the deferred
    /// chain's failure channel.
    fn handle_async(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> DeferredResult<Response>;

    /// Handles an accepted request, blocking the calling thread.
    #[deprecated(note = "resolve the deferred result from handle_async instead; this blocks")]
    fn handle(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> Result<Response, DispatchError> {
        self.handle_async(path, query, parameter_provider, body)
            .wait()
    }
}

impl std::fmt::Debug for dyn Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller").field("name", &self.name()).finish()
    }
}

/// Resolves the registry entry for the path's endpoint type.
pub(crate) fn entry_for<'a>(
    registry: &'a ResourceRegistry,
    path: &JsonPath,
) -> Result<&'a RegistryEntry, DispatchError> {
    registry
        .entry(path.resource_type())
        .ok_or_else(|| DispatchError::ResourceNotFound {
            resource_type: path.resource_type().to_string(),
        })
}

/// The per-request mapping configuration for an endpoint type.
pub(crate) fn mapping_config(
    resource_type: &str,
    parameter_provider: Option<Arc<dyn ParameterProvider>>,
) -> DocumentMappingConfig {
    DocumentMappingConfig::for_type(resource_type).with_parameter_provider(parameter_provider)
}

/// Wraps a mapped document for serving; an absent data section collapses
/// into an explicit null so "nothing found" is visible on the wire.
pub(crate) fn content_response(mut document: Document, status_code: u16) -> Response {
    if !document.has_data() {
        document.set_data(Nullable::Null);
    }
    Response::new(document, status_code)
}

/// An empty 204 response for mutations with nothing to serve back.
pub(crate) fn no_content_response() -> Response {
    Response::new(Document::new(), HTTP_NO_CONTENT)
}

/// Extracts and verifies the single body resource of a mutating request.
///
/// The body must exist, carry a present single-resource data section, and
/// declare either the endpoint type or a registered subtype of it. Runs
/// before any repository invocation.
pub(crate) fn body_resource(
    method: HttpMethod,
    registry: &ResourceRegistry,
    endpoint: &RegistryEntry,
    body: Option<&Document>,
) -> Result<Resource, DispatchError> {
    let document = body.ok_or(DispatchError::RequestBodyMissing { method })?;
    let resource = match document.data().value() {
        Some(ResourceData::Single(resource)) => resource.clone(),
        Some(ResourceData::Collection(_)) => {
            return Err(DispatchError::RequestBodyMismatch {
                method,
                expected: endpoint.resource_type().to_string(),
                actual: "<resource collection>".to_string(),
            });
        }
        None => return Err(DispatchError::RequestBodyMissing { method }),
    };
    verify_body_type(method, registry, endpoint, &resource)?;
    Ok(resource)
}

/// Checks body-type compatibility with the endpoint type.
///
/// A subtype passes only through its declared single-hop parent relation;
/// no transitive ancestor walk is performed.
pub(crate) fn verify_body_type(
    method: HttpMethod,
    registry: &ResourceRegistry,
    endpoint: &RegistryEntry,
    resource: &Resource,
) -> Result<(), DispatchError> {
    if resource.type_name == endpoint.resource_type() {
        return Ok(());
    }
    let body_entry =
        registry
            .entry(&resource.type_name)
            .ok_or_else(|| DispatchError::ResourceNotFound {
                resource_type: resource.type_name.clone(),
            })?;
    if endpoint.is_parent(body_entry) {
        Ok(())
    } else {
        Err(DispatchError::RequestBodyMismatch {
            method,
            expected: endpoint.resource_type().to_string(),
            actual: resource.type_name.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for controller tests: a small in-memory task
    //! tracker with one task, one project and one subtype of tasks.

    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    use crate::parser::{IdKind, ResourceId};
    use crate::repository::{
        JsonApiResponse, RelationshipRepository, ResourceRepository,
    };

    pub(crate) struct InMemoryRepository {
        resource_type: &'static str,
        entities: Mutex<Vec<Value>>,
    }

    impl InMemoryRepository {
        pub(crate) fn new(resource_type: &'static str, entities: Vec<Value>) -> Self {
            Self {
                resource_type,
                entities: Mutex::new(entities),
            }
        }

        fn matches(entity: &Value, id: &ResourceId) -> bool {
            entity["id"] == json!(id.to_string())
                || matches!(id, ResourceId::Integer(n) if entity["id"] == json!(n))
        }
    }

    #[async_trait]
    impl ResourceRepository for InMemoryRepository {
        async fn find_all(&self, _query: &QueryAdapter) -> Result<JsonApiResponse, DispatchError> {
            let entities = self.entities.lock().unwrap().clone();
            JsonApiResponse::many(&entities)
        }

        async fn find_all_by_ids(
            &self,
            ids: &[ResourceId],
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            let entities: Vec<Value> = self
                .entities
                .lock()
                .unwrap()
                .iter()
                .filter(|entity| ids.iter().any(|id| Self::matches(entity, id)))
                .cloned()
                .collect();
            JsonApiResponse::many(&entities)
        }

        async fn find_one(
            &self,
            id: &ResourceId,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            let found = self
                .entities
                .lock()
                .unwrap()
                .iter()
                .find(|entity| Self::matches(entity, id))
                .cloned();
            match found {
                Some(entity) => JsonApiResponse::one(&entity),
                None => Ok(JsonApiResponse::none()),
            }
        }

        async fn create(
            &self,
            resource: Resource,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            let mut entity = Value::Object(resource.attributes.clone());
            entity["id"] = json!(100);
            self.entities.lock().unwrap().push(entity.clone());
            JsonApiResponse::one(&entity)
        }

        async fn update(
            &self,
            resource: Resource,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            let id = resource
                .id
                .clone()
                .ok_or_else(|| DispatchError::repository(std::io::Error::other("missing id")))?;
            let mut entity = Value::Object(resource.attributes.clone());
            entity["id"] = json!(id);
            JsonApiResponse::one(&entity)
        }

        async fn delete(&self, id: &ResourceId) -> Result<(), DispatchError> {
            let mut entities = self.entities.lock().unwrap();
            let before = entities.len();
            entities.retain(|entity| !Self::matches(entity, id));
            if entities.len() == before {
                return Err(DispatchError::ResourceNotFound {
                    resource_type: self.resource_type.to_string(),
                });
            }
            Ok(())
        }
    }

    pub(crate) struct TaskProjectRelations;

    #[async_trait]
    impl RelationshipRepository for TaskProjectRelations {
        async fn find_related(
            &self,
            source_id: &ResourceId,
            name: &str,
            _query: &QueryAdapter,
        ) -> Result<JsonApiResponse, DispatchError> {
            if name == "project" && *source_id == ResourceId::Integer(1) {
                JsonApiResponse::one(&json!({"id": 2, "name": "sample project"}))
            } else {
                Ok(JsonApiResponse::none())
            }
        }

        async fn set_relation(
            &self,
            _source_id: &ResourceId,
            _name: &str,
            _targets: &[ResourceId],
            _query: &QueryAdapter,
        ) -> Result<(), DispatchError> {
            Ok(())
        }

        async fn add_relations(
            &self,
            _source_id: &ResourceId,
            _name: &str,
            _targets: &[ResourceId],
            _query: &QueryAdapter,
        ) -> Result<(), DispatchError> {
            Ok(())
        }

        async fn remove_relations(
            &self,
            _source_id: &ResourceId,
            _name: &str,
            _targets: &[ResourceId],
            _query: &QueryAdapter,
        ) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    pub(crate) fn task_tracker_context() -> Arc<ControllerContext> {
        use crate::registry::ResourceInformation;

        let registry = ResourceRegistry::builder()
            .add_resource(
                ResourceInformation::new("tasks", "id", IdKind::Integer)
                    .with_to_one("project", "projects"),
                Arc::new(InMemoryRepository::new(
                    "tasks",
                    vec![json!({"id": 1, "name": "sample task"})],
                )),
            )
            .add_resource(
                ResourceInformation::new("projects", "id", IdKind::Integer),
                Arc::new(InMemoryRepository::new(
                    "projects",
                    vec![json!({"id": 2, "name": "sample project"})],
                )),
            )
            .add_resource(
                ResourceInformation::new("scheduled-tasks", "id", IdKind::Integer)
                    .with_parent_type("tasks"),
                Arc::new(InMemoryRepository::new("scheduled-tasks", vec![])),
            )
            .add_relationship_repository("tasks", "project", Arc::new(TaskProjectRelations))
            .build()
            .unwrap();

        Arc::new(ControllerContext::with_default_mapper(Arc::new(registry)))
    }

    pub(crate) fn single_body(resource: Resource) -> Document {
        Document::of_single(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::task_tracker_context;
    use super::*;

    #[test]
    fn test_body_resource_requires_a_body() {
        let context = task_tracker_context();
        let endpoint = context.registry().entry("tasks").unwrap();
        let error =
            body_resource(HttpMethod::Post, context.registry(), endpoint, None).unwrap_err();
        assert!(matches!(error, DispatchError::RequestBodyMissing { .. }));
    }

    #[test]
    fn test_body_resource_rejects_null_primary_data() {
        let context = task_tracker_context();
        let endpoint = context.registry().entry("tasks").unwrap();
        let mut document = Document::new();
        document.set_data(Nullable::Null);
        let error = body_resource(
            HttpMethod::Post,
            context.registry(),
            endpoint,
            Some(&document),
        )
        .unwrap_err();
        assert!(matches!(error, DispatchError::RequestBodyMissing { .. }));
    }

    #[test]
    fn test_body_type_matching_endpoint_passes() {
        let context = task_tracker_context();
        let endpoint = context.registry().entry("tasks").unwrap();
        let resource = Resource::new("tasks");
        assert!(
            verify_body_type(HttpMethod::Post, context.registry(), endpoint, &resource).is_ok()
        );
    }

    #[test]
    fn test_registered_subtype_body_passes() {
        let context = task_tracker_context();
        let endpoint = context.registry().entry("tasks").unwrap();
        let resource = Resource::new("scheduled-tasks");
        assert!(
            verify_body_type(HttpMethod::Post, context.registry(), endpoint, &resource).is_ok()
        );
    }

    #[test]
    fn test_unrelated_body_type_is_a_mismatch() {
        let context = task_tracker_context();
        let endpoint = context.registry().entry("tasks").unwrap();
        let resource = Resource::new("projects");
        let error = verify_body_type(HttpMethod::Post, context.registry(), endpoint, &resource)
            .unwrap_err();
        assert!(matches!(
            error,
            DispatchError::RequestBodyMismatch { expected, actual, .. }
                if expected == "tasks" && actual == "projects"
        ));
    }

    #[test]
    fn test_unregistered_body_type_is_not_found() {
        let context = task_tracker_context();
        let endpoint = context.registry().entry("tasks").unwrap();
        let resource = Resource::new("memoranda");
        let error = verify_body_type(HttpMethod::Post, context.registry(), endpoint, &resource)
            .unwrap_err();
        assert!(matches!(error, DispatchError::ResourceNotFound { .. }));
    }

    #[test]
    #[allow(deprecated)]
    fn test_blocking_handle_matches_handle_async() {
        let controller = CollectionGet::new(task_tracker_context());
        let path = JsonPath::collection("tasks");

        let blocking = controller
            .handle(&path, &QueryAdapter::empty(), None, None)
            .unwrap();
        let deferred = controller
            .handle_async(&path, &QueryAdapter::empty(), None, None)
            .wait()
            .unwrap();

        assert_eq!(blocking.status_code(), deferred.status_code());
        assert_eq!(
            serde_json::to_value(blocking.document()).unwrap(),
            serde_json::to_value(deferred.document()).unwrap()
        );
    }

    #[test]
    fn test_absent_data_collapses_to_explicit_null() {
        let response = content_response(Document::new(), HTTP_OK);
        assert!(response.document().data().is_null());
        assert_eq!(response.status_code(), HTTP_OK);
    }
}
