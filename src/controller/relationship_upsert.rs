//! `POST`/`PATCH`/`DELETE {type}/{id}/relationships/{relationship}`.
//!
//! The three mutation verbs share one body protocol: the primary data
//! section carries resource identifiers naming the targets. An explicit
//! null clears the targets, an absent section is a missing body. Every
//! identifier is type-verified against the relationship's target type
//! and id-parsed before the relationship repository is invoked; all
//! three verbs answer 204 with no content.

use std::sync::Arc;

use crate::controller::{
    entry_for, no_content_response, verify_body_type, Controller, ControllerContext,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, Nullable, ParameterProvider, Resource, ResourceData};
use crate::error::DispatchError;
use crate::http::HttpMethod;
use crate::parser::{parse_id, ResourceId};
use crate::path::{JsonPath, PathSegment};
use crate::query::QueryAdapter;
use crate::repository::RelationshipRepositoryAdapter;
use crate::response::Response;

fn accepts(path: &JsonPath, method: HttpMethod, expected: HttpMethod) -> bool {
    matches!(path.segment(), Some(PathSegment::Relationship(_))) && method == expected
}

/// Extracts the target identifiers from a relationship mutation body.
fn target_ids(
    context: &ControllerContext,
    method: HttpMethod,
    target_type: &str,
    body: Option<&Document>,
) -> Result<Vec<ResourceId>, DispatchError> {
    let document = body.ok_or(DispatchError::RequestBodyMissing { method })?;
    let resources: Vec<&Resource> = match document.data() {
        Nullable::Absent => return Err(DispatchError::RequestBodyMissing { method }),
        Nullable::Null => Vec::new(),
        Nullable::Present(ResourceData::Single(resource)) => vec![resource],
        Nullable::Present(ResourceData::Collection(resources)) => resources.iter().collect(),
    };

    let registry = context.registry();
    let target_entry =
        registry
            .entry(target_type)
            .ok_or_else(|| DispatchError::ResourceNotFound {
                resource_type: target_type.to_string(),
            })?;
    let id_kind = target_entry.information().id_kind();

    resources
        .into_iter()
        .map(|resource| {
            verify_body_type(method, registry, target_entry, resource)?;
            let raw = resource.id.clone().unwrap_or_default();
            parse_id(&raw, id_kind, target_type)
        })
        .collect()
}

fn handle_mutation<F>(
    context: &ControllerContext,
    method: HttpMethod,
    path: &JsonPath,
    query: &QueryAdapter,
    body: Option<&Document>,
    apply: F,
) -> DeferredResult<Response>
where
    F: FnOnce(
        RelationshipRepositoryAdapter,
        ResourceId,
        String,
        Vec<ResourceId>,
        QueryAdapter,
    ) -> DeferredResult<()>,
{
    let entry = match entry_for(context.registry(), path) {
        Ok(entry) => entry,
        Err(error) => return DeferredResult::failed(error),
    };
    let information = entry.information();
    let name = path
        .segment()
        .map(PathSegment::name)
        .unwrap_or_default()
        .to_string();

    let field_not_found = || DispatchError::ResourceFieldNotFound {
        resource_type: information.resource_type().to_string(),
        field: name.clone(),
    };
    let Some(relationship) = information.relationship(&name) else {
        return DeferredResult::failed(field_not_found());
    };
    let Some(repository) = entry.relationship_repository(&name) else {
        return DeferredResult::failed(field_not_found());
    };
    // adding to or removing from a to-one relation makes no sense; only
    // replacement is allowed there
    if !relationship.is_collection() && method != HttpMethod::Patch {
        return DeferredResult::failed(DispatchError::MethodNotAllowed { method });
    }

    let source_id = match parse_id(
        &path.ids()[0],
        information.id_kind(),
        information.resource_type(),
    ) {
        Ok(id) => id,
        Err(error) => return DeferredResult::failed(error),
    };
    let targets = match target_ids(context, method, relationship.target_type(), body) {
        Ok(targets) => targets,
        Err(error) => return DeferredResult::failed(error),
    };

    apply(repository, source_id, name, targets, query.clone()).map(|()| no_content_response())
}

/// Adds targets to a to-many relationship.
#[derive(Debug)]
pub struct RelationshipsPost {
    context: Arc<ControllerContext>,
}

impl RelationshipsPost {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for RelationshipsPost {
    fn name(&self) -> &'static str {
        "RelationshipsPost"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        accepts(path, method, HttpMethod::Post)
    }

    fn handle_async(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        _parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> DeferredResult<Response> {
        handle_mutation(
            &self.context,
            HttpMethod::Post,
            path,
            query,
            body,
            |repository, source_id, name, targets, query| {
                repository.add_relations(source_id, name, targets, query)
            },
        )
    }
}

/// Replaces a relationship's targets; an explicit-null body clears them.
#[derive(Debug)]
pub struct RelationshipsPatch {
    context: Arc<ControllerContext>,
}

impl RelationshipsPatch {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for RelationshipsPatch {
    fn name(&self) -> &'static str {
        "RelationshipsPatch"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        accepts(path, method, HttpMethod::Patch)
    }

    fn handle_async(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        _parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> DeferredResult<Response> {
        handle_mutation(
            &self.context,
            HttpMethod::Patch,
            path,
            query,
            body,
            |repository, source_id, name, targets, query| {
                repository.set_relation(source_id, name, targets, query)
            },
        )
    }
}

/// Removes targets from a to-many relationship.
#[derive(Debug)]
pub struct RelationshipsDelete {
    context: Arc<ControllerContext>,
}

impl RelationshipsDelete {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for RelationshipsDelete {
    fn name(&self) -> &'static str {
        "RelationshipsDelete"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        accepts(path, method, HttpMethod::Delete)
    }

    fn handle_async(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        _parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> DeferredResult<Response> {
        handle_mutation(
            &self.context,
            HttpMethod::Delete,
            path,
            query,
            body,
            |repository, source_id, name, targets, query| {
                repository.remove_relations(source_id, name, targets, query)
            },
        )
    }
}
