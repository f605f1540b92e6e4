//! `GET {type}/{id}/relationships/{relationship}`.

use std::sync::Arc;

use crate::controller::{
    content_response, entry_for, mapping_config, Controller, ControllerContext, HTTP_OK,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, Nullable, ParameterProvider, Resource, ResourceData};
use crate::error::DispatchError;
use crate::http::HttpMethod;
use crate::parser::parse_id;
use crate::path::{JsonPath, PathSegment};
use crate::query::QueryAdapter;
use crate::response::Response;

/// Serves the linkage of a relationship rather than the resources.
///
/// Runs the same relationship traversal as the field form but strips the
/// mapped resources down to their `{type, id}` identifiers; attributes,
/// relationships and side-loaded includes never appear in a linkage
/// document.
#[derive(Debug)]
pub struct RelationshipsGet {
    context: Arc<ControllerContext>,
}

impl RelationshipsGet {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for RelationshipsGet {
    fn name(&self) -> &'static str {
        "RelationshipsGet"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        matches!(path.segment(), Some(PathSegment::Relationship(_))) && method == HttpMethod::Get
    }

    fn handle_async(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        parameter_provider: Option<Arc<dyn ParameterProvider>>,
        _body: Option<&Document>,
    ) -> DeferredResult<Response> {
        let entry = match entry_for(self.context.registry(), path) {
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
        let source_id = match parse_id(
            &path.ids()[0],
            information.id_kind(),
            information.resource_type(),
        ) {
            Ok(id) => id,
            Err(error) => return DeferredResult::failed(error),
        };

        let mapper = self.context.mapper();
        let config = mapping_config(relationship.target_type(), parameter_provider);
        let query_for_mapping = query.clone();
        repository
            .find_related(source_id, name, query.clone())
            .merge(move |response| mapper.to_document(response, &query_for_mapping, &config))
            .map(|document| content_response(to_linkage(document), HTTP_OK))
    }
}

/// Strips a mapped document down to identifier-only primary data.
fn to_linkage(document: Document) -> Document {
    let mut linkage = Document::new();
    linkage.set_data(match document.data().clone() {
        Nullable::Absent => Nullable::Absent,
        Nullable::Null => Nullable::Null,
        Nullable::Present(ResourceData::Single(resource)) => {
            Nullable::Present(ResourceData::Single(identifier_only(&resource)))
        }
        Nullable::Present(ResourceData::Collection(resources)) => Nullable::Present(
            ResourceData::Collection(resources.iter().map(identifier_only).collect()),
        ),
    });
    linkage
}

fn identifier_only(resource: &Resource) -> Resource {
    let mut stripped = Resource::new(resource.type_name.clone());
    stripped.id.clone_from(&resource.id);
    stripped
}
