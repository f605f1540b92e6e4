//! `GET {type}/{id}/{relationship}`.

use std::sync::Arc;

use crate::controller::{
    content_response, entry_for, mapping_config, Controller, ControllerContext, HTTP_OK,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, ParameterProvider};
use crate::error::DispatchError;
use crate::http::HttpMethod;
use crate::parser::parse_id;
use crate::path::{JsonPath, PathSegment};
use crate::query::QueryAdapter;
use crate::response::Response;

/// Serves the resources on the far side of a relationship.
///
/// The relationship must be declared by the source type and backed by a
/// registered relationship repository; the found resources are mapped
/// under the relationship's target type and served under 200.
#[derive(Debug)]
pub struct FieldResourceGet {
    context: Arc<ControllerContext>,
}

impl FieldResourceGet {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for FieldResourceGet {
    fn name(&self) -> &'static str {
        "FieldResourceGet"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        matches!(path.segment(), Some(PathSegment::Field(_))) && method == HttpMethod::Get
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

        // the found resources belong to the target type, not the source
        let mapper = self.context.mapper();
        let config = mapping_config(relationship.target_type(), parameter_provider);
        let query_for_mapping = query.clone();
        repository
            .find_related(source_id, name, query.clone())
            .merge(move |response| mapper.to_document(response, &query_for_mapping, &config))
            .map(|document| content_response(document, HTTP_OK))
    }
}
