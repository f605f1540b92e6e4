//! `PATCH {type}/{id}`.

use std::sync::Arc;

use crate::controller::{
    body_resource, content_response, entry_for, mapping_config, Controller, ControllerContext,
    HTTP_OK,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, ParameterProvider};
use crate::http::HttpMethod;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::response::Response;

/// Updates a single resource from the request body.
///
/// The body's declared type is verified before the repository's update
/// operation runs. A body without an id inherits the id from the path,
/// so `PATCH tasks/1` with an id-less body still addresses task 1.
#[derive(Debug)]
pub struct ResourcePatch {
    context: Arc<ControllerContext>,
}

impl ResourcePatch {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for ResourcePatch {
    fn name(&self) -> &'static str {
        "ResourcePatch"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        path.segment().is_none() && !path.is_collection() && method == HttpMethod::Patch
    }

    fn handle_async(
        &self,
        path: &JsonPath,
        query: &QueryAdapter,
        parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> DeferredResult<Response> {
        let registry = self.context.registry();
        let entry = match entry_for(registry, path) {
            Ok(entry) => entry,
            Err(error) => return DeferredResult::failed(error),
        };
        let mut resource = match body_resource(HttpMethod::Patch, registry, entry, body) {
            Ok(resource) => resource,
            Err(error) => return DeferredResult::failed(error),
        };
        if resource.id.is_none() {
            resource.id = Some(path.ids()[0].clone());
        }

        let mapper = self.context.mapper();
        let config = mapping_config(entry.resource_type(), parameter_provider);
        let query_for_mapping = query.clone();
        entry
            .repository()
            .update(resource, query.clone())
            .merge(move |response| mapper.to_document(response, &query_for_mapping, &config))
            .map(|document| content_response(document, HTTP_OK))
    }
}
