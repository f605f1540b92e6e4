//! `POST {type}`.

use std::sync::Arc;

use crate::controller::{
    body_resource, content_response, entry_for, mapping_config, Controller, ControllerContext,
    HTTP_CREATED,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, ParameterProvider};
use crate::http::HttpMethod;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::response::Response;

/// Creates a resource from the request body.
///
/// The body's declared type is verified against the endpoint type before
/// the repository's create operation runs; the created resource comes
/// back mapped under 201.
#[derive(Debug)]
pub struct ResourcePost {
    context: Arc<ControllerContext>,
}

impl ResourcePost {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for ResourcePost {
    fn name(&self) -> &'static str {
        "ResourcePost"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        path.segment().is_none() && !path.has_ids() && method == HttpMethod::Post
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
        let resource = match body_resource(HttpMethod::Post, registry, entry, body) {
            Ok(resource) => resource,
            Err(error) => return DeferredResult::failed(error),
        };

        let mapper = self.context.mapper();
        let config = mapping_config(entry.resource_type(), parameter_provider);
        let query_for_mapping = query.clone();
        entry
            .repository()
            .create(resource, query.clone())
            .merge(move |response| mapper.to_document(response, &query_for_mapping, &config))
            .map(|document| content_response(document, HTTP_CREATED))
    }
}
