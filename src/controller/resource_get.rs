//! `GET {type}/{id}`.

use std::sync::Arc;

use crate::controller::{
    content_response, entry_for, mapping_config, Controller, ControllerContext, HTTP_OK,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, ParameterProvider};
use crate::http::HttpMethod;
use crate::parser::parse_id;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::response::Response;

/// Serves a single resource by id.
///
/// A miss is not a failure: the repository reports nothing found, the
/// mapped document's absent data collapses into an explicit null, and
/// the response is still a 200.
#[derive(Debug)]
pub struct ResourceGet {
    context: Arc<ControllerContext>,
}

impl ResourceGet {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for ResourceGet {
    fn name(&self) -> &'static str {
        "ResourceGet"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        path.segment().is_none() && !path.is_collection() && method == HttpMethod::Get
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
        let id = match parse_id(
            &path.ids()[0],
            information.id_kind(),
            information.resource_type(),
        ) {
            Ok(id) => id,
            Err(error) => return DeferredResult::failed(error),
        };

        let mapper = self.context.mapper();
        let config = mapping_config(information.resource_type(), parameter_provider);
        let query_for_mapping = query.clone();
        entry
            .repository()
            .find_one(id, query.clone())
            .merge(move |response| mapper.to_document(response, &query_for_mapping, &config))
            .map(|document| content_response(document, HTTP_OK))
    }
}
