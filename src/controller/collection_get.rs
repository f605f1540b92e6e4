//! `GET {type}` and `GET {type}/{id,id,...}`.

use std::sync::Arc;

use crate::controller::{
    content_response, entry_for, mapping_config, Controller, ControllerContext, HTTP_OK,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, Nullable, ParameterProvider, ResourceData};
use crate::http::HttpMethod;
use crate::parser::parse_ids;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::response::Response;

/// Serves resource collections, with or without an id filter.
///
/// Without ids the repository's find-all operation runs; with an id
/// filter every id is parsed into the declared id kind first and the
/// find-all-by-ids operation runs instead. Either way the result feeds
/// the document mapper and is served under 200.
#[derive(Debug)]
pub struct CollectionGet {
    context: Arc<ControllerContext>,
}

impl CollectionGet {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for CollectionGet {
    fn name(&self) -> &'static str {
        "CollectionGet"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        path.segment().is_none() && path.is_collection() && method == HttpMethod::Get
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
        let repository = entry.repository();

        let found = if path.has_ids() {
            let ids = match parse_ids(
                path.ids(),
                information.id_kind(),
                information.resource_type(),
            ) {
                Ok(ids) => ids,
                Err(error) => return DeferredResult::failed(error),
            };
            repository.find_all_by_ids(ids, query.clone())
        } else {
            repository.find_all(query.clone())
        };

        let mapper = self.context.mapper();
        let config = mapping_config(information.resource_type(), parameter_provider);
        let query = query.clone();
        let id_filtered = path.has_ids();
        found
            .merge(move |response| mapper.to_document(response, &query, &config))
            .map(move |mut document| {
                // an unfiltered collection always serves an array; only an
                // id-filtered fetch with no matches collapses to null
                if !document.has_data() && !id_filtered {
                    document.set_data(Nullable::Present(ResourceData::Collection(Vec::new())));
                }
                content_response(document, HTTP_OK)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::task_tracker_context;
    use crate::error::DispatchError;

    fn controller() -> CollectionGet {
        CollectionGet::new(task_tracker_context())
    }

    #[test]
    fn test_accepts_collection_get_only() {
        let controller = controller();
        assert!(controller.is_acceptable(&JsonPath::collection("tasks"), HttpMethod::Get));
        assert!(controller.is_acceptable(
            &JsonPath::collection_of_ids("tasks", vec!["1".into(), "2".into()]),
            HttpMethod::Get
        ));
        assert!(!controller.is_acceptable(&JsonPath::single("tasks", "1"), HttpMethod::Get));
        assert!(!controller.is_acceptable(&JsonPath::collection("tasks"), HttpMethod::Post));
        assert!(!controller.is_acceptable(
            &JsonPath::field("tasks", "1", "project"),
            HttpMethod::Get
        ));
    }

    #[tokio::test]
    async fn test_serves_all_resources_without_id_filter() {
        let response = controller()
            .handle_async(
                &JsonPath::collection("tasks"),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap();

        assert_eq!(response.status_code(), 200);
        let Some(ResourceData::Collection(resources)) = response.document().data().value() else {
            panic!("expected a collection");
        };
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_id_filter_narrows_the_collection() {
        let response = controller()
            .handle_async(
                &JsonPath::collection_of_ids("tasks", vec!["1".into(), "999".into()]),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap();

        let Some(ResourceData::Collection(resources)) = response.document().data().value() else {
            panic!("expected a collection");
        };
        assert_eq!(resources.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_id_fails_before_the_repository() {
        let error = controller()
            .handle_async(
                &JsonPath::collection_of_ids("tasks", vec!["1".into(), "abc".into()]),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::IdParse { value, .. } if value == "abc"));
    }

    #[tokio::test]
    async fn test_unfiltered_empty_collection_is_an_array_not_null() {
        use crate::controller::testing::InMemoryRepository;
        use crate::parser::IdKind;
        use crate::registry::{ResourceInformation, ResourceRegistry};

        let registry = ResourceRegistry::builder()
            .add_resource(
                ResourceInformation::new("tasks", "id", IdKind::Integer),
                Arc::new(InMemoryRepository::new("tasks", vec![])),
            )
            .build()
            .unwrap();
        let context = Arc::new(ControllerContext::with_default_mapper(Arc::new(registry)));

        let response = CollectionGet::new(context)
            .handle_async(
                &JsonPath::collection("tasks"),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap();

        let Some(ResourceData::Collection(resources)) = response.document().data().value() else {
            panic!("expected an empty collection, not null or absent");
        };
        assert!(resources.is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_type_is_not_found() {
        let error = controller()
            .handle_async(
                &JsonPath::collection("memoranda"),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::ResourceNotFound { .. }));
    }
}
