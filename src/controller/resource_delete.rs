//! `DELETE {type}/{id}`.

use std::sync::Arc;

use crate::controller::{entry_for, no_content_response, Controller, ControllerContext};
use crate::deferred::DeferredResult;
use crate::document::{Document, ParameterProvider};
use crate::http::HttpMethod;
use crate::parser::parse_id;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::response::Response;

/// Deletes a single resource by id and answers 204 with no content.
#[derive(Debug)]
pub struct ResourceDelete {
    context: Arc<ControllerContext>,
}

impl ResourceDelete {
    /// Creates the controller over shared context.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>) -> Self {
        Self { context }
    }
}

impl Controller for ResourceDelete {
    fn name(&self) -> &'static str {
        "ResourceDelete"
    }

    fn is_acceptable(&self, path: &JsonPath, method: HttpMethod) -> bool {
        path.segment().is_none() && !path.is_collection() && method == HttpMethod::Delete
    }

    fn handle_async(
        &self,
        path: &JsonPath,
        _query: &QueryAdapter,
        _parameter_provider: Option<Arc<dyn ParameterProvider>>,
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

        entry.repository().delete(id).map(|()| no_content_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::task_tracker_context;
    use crate::error::DispatchError;

    fn controller() -> ResourceDelete {
        ResourceDelete::new(task_tracker_context())
    }

    #[test]
    fn test_accepts_single_resource_delete_only() {
        let controller = controller();
        assert!(controller.is_acceptable(&JsonPath::single("tasks", "1"), HttpMethod::Delete));
        assert!(!controller.is_acceptable(&JsonPath::collection("tasks"), HttpMethod::Delete));
        assert!(!controller.is_acceptable(&JsonPath::single("tasks", "1"), HttpMethod::Get));
        assert!(!controller.is_acceptable(
            &JsonPath::relationship("tasks", "1", "project"),
            HttpMethod::Delete
        ));
    }

    #[tokio::test]
    async fn test_deletes_and_answers_204_without_content() {
        let response = controller()
            .handle_async(
                &JsonPath::single("tasks", "1"),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap();

        assert_eq!(response.status_code(), 204);
        assert!(!response.document().has_data());
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let error = controller()
            .handle_async(
                &JsonPath::single("tasks", "999"),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_malformed_id_fails_before_the_repository() {
        let error = controller()
            .handle_async(
                &JsonPath::single("tasks", "abc"),
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::IdParse { .. }));
    }
}
