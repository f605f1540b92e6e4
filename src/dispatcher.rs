//! Request dispatch over the controller set.
//!
//! The dispatcher owns the full controller set and routes each request to
//! the single controller whose acceptance predicate matches the path
//! shape and verb. Because every predicate is pure, the whole set is
//! probed once at construction against every path shape and verb
//! combination; two controllers claiming the same combination is a
//! configuration defect and construction fails. After that check,
//! first-match routing at request time is exact-match routing.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::controller::{
    CollectionGet, Controller, ControllerContext, FieldResourceGet, RelationshipsDelete,
    RelationshipsGet, RelationshipsPatch, RelationshipsPost, ResourceDelete, ResourceGet,
    ResourcePatch, ResourcePost,
};
use crate::deferred::DeferredResult;
use crate::document::{Document, ParameterProvider};
use crate::error::DispatchError;
use crate::http::HttpMethod;
use crate::path::JsonPath;
use crate::query::QueryAdapter;
use crate::response::Response;

/// Configuration defects caught while constructing the dispatcher.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Two controllers accept the same path shape and verb.
    #[error(
        "Handlers '{first}' and '{second}' both accept {method} requests \
         for {shape} paths."
    )]
    OverlappingControllers {
        /// The first accepting controller's name.
        first: &'static str,
        /// The second accepting controller's name.
        second: &'static str,
        /// The contested verb.
        method: HttpMethod,
        /// A human-readable description of the contested path shape.
        shape: &'static str,
    },
}

/// Routes requests to the controller set.
#[derive(Debug)]
pub struct RequestDispatcher {
    controllers: Vec<Box<dyn Controller>>,
}

impl RequestDispatcher {
    /// Creates a dispatcher over the full default controller set.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::OverlappingControllers`] if the set
    /// fails the startup overlap check; the default set never does.
    pub fn new(context: Arc<ControllerContext>) -> Result<Self, DispatcherError> {
        Self::with_controllers(vec![
            Box::new(CollectionGet::new(Arc::clone(&context))),
            Box::new(ResourceGet::new(Arc::clone(&context))),
            Box::new(ResourcePost::new(Arc::clone(&context))),
            Box::new(ResourcePatch::new(Arc::clone(&context))),
            Box::new(ResourceDelete::new(Arc::clone(&context))),
            Box::new(FieldResourceGet::new(Arc::clone(&context))),
            Box::new(RelationshipsGet::new(Arc::clone(&context))),
            Box::new(RelationshipsPost::new(Arc::clone(&context))),
            Box::new(RelationshipsPatch::new(Arc::clone(&context))),
            Box::new(RelationshipsDelete::new(context)),
        ])
    }

    /// Creates a dispatcher over an explicit controller set.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::OverlappingControllers`] when two
    /// controllers accept the same path shape and verb.
    pub fn with_controllers(
        controllers: Vec<Box<dyn Controller>>,
    ) -> Result<Self, DispatcherError> {
        validate_no_overlap(&controllers)?;
        Ok(Self { controllers })
    }

    /// Dispatches one request to the accepting controller.
    ///
    /// When no controller accepts the combination, the deferred fails
    /// with [`DispatchError::MethodNotAllowed`].
    pub fn dispatch(
        &self,
        path: &JsonPath,
        method: HttpMethod,
        query: &QueryAdapter,
        parameter_provider: Option<Arc<dyn ParameterProvider>>,
        body: Option<&Document>,
    ) -> DeferredResult<Response> {
        for controller in &self.controllers {
            if controller.is_acceptable(path, method) {
                debug!(
                    controller = controller.name(),
                    %method,
                    resource_type = path.resource_type(),
                    "dispatching request"
                );
                return controller.handle_async(path, query, parameter_provider, body);
            }
        }
        debug!(%method, resource_type = path.resource_type(), "no handler accepts the request");
        DeferredResult::failed(DispatchError::MethodNotAllowed { method })
    }
}

/// Every distinct path shape the acceptance predicates can branch on.
fn probe_shapes() -> [(&'static str, JsonPath); 5] {
    [
        ("collection", JsonPath::collection("probe")),
        (
            "id-filtered collection",
            JsonPath::collection_of_ids("probe", vec!["1".to_string(), "2".to_string()]),
        ),
        ("single-resource", JsonPath::single("probe", "1")),
        ("field", JsonPath::field("probe", "1", "relation")),
        (
            "relationship",
            JsonPath::relationship("probe", "1", "relation"),
        ),
    ]
}

fn validate_no_overlap(controllers: &[Box<dyn Controller>]) -> Result<(), DispatcherError> {
    for (shape, path) in probe_shapes() {
        for method in HttpMethod::ALL {
            let mut accepting = controllers
                .iter()
                .filter(|controller| controller.is_acceptable(&path, method));
            if let (Some(first), Some(second)) = (accepting.next(), accepting.next()) {
                return Err(DispatcherError::OverlappingControllers {
                    first: first.name(),
                    second: second.name(),
                    method,
                    shape,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::task_tracker_context;
    use crate::document::ResourceData;

    fn dispatcher() -> RequestDispatcher {
        RequestDispatcher::new(task_tracker_context()).unwrap()
    }

    #[test]
    fn test_default_controller_set_has_no_overlaps() {
        assert!(RequestDispatcher::new(task_tracker_context()).is_ok());
    }

    #[test]
    fn test_overlapping_controllers_fail_construction() {
        let context = task_tracker_context();
        let error = RequestDispatcher::with_controllers(vec![
            Box::new(CollectionGet::new(Arc::clone(&context))),
            Box::new(CollectionGet::new(context)),
        ])
        .unwrap_err();
        assert!(matches!(
            error,
            DispatcherError::OverlappingControllers {
                first: "CollectionGet",
                second: "CollectionGet",
                method: HttpMethod::Get,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_routes_collection_get_to_its_controller() {
        let response = dispatcher()
            .dispatch(
                &JsonPath::collection("tasks"),
                HttpMethod::Get,
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap();

        assert_eq!(response.status_code(), 200);
        assert!(matches!(
            response.document().data().value(),
            Some(ResourceData::Collection(_))
        ));
    }

    #[tokio::test]
    async fn test_unroutable_combination_is_method_not_allowed() {
        // no controller deletes whole collections
        let error = dispatcher()
            .dispatch(
                &JsonPath::collection("tasks"),
                HttpMethod::Delete,
                &QueryAdapter::empty(),
                None,
                None,
            )
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            DispatchError::MethodNotAllowed {
                method: HttpMethod::Delete
            }
        ));
    }

    #[tokio::test]
    async fn test_every_shape_and_verb_routes_or_rejects_cleanly() {
        let dispatcher = dispatcher();
        for (_, path) in probe_shapes() {
            for method in HttpMethod::ALL {
                // probe type is unregistered, so accepted routes fail with
                // not-found and unaccepted ones with method-not-allowed;
                // nothing panics and nothing hangs
                let result = dispatcher
                    .dispatch(&path, method, &QueryAdapter::empty(), None, None)
                    .resolve()
                    .await;
                assert!(result.is_err());
            }
        }
    }
}
