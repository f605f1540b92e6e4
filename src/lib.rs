//! # JSON:API Dispatch Core
//!
//! A transport-agnostic request-dispatch and document-mapping core for
//! JSON:API services. The crate owns everything between "the host
//! transport resolved a URL path, a verb and a parsed query" and "here
//! is the response document and status code": path modelling, resource
//! registration, controller routing, repository invocation and document
//! mapping.
//!
//! ## Overview
//!
//! - Parsed resource paths via [`path::JsonPath`], covering collection,
//!   single-resource, id-filtered, field and relationship forms
//! - A boot-time-validated [`registry::ResourceRegistry`] mapping type
//!   names to metadata and repository handles
//! - Object-safe async repository contracts in [`repository`], invoked
//!   through adapters that yield a uniform [`DeferredResult`] surface
//! - A three-state document model in [`document`] that keeps explicit
//!   null and absent primary data distinct on the wire
//! - A controller per path shape and verb in [`controller`], routed by a
//!   [`dispatcher::RequestDispatcher`] whose fan-out is checked for
//!   overlaps at construction
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jsonapi_core::dispatcher::RequestDispatcher;
//! use jsonapi_core::controller::ControllerContext;
//! use jsonapi_core::parser::IdKind;
//! use jsonapi_core::path::JsonPath;
//! use jsonapi_core::query::QueryAdapter;
//! use jsonapi_core::registry::{ResourceInformation, ResourceRegistry};
//! use jsonapi_core::HttpMethod;
//!
//! // Register resource types with their repositories at boot
//! let registry = ResourceRegistry::builder()
//!     .add_resource(
//!         ResourceInformation::new("tasks", "id", IdKind::Integer)
//!             .with_to_one("project", "projects"),
//!         Arc::new(task_repository),
//!     )
//!     .add_resource(
//!         ResourceInformation::new("projects", "id", IdKind::Integer),
//!         Arc::new(project_repository),
//!     )
//!     .build()?;
//!
//! // Build the dispatcher once; controller fan-out is validated here
//! let context = ControllerContext::with_default_mapper(Arc::new(registry));
//! let dispatcher = RequestDispatcher::new(Arc::new(context))?;
//!
//! // Dispatch requests from the host transport
//! let path = JsonPath::parse("tasks/1")?;
//! let response = dispatcher
//!     .dispatch(&path, HttpMethod::Get, &QueryAdapter::empty(), None, None)
//!     .resolve()
//!     .await?;
//! assert_eq!(response.status_code(), 200);
//! ```
//!
//! ## Design Principles
//!
//! - **Transport-agnostic**: no HTTP server, no URL routing tables; the
//!   host hands over a parsed path, a verb and query directives
//! - **Fail-fast configuration**: registry and dispatcher construction
//!   validate everything they can; request time only sees request errors
//! - **Errors over degradation**: failures travel on the deferred chain
//!   unchanged, never as silently altered documents
//! - **Thread-safe**: the registry and dispatcher are `Send + Sync` and
//!   shared read-only across request tasks

pub mod controller;
pub mod deferred;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod http;
pub mod parser;
pub mod path;
pub mod query;
pub mod registry;
pub mod repository;
pub mod response;

// Re-export the types nearly every caller touches at crate root
pub use controller::{Controller, ControllerContext};
pub use deferred::DeferredResult;
pub use dispatcher::{DispatcherError, RequestDispatcher};
pub use document::{Document, DocumentMapper, Nullable, ParameterProvider, Resource};
pub use error::DispatchError;
pub use http::HttpMethod;
pub use path::JsonPath;
pub use query::QueryAdapter;
pub use registry::{RegistryError, ResourceInformation, ResourceRegistry};
pub use repository::{JsonApiResponse, RelationshipRepository, ResourceRepository};
pub use response::Response;
