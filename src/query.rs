//! Opaque, already-parsed query directives.
//!
//! The core consumes a [`QueryAdapter`] and never produces one: turning
//! raw query strings into this form is the job of an upstream parser.
//! Filtering, sorting and paging payloads are carried opaquely and handed
//! to repositories untouched; only sparse fieldsets and include
//! directives are interpreted inside the core, by the document mapper.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_core::query::QueryAdapter;
//!
//! let query = QueryAdapter::empty()
//!     .with_include(["project"])
//!     .with_sparse_fields("tasks", ["name"]);
//!
//! assert!(query.included("project"));
//! assert!(query.sparse_fields("tasks").unwrap().contains("name"));
//! assert!(query.sparse_fields("projects").is_none());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// Parsed query directives for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryAdapter {
    include: Vec<String>,
    fields: BTreeMap<String, BTreeSet<String>>,
    filter: Option<Value>,
    sort: Option<Value>,
    page: Option<Value>,
}

impl QueryAdapter {
    /// A query with no directives.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds relationship names whose targets should be included.
    #[must_use]
    pub fn with_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(names.into_iter().map(Into::into));
        self
    }

    /// Restricts the serialized fields of one resource type.
    #[must_use]
    pub fn with_sparse_fields<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .entry(resource_type.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Attaches an opaque filter payload for the repository.
    #[must_use]
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Attaches an opaque sort payload for the repository.
    #[must_use]
    pub fn with_sort(mut self, sort: Value) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Attaches an opaque paging payload for the repository.
    #[must_use]
    pub fn with_page(mut self, page: Value) -> Self {
        self.page = Some(page);
        self
    }

    /// Whether the given relationship name was requested for inclusion.
    #[must_use]
    pub fn included(&self, name: &str) -> bool {
        self.include.iter().any(|included| included == name)
    }

    /// The requested include names, in request order.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// The sparse fieldset for a resource type, if one was requested.
    #[must_use]
    pub fn sparse_fields(&self, resource_type: &str) -> Option<&BTreeSet<String>> {
        self.fields.get(resource_type)
    }

    /// The opaque filter payload, if any.
    #[must_use]
    pub const fn filter(&self) -> Option<&Value> {
        self.filter.as_ref()
    }

    /// The opaque sort payload, if any.
    #[must_use]
    pub const fn sort(&self) -> Option<&Value> {
        self.sort.as_ref()
    }

    /// The opaque paging payload, if any.
    #[must_use]
    pub const fn page(&self) -> Option<&Value> {
        self.page.as_ref()
    }
}
