//! HTTP verb model for request dispatch.
//!
//! The dispatch core never touches a transport; it only needs to know
//! which verb the host transport resolved for an inbound request. The
//! JSON:API verbs are `GET`, `POST`, `PATCH` and `DELETE`; updates use
//! `PATCH` rather than `PUT`.

use std::fmt;

/// HTTP request methods understood by the dispatch core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for fetching resources and relationships.
    Get,
    /// HTTP POST method for creating resources and adding relationships.
    Post,
    /// HTTP PATCH method for updating resources and replacing relationships.
    Patch,
    /// HTTP DELETE method for removing resources and relationships.
    Delete,
}

impl HttpMethod {
    /// All methods the dispatch core routes, in dispatch-probe order.
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Patch, Self::Delete];

    /// Returns the uppercase wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Verify HttpMethod is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpMethod>();
};
