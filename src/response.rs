//! The controller-produced response envelope.

use crate::document::Document;

/// A mapped document paired with the HTTP status code to serve it under.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    document: Document,
    status_code: u16,
}

impl Response {
    /// Wraps a document under a status code.
    #[must_use]
    pub const fn new(document: Document, status_code: u16) -> Self {
        Self {
            document,
            status_code,
        }
    }

    /// The HTTP status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The response document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Consumes the response into its document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_carries_document_and_status() {
        let response = Response::new(Document::new(), 204);
        assert_eq!(response.status_code(), 204);
        assert!(!response.document().has_data());
    }
}
