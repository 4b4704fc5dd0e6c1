//! Cosmos DB Document Data Types
//!
//! Data structures for document pages, pagination options, and column handling.

#![warn(clippy::all, rust_2018_idioms)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single Cosmos DB document.
///
/// Containers are schema-flexible, so a document is an ordered mapping from
/// column name to a JSON value rather than a fixed-shape struct. Key order is
/// preserved as returned by the service.
pub type Document = serde_json::Map<String, Value>;

/// Options for fetching one page of documents
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Maximum number of documents to return in one page
    pub max_item_count: i32,
    /// Continuation token from a previous page (None = start from the beginning)
    pub continuation: Option<String>,
}

impl PageOptions {
    /// Create new PageOptions with default values
    pub fn new() -> Self {
        Self {
            max_item_count: 100, // Default to 100 documents per page
            continuation: None,
        }
    }

    /// Set the page size
    pub fn with_max_item_count(mut self, max_item_count: i32) -> Self {
        self.max_item_count = max_item_count;
        self
    }

    /// Set the continuation token
    pub fn with_continuation(mut self, continuation: String) -> Self {
        self.continuation = Some(continuation);
        self
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One page of documents from a container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Documents in this page, in service order
    pub documents: Vec<Document>,
    /// Token for the next page (absent when pagination is exhausted)
    pub continuation: Option<String>,
    /// Number of documents in this page
    pub document_count: usize,
}

impl DocumentPage {
    /// Create a new empty page
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            continuation: None,
            document_count: 0,
        }
    }

    /// Create a new page with documents
    pub fn new(documents: Vec<Document>, continuation: Option<String>) -> Self {
        let document_count = documents.len();
        Self {
            documents,
            continuation,
            document_count,
        }
    }

    /// Whether the service reported more documents beyond this page
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

/// Column names for a page: the union of document keys in first-seen order.
///
/// Documents in the same container can have divergent shapes, so the first
/// document alone may not name every column.
pub fn column_names(documents: &[Document]) -> Vec<String> {
    let mut columns = Vec::new();
    for document in documents {
        for key in document.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be a JSON object"),
        }
    }

    #[test]
    fn test_page_options_builder() {
        let options = PageOptions::new()
            .with_max_item_count(50)
            .with_continuation("token-1".to_string());

        assert_eq!(options.max_item_count, 50);
        assert_eq!(options.continuation, Some("token-1".to_string()));
    }

    #[test]
    fn test_page_options_defaults() {
        let options = PageOptions::default();

        assert_eq!(options.max_item_count, 100);
        assert!(options.continuation.is_none());
    }

    #[test]
    fn test_document_page_empty() {
        let page = DocumentPage::empty();

        assert_eq!(page.documents.len(), 0);
        assert_eq!(page.document_count, 0);
        assert!(!page.has_more());
    }

    #[test]
    fn test_document_page_with_continuation() {
        let documents = vec![doc(json!({"id": "1"})), doc(json!({"id": "2"}))];
        let page = DocumentPage::new(documents, Some("next".to_string()));

        assert_eq!(page.document_count, 2);
        assert!(page.has_more());
    }

    #[test]
    fn test_column_names_preserve_first_seen_order() {
        let documents = vec![
            doc(json!({"id": "1", "status": "active"})),
            doc(json!({"id": "2", "region": "westus", "status": "idle"})),
        ];

        let columns = column_names(&documents);
        assert_eq!(columns, vec!["id", "status", "region"]);
    }

    #[test]
    fn test_column_names_empty_page() {
        assert!(column_names(&[]).is_empty());
    }

    #[test]
    fn test_document_page_serialization() {
        let documents = vec![doc(json!({"id": "1", "count": 3}))];
        let page = DocumentPage::new(documents, Some("token".to_string()));

        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("token"));

        let deserialized: DocumentPage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.document_count, 1);
        assert_eq!(deserialized.continuation, Some("token".to_string()));
    }
}
