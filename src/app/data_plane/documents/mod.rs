//! Cosmos DB Document Integration Module
//!
//! Provides read-only querying and display of documents in Cosmos DB
//! containers.
//!
//! ## Features
//!
//! - List databases and containers for the authenticated account
//! - Fetch document pages with continuation-token pagination
//! - Per-column filtering and sorting over a fetched page
//!
//! ## Usage
//!
//! ```rust,no_run
//! use canopus::app::data_plane::documents::{DocumentClient, PageOptions};
//! # use std::sync::{Arc, Mutex};
//! # use canopus::app::cosmos_identity::CosmosIdentity;
//!
//! # async fn example(identity: Arc<Mutex<CosmosIdentity>>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = DocumentClient::new(identity);
//!
//! // First page of 50 documents
//! let page = client
//!     .fetch_page("orders", "invoices", PageOptions::new().with_max_item_count(50))
//!     .await?;
//!
//! for document in &page.documents {
//!     println!("{:?}", document.get("id"));
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod client;
pub mod page_filter;
pub mod types;

// Re-export commonly used types
pub use client::DocumentClient;
pub use page_filter::{ColumnPredicate, FilterSet, SortDirection};
pub use types::{column_names, Document, DocumentPage, PageOptions};
