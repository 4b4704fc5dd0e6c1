//! Data Plane Services Module
//!
//! This module contains the service integrations that read data inside
//! Cosmos DB resources, as opposed to control plane concerns (profile
//! storage and authentication).
//!
//! ## Available Services
//!
//! - **Documents**: list databases/containers and page through container
//!   documents, with in-memory filtering and sorting over the fetched page
//!
//! ## Architecture
//!
//! Each service follows the same shape:
//!
//! ```text
//! 1. REST Client Layer (src/app/data_plane/{service}/)
//!    └─ async client holding the session identity
//!
//! 2. UI Viewer Window
//!    └─ visual interface for data exploration
//! ```
//!
//! Clients are async and are driven from background threads owned by the UI
//! layer; results come back over channels polled in the egui update loop.

pub mod documents;

// Re-export commonly used types
pub use documents::{DocumentClient, DocumentPage, PageOptions};
