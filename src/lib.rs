//! Canopus - Azure Cosmos DB Browser
//!
//! Canopus is a desktop application for browsing Azure Cosmos DB databases,
//! containers, and documents read-only. Connection profiles (endpoint plus
//! OAuth2 client-credentials parameters) are kept in a local SQLite store;
//! authentication and document access go through the account's HTTPS
//! surface.
//!
//! # Core Features
//!
//! - **Connection Profiles**: named account configurations, saved locally
//! - **Explorer Sidebar**: profiles → databases → containers navigation
//! - **Document Grid**: paginated, per-column filterable and sortable view
//! - **Read-Only Access**: no write operation exists anywhere in the access
//!   layer, so the tool is safe to point at production accounts
//!
//! # Architecture Overview
//!
//! The application follows a layered architecture with clear separation of
//! concerns:
//!
//! - **UI Layer** ([`app::dashui`]): egui-based desktop interface
//! - **Access Layer** ([`app::cosmos_identity`], [`app::data_plane`]):
//!   OAuth2 token handling and the read-only document client
//! - **Storage Layer** ([`app::connection_profiles`]): SQLite-backed
//!   profile persistence
//!
//! Network work runs on background threads and reports back over channels
//! polled from the update loop, keeping the interface responsive; a stale
//! in-flight request is superseded by the latest navigation action.
//!
//! # Getting Started
//!
//! The main application entry point is [`CanopusApp`], which wires the
//! sidebar, document table, and notification surfaces together.

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub use app::CanopusApp;
