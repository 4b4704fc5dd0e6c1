//! Desktop user interface implementation for Canopus.
//!
//! This module provides the egui-based desktop interface for browsing Cosmos
//! DB accounts. The layout is a fixed arrangement of panels rather than
//! floating tool windows: an explorer sidebar on the left and the document
//! grid in the central panel, with dialogs (connection editing, notification
//! details, document detail) floating above.
//!
//! # UI Architecture
//!
//! ## Panels
//! - **Explorer Sidebar**: [`explorer_sidebar::ExplorerSidebar`] walks
//!   profiles → databases → containers
//! - **Document Grid**: [`document_table::DocumentTable`] renders the
//!   filter row, sortable columns, and pagination controls
//! - **Status Bar**: connection state plus the notification indicator
//!
//! ## Background Work
//!
//! All network operations (token exchange, listing, paging) run on
//! background threads owned by the panel that requested them. Results come
//! back over `std::sync::mpsc` channels polled each frame, stamped with a
//! request sequence number; the latest navigation action wins and stale
//! results are discarded on arrival.
//!
//! ## Theme Support
//! - **Multiple Themes**: Latte, Frappe, Macchiato, and Mocha color schemes via Catppuccin
//! - **User Preference Persistence**: theme choice saved across sessions

pub mod app;
pub mod connection_dialog;
pub mod document_table;
pub mod explorer_sidebar;

pub use app::CanopusApp;
pub use connection_dialog::ConnectionDialog;
pub use document_table::DocumentTable;
pub use explorer_sidebar::{ExplorerSidebar, SidebarEvent};
