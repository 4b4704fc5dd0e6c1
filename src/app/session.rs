//! Browsing session state for the active connection.
//!
//! One session exists per application instance. It owns the shared identity
//! handle that background fetch threads authenticate with, plus the current
//! navigation position (database, container). Page data itself is view state
//! and lives with the document table.

use std::sync::{Arc, Mutex};

use crate::app::cosmos_identity::{ConnectionState, CosmosIdentity};

pub const APP_TITLE: &str = "Canopus - Azure Cosmos DB Browser";

#[derive(Default)]
pub struct BrowseSession {
    identity: Option<Arc<Mutex<CosmosIdentity>>>,
    pub database: Option<String>,
    pub container: Option<String>,
}

impl BrowseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Arc<Mutex<CosmosIdentity>>> {
        self.identity.as_ref()
    }

    /// Install the identity for a freshly selected profile, dropping any
    /// previous session state.
    pub fn start(&mut self, identity: Arc<Mutex<CosmosIdentity>>) {
        self.identity = Some(identity);
        self.database = None;
        self.container = None;
    }

    /// Clear the token and forget the navigation position.
    pub fn end(&mut self) {
        if let Some(identity) = &self.identity {
            if let Ok(mut identity) = identity.lock() {
                identity.disconnect();
            }
        }
        self.identity = None;
        self.database = None;
        self.container = None;
    }

    /// Current connection state without blocking the UI.
    ///
    /// The connect thread holds the identity mutex for the whole token
    /// exchange, so a contended lock means a connect is in flight.
    pub fn connection_state(&self) -> ConnectionState {
        match &self.identity {
            Some(identity) => match identity.try_lock() {
                Ok(identity) => identity.connection_state.clone(),
                Err(_) => ConnectionState::Connecting,
            },
            None => ConnectionState::NotConnected,
        }
    }

    pub fn profile_name(&self) -> Option<String> {
        self.identity
            .as_ref()
            .and_then(|identity| identity.try_lock().ok().map(|i| i.profile().name.clone()))
    }

    pub fn select_container(&mut self, database: String, container: String) {
        self.database = Some(database);
        self.container = Some(container);
    }

    /// Window title reflecting the current navigation position.
    pub fn window_title(&self) -> String {
        match (&self.database, &self.container) {
            (Some(database), Some(container)) => {
                format!("Azure Cosmos DB Browser - {}/{}", database, container)
            }
            _ => APP_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::connection_profiles::ConnectionProfile;

    fn identity() -> Arc<Mutex<CosmosIdentity>> {
        Arc::new(Mutex::new(CosmosIdentity::new(ConnectionProfile::new(
            "Dev",
        ))))
    }

    #[test]
    fn test_title_follows_selection() {
        let mut session = BrowseSession::new();
        assert_eq!(session.window_title(), APP_TITLE);

        session.start(identity());
        session.select_container("orders".to_string(), "invoices".to_string());
        assert_eq!(
            session.window_title(),
            "Azure Cosmos DB Browser - orders/invoices"
        );

        session.end();
        assert_eq!(session.window_title(), APP_TITLE);
    }

    #[test]
    fn test_start_resets_navigation() {
        let mut session = BrowseSession::new();
        session.start(identity());
        session.select_container("db".to_string(), "c1".to_string());

        session.start(identity());
        assert!(session.database.is_none());
        assert!(session.container.is_none());
        assert!(session.profile_name().is_some());
    }
}
