//! Explorer sidebar: saved connections, databases, and containers.
//!
//! Connecting and listing run on background threads; results come back over
//! a channel stamped with a request sequence number so a stale response from
//! a superseded action is discarded on arrival.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use egui::{Color32, RichText, ScrollArea, Ui};

use crate::app::connection_profiles::ProfileStore;
use crate::app::cosmos_identity::{AccessError, ConnectionState, CosmosIdentity};
use crate::app::data_plane::documents::DocumentClient;
use crate::app::notifications::NotificationManager;
use crate::app::session::BrowseSession;

/// What the sidebar asked the application to do this frame.
pub enum SidebarEvent {
    OpenAddDialog,
    OpenEditDialog(crate::app::connection_profiles::ConnectionProfile),
    ContainerSelected { database: String, container: String },
    Disconnected,
}

/// Result from background connect/list work
enum LoadResult {
    Connected {
        seq: u64,
        result: Result<Vec<String>, AccessError>,
    },
    Containers {
        seq: u64,
        result: Result<Vec<String>, AccessError>,
    },
}

pub struct ExplorerSidebar {
    profiles: Vec<String>,
    selected_profile: Option<String>,

    databases: Vec<String>,
    containers: Vec<String>,
    selected_database: Option<String>,
    selected_container: Option<String>,

    connecting: bool,
    loading_containers: bool,
    pending_delete: Option<String>,

    // Channel for receiving results from background threads
    load_receiver: mpsc::Receiver<LoadResult>,
    load_sender: mpsc::Sender<LoadResult>,
    request_seq: u64,
}

impl Default for ExplorerSidebar {
    fn default() -> Self {
        let (load_sender, load_receiver) = mpsc::channel();
        Self {
            profiles: Vec::new(),
            selected_profile: None,
            databases: Vec::new(),
            containers: Vec::new(),
            selected_database: None,
            selected_container: None,
            connecting: false,
            loading_containers: false,
            pending_delete: None,
            load_receiver,
            load_sender,
            request_seq: 0,
        }
    }
}

impl ExplorerSidebar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload the saved-profile names from the store.
    pub fn reload_profiles(&mut self, store: &ProfileStore, notifications: &mut NotificationManager) {
        match store.list() {
            Ok(profiles) => {
                self.profiles = profiles.into_iter().map(|p| p.name).collect();
                if let Some(selected) = &self.selected_profile {
                    if !self.profiles.contains(selected) {
                        self.selected_profile = None;
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to list connection profiles: {}", e);
                notifications.add_error(
                    "profile_list_failed",
                    "Failed to load connections",
                    e.to_string(),
                    "Connection Manager",
                );
            }
        }
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        store: Option<&ProfileStore>,
        session: &mut BrowseSession,
        notifications: &mut NotificationManager,
    ) -> Option<SidebarEvent> {
        self.poll_load_results(notifications);

        if self.connecting || self.loading_containers {
            ui.ctx().request_repaint();
        }

        let mut event = None;

        ui.add_space(4.0);
        if let Some(e) = self.show_connections_section(ui, store, session, notifications) {
            event = Some(e);
        }

        ui.separator();
        self.show_databases_section(ui, session);

        ui.separator();
        if let Some(e) = self.show_containers_section(ui) {
            event = Some(e);
        }

        self.show_delete_confirmation(ui, store, notifications);

        event
    }

    fn show_connections_section(
        &mut self,
        ui: &mut Ui,
        store: Option<&ProfileStore>,
        session: &mut BrowseSession,
        notifications: &mut NotificationManager,
    ) -> Option<SidebarEvent> {
        let mut event = None;

        ui.label(RichText::new("Saved Connections").strong());
        ScrollArea::vertical()
            .id_salt("saved_connections_list")
            .max_height(140.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for name in self.profiles.clone() {
                    let selected = self.selected_profile.as_deref() == Some(name.as_str());
                    if ui.selectable_label(selected, &name).clicked() {
                        self.selected_profile = Some(name);
                    }
                }
                if self.profiles.is_empty() {
                    ui.label(RichText::new("No saved connections").italics().weak());
                }
            });

        let state = session.connection_state();

        ui.horizontal(|ui| {
            match state {
                ConnectionState::Connected => {
                    if ui.button("Disconnect").clicked() {
                        session.end();
                        self.clear_navigation();
                        event = Some(SidebarEvent::Disconnected);
                    }
                }
                ConnectionState::Connecting => {
                    let _ = ui.add_enabled(false, egui::Button::new("Connecting..."));
                }
                _ => {
                    let can_connect = self.selected_profile.is_some()
                        && store.is_some()
                        && !self.connecting;
                    if ui
                        .add_enabled(can_connect, egui::Button::new("Connect"))
                        .clicked()
                    {
                        if let (Some(store), Some(name)) = (store, self.selected_profile.clone()) {
                            self.start_connect(store, &name, session, notifications);
                        }
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let has_selection = self.selected_profile.is_some();

                if ui
                    .add_enabled(has_selection, egui::Button::new("−"))
                    .on_hover_text("Remove selected connection")
                    .clicked()
                {
                    self.pending_delete = self.selected_profile.clone();
                }

                if ui
                    .button("+")
                    .on_hover_text("Add new connection")
                    .clicked()
                {
                    event = Some(SidebarEvent::OpenAddDialog);
                }

                if ui
                    .add_enabled(has_selection, egui::Button::new("Edit"))
                    .on_hover_text("Edit selected connection")
                    .clicked()
                {
                    if let (Some(store), Some(name)) = (store, &self.selected_profile) {
                        match store.get(name) {
                            Ok(Some(profile)) => {
                                event = Some(SidebarEvent::OpenEditDialog(profile));
                            }
                            Ok(None) => {
                                notifications.add_error(
                                    "profile_missing",
                                    "Connection not found",
                                    format!("Connection '{}' no longer exists", name),
                                    "Connection Manager",
                                );
                            }
                            Err(e) => {
                                notifications.add_error(
                                    "profile_load_failed",
                                    "Failed to load connection",
                                    e.to_string(),
                                    "Connection Manager",
                                );
                            }
                        }
                    }
                }
            });
        });

        // Status label mirrors the connection lifecycle
        match session.connection_state() {
            ConnectionState::Connected => {
                let name = session.profile_name().unwrap_or_default();
                ui.colored_label(
                    Color32::from_rgb(40, 180, 40),
                    format!("Connected: {}", name),
                );
            }
            ConnectionState::Connecting => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Connecting...");
                });
            }
            ConnectionState::Error(_) => {
                ui.colored_label(Color32::from_rgb(220, 50, 50), "Connection failed");
            }
            ConnectionState::NotConnected => {
                ui.weak("Not connected");
            }
        }

        event
    }

    fn show_databases_section(&mut self, ui: &mut Ui, session: &mut BrowseSession) {
        ui.label(RichText::new("Databases").strong());
        ScrollArea::vertical()
            .id_salt("database_list")
            .max_height(ui.available_height() * 0.45)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for name in self.databases.clone() {
                    let selected = self.selected_database.as_deref() == Some(name.as_str());
                    if ui.selectable_label(selected, &name).clicked() {
                        self.select_database(name, session.identity().cloned());
                    }
                }
            });
    }

    fn show_containers_section(&mut self, ui: &mut Ui) -> Option<SidebarEvent> {
        let mut event = None;

        ui.label(RichText::new("Containers").strong());
        if self.loading_containers {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading containers...");
            });
        }
        ScrollArea::vertical()
            .id_salt("container_list")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for name in self.containers.clone() {
                    let selected = self.selected_container.as_deref() == Some(name.as_str());
                    if ui.selectable_label(selected, &name).clicked() {
                        self.selected_container = Some(name.clone());
                        if let Some(database) = self.selected_database.clone() {
                            event = Some(SidebarEvent::ContainerSelected {
                                database,
                                container: name,
                            });
                        }
                    }
                }
            });

        event
    }

    fn show_delete_confirmation(
        &mut self,
        ui: &mut Ui,
        store: Option<&ProfileStore>,
        notifications: &mut NotificationManager,
    ) {
        let Some(name) = self.pending_delete.clone() else {
            return;
        };
        let mut keep_open = true;

        egui::Window::new("Confirm Deletion")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ui.ctx(), |ui| {
                ui.label(format!(
                    "Are you sure you want to delete connection '{}'?",
                    name
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        if let Some(store) = store {
                            match store.delete(&name) {
                                Ok(()) => {
                                    notifications.add_notification(
                                        crate::app::notifications::Notification::new_info(
                                            format!("profile_deleted_{}", name),
                                            "Connection deleted".to_string(),
                                            format!("Connection '{}' deleted", name),
                                            "Connection Manager".to_string(),
                                        ),
                                    );
                                    self.reload_profiles(store, notifications);
                                }
                                Err(e) => {
                                    notifications.add_error(
                                        "profile_delete_failed",
                                        "Failed to delete connection",
                                        e.to_string(),
                                        "Connection Manager",
                                    );
                                }
                            }
                        }
                        keep_open = false;
                    }
                    if ui.button("No").clicked() {
                        keep_open = false;
                    }
                });
            });

        if !keep_open {
            self.pending_delete = None;
        }
    }

    /// Load the named profile and authenticate on a background thread.
    fn start_connect(
        &mut self,
        store: &ProfileStore,
        name: &str,
        session: &mut BrowseSession,
        notifications: &mut NotificationManager,
    ) {
        let profile = match store.get(name) {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                notifications.add_error(
                    "profile_missing",
                    "Connection not found",
                    format!("Connection '{}' no longer exists", name),
                    "Connection Manager",
                );
                return;
            }
            Err(e) => {
                notifications.add_error(
                    "profile_load_failed",
                    "Failed to load connection",
                    e.to_string(),
                    "Connection Manager",
                );
                return;
            }
        };

        let identity = Arc::new(Mutex::new(CosmosIdentity::new(profile)));
        session.start(Arc::clone(&identity));
        self.clear_navigation();
        self.connecting = true;

        self.request_seq += 1;
        let seq = self.request_seq;
        let sender = self.load_sender.clone();

        // Authenticate and list databases off the UI thread
        thread::spawn(move || {
            let connect_result = match identity.lock() {
                Ok(mut identity) => identity.connect(),
                Err(_) => Err(AccessError::Connectivity(
                    "session state poisoned".to_string(),
                )),
            };

            let result = match connect_result {
                Ok(()) => {
                    let client = DocumentClient::new(Arc::clone(&identity));
                    match tokio::runtime::Runtime::new() {
                        Ok(runtime) => runtime.block_on(client.list_databases()),
                        Err(e) => Err(AccessError::Connectivity(format!(
                            "failed to create runtime: {}",
                            e
                        ))),
                    }
                }
                Err(e) => Err(e),
            };

            let _ = sender.send(LoadResult::Connected { seq, result });
        });
    }

    fn select_database(
        &mut self,
        database: String,
        identity: Option<Arc<Mutex<CosmosIdentity>>>,
    ) {
        self.selected_database = Some(database.clone());
        self.selected_container = None;
        self.containers.clear();

        let Some(identity) = identity else {
            return;
        };
        self.loading_containers = true;

        self.request_seq += 1;
        let seq = self.request_seq;
        let sender = self.load_sender.clone();

        thread::spawn(move || {
            let client = DocumentClient::new(identity);
            let result = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime.block_on(client.list_containers(&database)),
                Err(e) => Err(AccessError::Connectivity(format!(
                    "failed to create runtime: {}",
                    e
                ))),
            };
            let _ = sender.send(LoadResult::Containers { seq, result });
        });
    }

    /// Poll for results from background threads
    fn poll_load_results(&mut self, notifications: &mut NotificationManager) {
        while let Ok(result) = self.load_receiver.try_recv() {
            match result {
                LoadResult::Connected { seq, result } => {
                    // A newer action superseded this request
                    if seq != self.request_seq {
                        continue;
                    }
                    self.connecting = false;
                    match result {
                        Ok(databases) => {
                            if databases.is_empty() {
                                notifications.add_notification(
                                    crate::app::notifications::Notification::new_warning(
                                        "no_databases".to_string(),
                                        "No databases".to_string(),
                                        vec![crate::app::notifications::NotificationError {
                                            message: "The account lists no databases; the app registration may lack read permissions".to_string(),
                                            code: None,
                                            details: None,
                                        }],
                                        "Connection Manager".to_string(),
                                    ),
                                );
                            }
                            self.databases = databases;
                        }
                        Err(e) => {
                            tracing::warn!("Connect failed: {}", e);
                            notifications.add_error(
                                "connect_failed",
                                "Connection Error",
                                e.to_string(),
                                "Connection Manager",
                            );
                        }
                    }
                }
                LoadResult::Containers { seq, result } => {
                    if seq != self.request_seq {
                        continue;
                    }
                    self.loading_containers = false;
                    match result {
                        Ok(containers) => {
                            self.containers = containers;
                        }
                        Err(e) => {
                            tracing::warn!("Listing containers failed: {}", e);
                            notifications.add_error(
                                "list_containers_failed",
                                "Failed to list containers",
                                e.to_string(),
                                "Document Browser",
                            );
                        }
                    }
                }
            }
        }
    }

    fn clear_navigation(&mut self) {
        self.databases.clear();
        self.containers.clear();
        self.selected_database = None;
        self.selected_container = None;
        self.loading_containers = false;
        self.connecting = false;
    }
}
