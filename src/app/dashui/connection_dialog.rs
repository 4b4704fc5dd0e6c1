//! Add/edit dialog for connection profiles.

use egui::{self, Context, RichText, Vec2};

use crate::app::connection_profiles::{
    ConnectionProfile, ProfileStore, SaveMode, StoreError, DEFAULT_GRANT_TYPE, DEFAULT_RESOURCE,
};
use crate::app::notifications::NotificationManager;

#[derive(Debug, Clone, PartialEq)]
enum DialogMode {
    Add,
    Edit { original_name: String },
}

/// Modal-style window for creating or editing a connection profile.
pub struct ConnectionDialog {
    pub open: bool,
    mode: DialogMode,
    name: String,
    cosmos_endpoint: String,
    service_url: String,
    client_id: String,
    client_secret: String,
    resource: String,
    grant_type: String,
    error_message: Option<String>,
    first_open: bool, // Track if this is the first time opening the window
}

impl Default for ConnectionDialog {
    fn default() -> Self {
        Self {
            open: false,
            mode: DialogMode::Add,
            name: String::new(),
            cosmos_endpoint: String::new(),
            service_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            resource: DEFAULT_RESOURCE.to_string(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
            error_message: None,
            first_open: true,
        }
    }
}

impl ConnectionDialog {
    /// Open with empty fields for a new profile.
    pub fn open_for_add(&mut self) {
        *self = Self::default();
        self.open = true;
    }

    /// Open pre-populated with an existing profile.
    pub fn open_for_edit(&mut self, profile: &ConnectionProfile) {
        *self = Self {
            open: true,
            mode: DialogMode::Edit {
                original_name: profile.name.clone(),
            },
            name: profile.name.clone(),
            cosmos_endpoint: profile.cosmos_endpoint.clone(),
            service_url: profile.service_url.clone(),
            client_id: profile.client_id.clone(),
            client_secret: profile.client_secret.clone(),
            resource: profile.resource.clone(),
            grant_type: profile.grant_type.clone(),
            error_message: None,
            first_open: true,
        };
    }

    /// Show the dialog. Returns true when a profile was saved this frame so
    /// the caller can reload the sidebar's profile list.
    pub fn show(
        &mut self,
        ctx: &Context,
        store: &ProfileStore,
        notifications: &mut NotificationManager,
    ) -> bool {
        if !self.open {
            return false;
        }

        let title = match &self.mode {
            DialogMode::Add => "Add New Connection",
            DialogMode::Edit { .. } => "Edit Connection",
        };

        let mut window_open = self.open;
        let mut saved = false;

        let mut window = egui::Window::new(title)
            .open(&mut window_open)
            .resizable(true)
            .min_width(500.0)
            .collapsible(false);

        if self.first_open {
            // Force center position on first open
            let screen_rect = ctx.screen_rect();
            let window_size = Vec2::new(500.0, 320.0); // Estimated window size
            let center_pos = screen_rect.center() - window_size / 2.0;
            window = window.current_pos(center_pos);
            self.first_open = false;
        }

        window.show(ctx, |ui| {
            egui::Grid::new("connection_form_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .striped(false)
                .show(ui, |ui| {
                    ui.label("Connection Name:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.name)
                            .desired_width(320.0)
                            .hint_text("My Connection"),
                    );
                    ui.end_row();

                    ui.label("Cosmos Endpoint:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.cosmos_endpoint)
                            .desired_width(320.0)
                            .hint_text("https://your-account.documents.azure.com:443/"),
                    );
                    ui.end_row();

                    ui.label("Service URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.service_url)
                            .desired_width(320.0)
                            .hint_text("https://login.microsoftonline.com/<tenant-id>"),
                    );
                    ui.end_row();

                    ui.label("Client ID:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.client_id)
                            .desired_width(320.0)
                            .hint_text("Your client ID"),
                    );
                    ui.end_row();

                    ui.label("Client Secret:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.client_secret)
                            .desired_width(320.0)
                            .password(true)
                            .hint_text("Your client secret"),
                    );
                    ui.end_row();

                    ui.label("Resource:");
                    ui.add(egui::TextEdit::singleline(&mut self.resource).desired_width(320.0));
                    ui.end_row();
                });

            if let Some(error) = &self.error_message {
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::RED, RichText::new(error));
            }

            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save").clicked() {
                    saved = self.handle_save(store, notifications);
                }
                if ui.button("Cancel").clicked() {
                    self.open = false;
                }
            });
        });

        self.open = self.open && window_open && !saved;
        saved
    }

    fn handle_save(
        &mut self,
        store: &ProfileStore,
        notifications: &mut NotificationManager,
    ) -> bool {
        let profile = ConnectionProfile {
            name: self.name.trim().to_string(),
            cosmos_endpoint: self.cosmos_endpoint.trim().to_string(),
            service_url: self.service_url.trim().to_string(),
            client_id: self.client_id.trim().to_string(),
            client_secret: self.client_secret.trim().to_string(),
            resource: self.resource.trim().to_string(),
            grant_type: self.grant_type.clone(),
        };

        if let Err(e) = profile.validate() {
            self.error_message = Some(e.to_string());
            return false;
        }

        let result = match &self.mode {
            // New profiles must not silently replace an existing one
            DialogMode::Add => store.save(&profile, SaveMode::Insert),
            DialogMode::Edit { original_name } => {
                if *original_name == profile.name {
                    store.save(&profile, SaveMode::Upsert)
                } else {
                    // Renaming: insert under the new name, then drop the old row
                    store
                        .save(&profile, SaveMode::Insert)
                        .and_then(|_| store.delete(original_name))
                }
            }
        };

        match result {
            Ok(()) => {
                notifications.add_notification(
                    crate::app::notifications::Notification::new_success(
                        format!("profile_saved_{}", profile.name),
                        "Connection saved".to_string(),
                        format!("Connection '{}' saved successfully", profile.name),
                        "Connection Manager".to_string(),
                    ),
                );
                self.error_message = None;
                true
            }
            Err(e @ (StoreError::DuplicateName(_) | StoreError::Validation(_))) => {
                self.error_message = Some(e.to_string());
                false
            }
            Err(e) => {
                tracing::error!("Failed to save connection profile: {}", e);
                notifications.add_error(
                    &format!("profile_save_failed_{}", profile.name),
                    "Failed to save connection",
                    e.to_string(),
                    "Connection Manager",
                );
                self.error_message = Some(e.to_string());
                false
            }
        }
    }
}
