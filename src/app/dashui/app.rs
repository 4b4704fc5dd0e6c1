//! Main application window and frame loop.

use eframe::egui;

use crate::app::connection_profiles::ProfileStore;
use crate::app::notifications::error_window::NotificationDetailsWindow;
use crate::app::notifications::NotificationManager;
use crate::app::session::BrowseSession;

use super::connection_dialog::ConnectionDialog;
use super::document_table::DocumentTable;
use super::explorer_sidebar::{ExplorerSidebar, SidebarEvent};

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq, Default)]
pub enum ThemeChoice {
    #[default]
    Latte,
    Frappe,
    Macchiato,
    Mocha,
}

impl std::fmt::Display for ThemeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeChoice::Latte => write!(f, "Latte"),
            ThemeChoice::Frappe => write!(f, "Frappe"),
            ThemeChoice::Macchiato => write!(f, "Macchiato"),
            ThemeChoice::Mocha => write!(f, "Mocha"),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CanopusApp {
    pub theme: ThemeChoice,

    #[serde(skip)]
    profile_store: Option<ProfileStore>,
    #[serde(skip)]
    pub session: BrowseSession,
    #[serde(skip)]
    pub sidebar: ExplorerSidebar,
    #[serde(skip)]
    pub document_table: DocumentTable,
    #[serde(skip)]
    pub connection_dialog: ConnectionDialog,
    #[serde(skip)]
    pub notification_manager: NotificationManager,
    #[serde(skip)]
    sidebar_initialized: bool,
    #[serde(skip)]
    window_title: Option<String>,
}

impl Default for CanopusApp {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::default(),
            profile_store: None,
            session: BrowseSession::new(),
            sidebar: ExplorerSidebar::new(),
            document_table: DocumentTable::new(),
            connection_dialog: ConnectionDialog::default(),
            notification_manager: NotificationManager::new(),
            sidebar_initialized: false,
            window_title: None,
        }
    }
}

impl CanopusApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: CanopusApp = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Self::default()
        };

        // Apply the saved theme
        app.apply_theme(&cc.egui_ctx);
        app.open_profile_store();

        app
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        match self.theme {
            ThemeChoice::Latte => catppuccin_egui::set_theme(ctx, catppuccin_egui::LATTE),
            ThemeChoice::Frappe => catppuccin_egui::set_theme(ctx, catppuccin_egui::FRAPPE),
            ThemeChoice::Macchiato => catppuccin_egui::set_theme(ctx, catppuccin_egui::MACCHIATO),
            ThemeChoice::Mocha => catppuccin_egui::set_theme(ctx, catppuccin_egui::MOCHA),
        }
    }

    fn open_profile_store(&mut self) {
        let Some(path) = ProfileStore::default_path() else {
            self.notification_manager.add_error(
                "store_open_failed",
                "Profile storage unavailable",
                "Could not determine the user data directory".to_string(),
                "Connection Manager",
            );
            return;
        };

        match ProfileStore::open(&path) {
            Ok(store) => {
                self.profile_store = Some(store);
            }
            Err(e) => {
                tracing::error!("Failed to open profile store at {:?}: {}", path, e);
                self.notification_manager.add_error(
                    "store_open_failed",
                    "Profile storage unavailable",
                    e.to_string(),
                    "Connection Manager",
                );
            }
        }
    }

    fn render_top_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let original_theme = self.theme;
                    for theme in [
                        ThemeChoice::Latte,
                        ThemeChoice::Frappe,
                        ThemeChoice::Macchiato,
                        ThemeChoice::Mocha,
                    ] {
                        ui.selectable_value(&mut self.theme, theme, theme.to_string());
                    }
                    if self.theme != original_theme {
                        self.apply_theme(ctx);
                    }
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.session.profile_name() {
                    Some(name)
                        if self.session.connection_state()
                            == crate::app::cosmos_identity::ConnectionState::Connected =>
                    {
                        ui.label(format!("Connected: {}", name));
                    }
                    _ => {
                        ui.weak("Not connected");
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.notification_manager.render_status_bar_indicator(ui);
                });
            });
        });
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        let mut event = None;
        egui::SidePanel::left("explorer_sidebar")
            .resizable(true)
            .default_width(260.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                event = self.sidebar.show(
                    ui,
                    self.profile_store.as_ref(),
                    &mut self.session,
                    &mut self.notification_manager,
                );
            });

        match event {
            Some(SidebarEvent::OpenAddDialog) => {
                self.connection_dialog.open_for_add();
            }
            Some(SidebarEvent::OpenEditDialog(profile)) => {
                self.connection_dialog.open_for_edit(&profile);
            }
            Some(SidebarEvent::ContainerSelected {
                database,
                container,
            }) => {
                self.session
                    .select_container(database.clone(), container.clone());
                if let Some(identity) = self.session.identity().cloned() {
                    self.document_table
                        .open_container(identity, database, container);
                }
                self.sync_window_title(ctx);
            }
            Some(SidebarEvent::Disconnected) => {
                self.document_table.clear();
                self.session.database = None;
                self.session.container = None;
                self.sync_window_title(ctx);
            }
            None => {}
        }
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let identity = self.session.identity().cloned();
            self.document_table
                .show(ui, identity.as_ref(), &mut self.notification_manager);
        });
    }

    /// Keep the OS window title in sync with the navigation position.
    fn sync_window_title(&mut self, ctx: &egui::Context) {
        let title = self.session.window_title();
        if self.window_title.as_deref() != Some(title.as_str()) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = Some(title);
        }
    }
}

impl eframe::App for CanopusApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // First frame: populate the sidebar from the store
        if !self.sidebar_initialized {
            if let Some(store) = &self.profile_store {
                self.sidebar
                    .reload_profiles(store, &mut self.notification_manager);
            }
            self.sidebar_initialized = true;
        }

        self.render_top_menu_bar(ctx);
        self.render_status_bar(ctx);
        self.render_sidebar(ctx);
        self.render_central_panel(ctx);

        // Connection dialog and notification details float above the panels
        if let Some(store) = &self.profile_store {
            if self
                .connection_dialog
                .show(ctx, store, &mut self.notification_manager)
            {
                self.sidebar
                    .reload_profiles(store, &mut self.notification_manager);
            }
        }

        NotificationDetailsWindow::show(&mut self.notification_manager, ctx);
    }
}
