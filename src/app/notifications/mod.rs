use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub mod error_window;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationType {
    Error,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub notification_type: NotificationType,
    pub errors: Vec<NotificationError>,
    #[serde(skip, default = "Instant::now")]
    pub created_at: Instant,
    #[serde(skip, default)]
    pub expires_at: Option<Instant>,
    pub dismissible: bool,
    pub source: String, // e.g., "Connection Manager", "Document Browser"
}

impl Notification {
    pub fn new_error(
        id: String,
        title: String,
        errors: Vec<NotificationError>,
        source: String,
    ) -> Self {
        Self {
            id,
            title,
            notification_type: NotificationType::Error,
            errors,
            created_at: Instant::now(),
            expires_at: None, // Errors don't auto-expire
            dismissible: true,
            source,
        }
    }

    pub fn new_warning(
        id: String,
        title: String,
        errors: Vec<NotificationError>,
        source: String,
    ) -> Self {
        Self {
            id,
            title,
            notification_type: NotificationType::Warning,
            errors,
            created_at: Instant::now(),
            expires_at: Some(Instant::now() + Duration::from_secs(30)),
            dismissible: true,
            source,
        }
    }

    pub fn new_info(id: String, title: String, message: String, source: String) -> Self {
        Self {
            id,
            title,
            notification_type: NotificationType::Info,
            errors: vec![NotificationError {
                message,
                code: None,
                details: None,
            }],
            created_at: Instant::now(),
            expires_at: Some(Instant::now() + Duration::from_secs(10)),
            dismissible: true,
            source,
        }
    }

    pub fn new_success(id: String, title: String, message: String, source: String) -> Self {
        Self {
            id,
            title,
            notification_type: NotificationType::Success,
            errors: vec![NotificationError {
                message,
                code: None,
                details: None,
            }],
            created_at: Instant::now(),
            expires_at: Some(Instant::now() + Duration::from_secs(5)),
            dismissible: true,
            source,
        }
    }

    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Instant::now() > expires_at
        } else {
            false
        }
    }

    pub fn get_color(&self) -> Color32 {
        match self.notification_type {
            NotificationType::Error => Color32::from_rgb(220, 50, 50),
            NotificationType::Warning => Color32::from_rgb(255, 150, 0),
            NotificationType::Info => Color32::from_rgb(70, 130, 200),
            NotificationType::Success => Color32::from_rgb(40, 180, 40),
        }
    }

    pub fn get_icon(&self) -> &'static str {
        match self.notification_type {
            NotificationType::Error => "✗",
            NotificationType::Warning => "⚠",
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
        }
    }
}

#[derive(Default)]
pub struct NotificationManager {
    notifications: HashMap<String, Notification>,
    pub show_details_window: bool,
    pub selected_notification_id: Option<String>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: HashMap::new(),
            show_details_window: false,
            selected_notification_id: None,
        }
    }

    pub fn add_notification(&mut self, notification: Notification) {
        self.notifications
            .insert(notification.id.clone(), notification);
    }

    /// Shorthand for a single-message error notification.
    pub fn add_error(&mut self, id: &str, title: &str, message: String, source: &str) {
        self.add_notification(Notification::new_error(
            id.to_string(),
            title.to_string(),
            vec![NotificationError {
                message,
                code: None,
                details: None,
            }],
            source.to_string(),
        ));
    }

    pub fn dismiss_notification(&mut self, id: &str) {
        self.notifications.remove(id);
        if let Some(selected_id) = &self.selected_notification_id {
            if selected_id == id {
                self.selected_notification_id = None;
                self.show_details_window = false;
            }
        }
    }

    pub fn clear_expired(&mut self) {
        self.notifications
            .retain(|_, notification| !notification.is_expired());
    }

    pub fn get_active_notifications(&self) -> Vec<&Notification> {
        let mut notifications: Vec<&Notification> = self.notifications.values().collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    pub fn get_notification(&self, id: &str) -> Option<&Notification> {
        self.notifications.get(id)
    }

    pub fn get_error_count(&self) -> usize {
        self.notifications
            .values()
            .filter(|n| matches!(n.notification_type, NotificationType::Error))
            .count()
    }

    pub fn get_warning_count(&self) -> usize {
        self.notifications
            .values()
            .filter(|n| matches!(n.notification_type, NotificationType::Warning))
            .count()
    }

    pub fn show_notification_details(&mut self, notification_id: String) {
        self.selected_notification_id = Some(notification_id);
        self.show_details_window = true;
    }

    pub fn render_status_bar_indicator(&mut self, ui: &mut egui::Ui) {
        self.clear_expired();

        let error_count = self.get_error_count();
        let warning_count = self.get_warning_count();

        // Latest transient info/success notification, if any
        let transient = self
            .get_active_notifications()
            .into_iter()
            .find(|n| {
                matches!(
                    n.notification_type,
                    NotificationType::Info | NotificationType::Success
                )
            })
            .map(|n| (n.get_color(), n.get_icon(), n.errors[0].message.clone()));

        if error_count == 0 && warning_count == 0 && transient.is_none() {
            return;
        }

        ui.separator();

        if let Some((color, icon, message)) = transient {
            ui.colored_label(color, format!("{} {}", icon, message));
        }

        if error_count > 0 {
            let error_text = if error_count == 1 {
                "1 error".to_string()
            } else {
                format!("{} errors", error_count)
            };

            if ui
                .colored_label(Color32::from_rgb(220, 50, 50), format!("✗ {}", error_text))
                .clicked()
            {
                // Find the first error notification and show it
                if let Some(error_notification) = self
                    .get_active_notifications()
                    .iter()
                    .find(|n| matches!(n.notification_type, NotificationType::Error))
                {
                    self.show_notification_details(error_notification.id.clone());
                }
            }
        }

        if warning_count > 0 {
            let warning_text = if warning_count == 1 {
                "1 warning".to_string()
            } else {
                format!("{} warnings", warning_count)
            };

            if ui
                .colored_label(
                    Color32::from_rgb(255, 150, 0),
                    format!("⚠ {}", warning_text),
                )
                .clicked()
            {
                if let Some(warning_notification) = self
                    .get_active_notifications()
                    .iter()
                    .find(|n| matches!(n.notification_type, NotificationType::Warning))
                {
                    self.show_notification_details(warning_notification.id.clone());
                }
            }
        }
    }
}
