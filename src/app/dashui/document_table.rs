//! Document Grid
//!
//! Paginated, filterable, sortable view of one container's documents.
//!
//! Filtering and sorting are applied in memory to the page already fetched;
//! pagination walks forward with the service's continuation token. A new
//! fetch supersedes any in-flight one: results are stamped with a sequence
//! number and stale arrivals are dropped.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::app::cosmos_identity::{AccessError, CosmosIdentity};
use crate::app::data_plane::documents::page_filter::{
    display_value, filter_rows, sort_rows, FilterSet, SortDirection,
};
use crate::app::data_plane::documents::{column_names, DocumentClient, DocumentPage, PageOptions};
use crate::app::notifications::NotificationManager;

/// Result from background page loading
type PageLoadResult = Result<DocumentPage, AccessError>;

struct PageLoad {
    seq: u64,
    page_index: usize,
    result: PageLoadResult,
}

pub struct DocumentTable {
    database: Option<String>,
    container: Option<String>,

    page: Option<DocumentPage>,
    columns: Vec<String>,
    /// 1-based index of the page currently displayed
    page_index: usize,
    page_size: i32,

    // Raw filter-row text, keyed by column
    filter_inputs: HashMap<String, String>,
    sort: Option<(String, SortDirection)>,

    loading: bool,
    error_message: Option<String>,

    // Document selected for the JSON detail window
    detail_row: Option<usize>,
    detail_open: bool,

    // Channel for receiving page results from background threads
    load_receiver: mpsc::Receiver<PageLoad>,
    load_sender: mpsc::Sender<PageLoad>,
    request_seq: u64,
}

impl Default for DocumentTable {
    fn default() -> Self {
        let (load_sender, load_receiver) = mpsc::channel();
        Self {
            database: None,
            container: None,
            page: None,
            columns: Vec::new(),
            page_index: 0,
            page_size: 100,
            filter_inputs: HashMap::new(),
            sort: None,
            loading: false,
            error_message: None,
            detail_row: None,
            detail_open: false,
            load_receiver,
            load_sender,
            request_seq: 0,
        }
    }
}

impl DocumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the first page of a newly selected container, dropping all view
    /// state from the previous one.
    pub fn open_container(
        &mut self,
        identity: Arc<Mutex<CosmosIdentity>>,
        database: String,
        container: String,
    ) {
        self.database = Some(database);
        self.container = Some(container);
        self.page = None;
        self.columns.clear();
        self.filter_inputs.clear();
        self.sort = None;
        self.detail_row = None;
        self.detail_open = false;
        self.fetch_page(identity, None, 1);
    }

    /// Drop everything, e.g. on disconnect.
    pub fn clear(&mut self) {
        *self = Self {
            page_size: self.page_size,
            ..Self::default()
        };
    }

    pub fn has_container(&self) -> bool {
        self.database.is_some() && self.container.is_some()
    }

    /// Fetch one page on a background thread.
    fn fetch_page(
        &mut self,
        identity: Arc<Mutex<CosmosIdentity>>,
        continuation: Option<String>,
        page_index: usize,
    ) {
        let (Some(database), Some(container)) = (self.database.clone(), self.container.clone())
        else {
            return;
        };

        self.loading = true;
        self.error_message = None;

        self.request_seq += 1;
        let seq = self.request_seq;
        let sender = self.load_sender.clone();

        let mut options = PageOptions::new().with_max_item_count(self.page_size);
        if let Some(continuation) = continuation {
            options = options.with_continuation(continuation);
        }

        // Create a new thread (since egui runs on a blocking thread) and run tokio inside it
        thread::spawn(move || {
            let client = DocumentClient::new(identity);
            let result = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime.block_on(client.fetch_page(&database, &container, options)),
                Err(e) => Err(AccessError::Connectivity(format!(
                    "failed to create runtime: {}",
                    e
                ))),
            };
            let _ = sender.send(PageLoad {
                seq,
                page_index,
                result,
            });
        });
    }

    /// Poll for page results from background threads
    fn poll_load_results(&mut self, notifications: &mut NotificationManager) {
        while let Ok(load) = self.load_receiver.try_recv() {
            // A newer navigation action superseded this request
            if load.seq != self.request_seq {
                continue;
            }
            self.loading = false;

            match load.result {
                Ok(page) => {
                    if page.documents.is_empty() && load.page_index == 1 {
                        let container = self.container.clone().unwrap_or_default();
                        notifications.add_notification(
                            crate::app::notifications::Notification::new_info(
                                format!("container_empty_{}", container),
                                "No Data".to_string(),
                                format!(
                                    "Container '{}' is empty or no documents could be retrieved",
                                    container
                                ),
                                "Document Browser".to_string(),
                            ),
                        );
                    }
                    self.columns = column_names(&page.documents);
                    self.page_index = load.page_index;
                    self.detail_row = None;
                    self.detail_open = false;
                    self.page = Some(page);
                }
                Err(e) => {
                    tracing::warn!("Failed to load documents: {}", e);
                    self.error_message = Some(e.to_string());
                    notifications.add_error(
                        "fetch_page_failed",
                        "Error Loading Data",
                        e.to_string(),
                        "Document Browser",
                    );
                }
            }
        }
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        identity: Option<&Arc<Mutex<CosmosIdentity>>>,
        notifications: &mut NotificationManager,
    ) {
        self.poll_load_results(notifications);

        if self.loading {
            ui.ctx().request_repaint();
        }

        if !self.has_container() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Select a container in the sidebar to browse its documents")
                        .italics()
                        .weak(),
                );
            });
            return;
        }

        self.show_toolbar(ui, identity);
        ui.separator();

        if self.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading documents...");
            });
        } else if let Some(error) = &self.error_message {
            ui.colored_label(Color32::RED, format!("Error: {}", error));
        }

        let Some(page) = self.page.as_ref() else {
            return;
        };

        // Resolve the visible rows for this frame: filter, then sort
        let filter_set = FilterSet::from_inputs(
            self.columns
                .iter()
                .map(|c| {
                    (
                        c.as_str(),
                        self.filter_inputs.get(c).map(|s| s.as_str()).unwrap_or(""),
                    )
                })
                .collect::<Vec<_>>(),
        );
        let mut rows = filter_rows(&page.documents, &filter_set);
        if let Some((column, direction)) = &self.sort {
            sort_rows(&page.documents, &mut rows, column, *direction);
        }
        let document_count = page.document_count;
        let has_more = page.has_more();

        let footer_height = 40.0;
        let table_height = ui.available_height() - footer_height;

        egui::ScrollArea::horizontal()
            .id_salt("document_table_scroll")
            .show(ui, |ui| {
                self.render_table(ui, &rows, table_height);
            });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!(
                "Showing {} of {} documents · page {}",
                rows.len(),
                document_count,
                self.page_index.max(1)
            ));
            if has_more {
                ui.label(RichText::new("· more available").weak());
            }
        });

        self.show_detail_window(ui);
    }

    fn show_toolbar(&mut self, ui: &mut Ui, identity: Option<&Arc<Mutex<CosmosIdentity>>>) {
        let (database, container) = (
            self.database.clone().unwrap_or_default(),
            self.container.clone().unwrap_or_default(),
        );

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{}/{}", database, container)).strong());

            ui.separator();
            ui.label("Page size:");
            ui.add(
                egui::DragValue::new(&mut self.page_size)
                    .range(1..=1000)
                    .speed(10),
            );

            let identity = identity.cloned();
            let can_fetch = identity.is_some() && !self.loading;

            if ui
                .add_enabled(can_fetch, egui::Button::new("Refresh"))
                .on_hover_text("Reload the first page")
                .clicked()
            {
                if let Some(identity) = identity.clone() {
                    self.fetch_page(identity, None, 1);
                }
            }

            let next_token = self
                .page
                .as_ref()
                .and_then(|page| page.continuation.clone());
            if ui
                .add_enabled(
                    can_fetch && next_token.is_some(),
                    egui::Button::new("Next Page"),
                )
                .clicked()
            {
                if let (Some(identity), Some(token)) = (identity.clone(), next_token) {
                    let next_index = self.page_index + 1;
                    self.fetch_page(identity, Some(token), next_index);
                }
            }

            if ui
                .add_enabled(
                    can_fetch && self.page_index > 1,
                    egui::Button::new("First Page"),
                )
                .clicked()
            {
                if let Some(identity) = identity {
                    self.fetch_page(identity, None, 1);
                }
            }
        });
    }

    fn render_table(&mut self, ui: &mut Ui, rows: &[usize], max_height: f32) {
        if self.columns.is_empty() {
            return;
        }

        let Some(page) = self.page.clone() else {
            return;
        };
        let columns = self.columns.clone();

        let mut clicked_sort: Option<String> = None;
        let mut clicked_row: Option<usize> = None;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(max_height)
            .sense(egui::Sense::click())
            .columns(Column::auto().at_least(80.0).clip(true), columns.len())
            .header(44.0, |mut header| {
                for column in &columns {
                    header.col(|ui| {
                        ui.vertical(|ui| {
                            let arrow = match &self.sort {
                                Some((sorted, SortDirection::Ascending)) if sorted == column => {
                                    " ⏶"
                                }
                                Some((sorted, SortDirection::Descending)) if sorted == column => {
                                    " ⏷"
                                }
                                _ => "",
                            };
                            if ui
                                .button(RichText::new(format!("{}{}", column, arrow)).strong())
                                .on_hover_text("Sort by this column")
                                .clicked()
                            {
                                clicked_sort = Some(column.clone());
                            }

                            let filter = self.filter_inputs.entry(column.clone()).or_default();
                            ui.add(
                                egui::TextEdit::singleline(filter)
                                    .desired_width(110.0)
                                    .hint_text(format!("Filter {}...", column)),
                            );
                        });
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, rows.len(), |mut table_row| {
                    let document_index = rows[table_row.index()];
                    let document = &page.documents[document_index];
                    for column in &columns {
                        table_row.col(|ui| {
                            let text = display_value(document, column);
                            ui.add(egui::Label::new(text).truncate());
                        });
                    }
                    if table_row.response().clicked() {
                        clicked_row = Some(document_index);
                    }
                });
            });

        if let Some(column) = clicked_sort {
            self.toggle_sort(column);
        }
        if let Some(row) = clicked_row {
            self.detail_row = Some(row);
            self.detail_open = true;
        }
    }

    fn toggle_sort(&mut self, column: String) {
        self.sort = match self.sort.take() {
            Some((current, direction)) if current == column => {
                Some((column, direction.toggled()))
            }
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    /// JSON tree view of the selected document.
    fn show_detail_window(&mut self, ui: &mut Ui) {
        if !self.detail_open {
            return;
        }
        let Some(row) = self.detail_row else {
            return;
        };
        let Some(document) = self
            .page
            .as_ref()
            .and_then(|page| page.documents.get(row))
            .cloned()
        else {
            self.detail_open = false;
            return;
        };

        let title = document
            .get("id")
            .and_then(|id| id.as_str())
            .map(|id| format!("Document: {}", id))
            .unwrap_or_else(|| "Document".to_string());

        let mut open = self.detail_open;
        egui::Window::new(title)
            .open(&mut open)
            .default_size([520.0, 420.0])
            .resizable(true)
            .show(ui.ctx(), |ui| {
                let value = serde_json::Value::Object(document);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui_json_tree::JsonTree::new("document_detail_json", &value)
                        .default_expand(egui_json_tree::DefaultExpand::ToLevel(2))
                        .show(ui);
                });
            });
        self.detail_open = open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_page_size() {
        let mut table = DocumentTable::new();
        table.page_size = 250;
        table.database = Some("db".to_string());
        table.container = Some("c".to_string());
        table.page = Some(DocumentPage::empty());

        table.clear();
        assert_eq!(table.page_size, 250);
        assert!(!table.has_container());
        assert!(table.page.is_none());
    }

    #[test]
    fn test_toggle_sort_cycles_direction() {
        let mut table = DocumentTable::new();

        table.toggle_sort("status".to_string());
        assert_eq!(
            table.sort,
            Some(("status".to_string(), SortDirection::Ascending))
        );

        table.toggle_sort("status".to_string());
        assert_eq!(
            table.sort,
            Some(("status".to_string(), SortDirection::Descending))
        );

        // Switching columns resets to ascending
        table.toggle_sort("id".to_string());
        assert_eq!(table.sort, Some(("id".to_string(), SortDirection::Ascending)));
    }
}
