//! Application state and logic

use std::time::{Duration, Instant};

use liferec_core::{Record, RecordFields, RecordId, RecordStore};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Window for the second `g` of `gg`
pub const PENDING_G_TIMEOUT: Duration = Duration::from_millis(500);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Waiting for y/n before deleting the selected record
    ConfirmDelete,
}

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Records,
    Detail,
}

impl ActivePane {
    /// Switch to the other pane
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::Records => ActivePane::Detail,
            ActivePane::Detail => ActivePane::Records,
        }
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Which pane has focus
    pub active_pane: ActivePane,
    /// Records in identifier order
    pub records: Vec<Record>,
    /// Currently selected record index
    pub record_index: usize,
    /// Scroll offset for detail pane
    pub detail_scroll: u16,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Pending 'g' keypress for gg sequence (with timestamp)
    pub pending_g: Option<Instant>,
}

impl App {
    /// Create a new app with data from store
    pub fn new(store: &RecordStore) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            active_pane: ActivePane::Records,
            records: Vec::new(),
            record_index: 0,
            detail_scroll: 0,
            status_message: None,
            status_message_time: None,
            error_message: None,
            show_help: false,
            pending_g: None,
        };
        app.refresh(store);
        app
    }

    /// Reload the list from the store, keeping the selection in range
    pub fn refresh(&mut self, store: &RecordStore) {
        self.records = store.records().cloned().collect();

        if self.records.is_empty() {
            self.record_index = 0;
        } else {
            self.record_index = self.record_index.min(self.records.len() - 1);
        }
    }

    /// Get the currently selected record
    pub fn current_record(&self) -> Option<&Record> {
        self.records.get(self.record_index)
    }

    /// Move the selection onto `id` if it is visible
    pub fn select(&mut self, id: RecordId) {
        if let Some(pos) = self.records.iter().position(|r| r.id == id) {
            self.record_index = pos;
            self.detail_scroll = 0;
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Show an error modal
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Check if an error modal is showing
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Dismiss the error modal
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Move selection up in the current pane
    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Records => {
                if self.record_index > 0 {
                    self.record_index -= 1;
                    self.detail_scroll = 0;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
        }
    }

    /// Move selection down in the current pane
    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Records => {
                if self.record_index < self.records.len().saturating_sub(1) {
                    self.record_index += 1;
                    self.detail_scroll = 0;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
        }
    }

    /// Move selection to first item in the current pane (vim 'gg')
    pub fn move_to_first(&mut self) {
        if self.active_pane == ActivePane::Records {
            self.record_index = 0;
        }
        self.detail_scroll = 0;
    }

    /// Move selection to last item in the current pane (vim 'G')
    pub fn move_to_last(&mut self) {
        match self.active_pane {
            ActivePane::Records => {
                self.record_index = self.records.len().saturating_sub(1);
                self.detail_scroll = 0;
            }
            ActivePane::Detail => {
                // The UI clamps this to the content height
                self.detail_scroll = u16::MAX;
            }
        }
    }

    /// Move focus to the other pane
    pub fn switch_pane(&mut self) {
        self.active_pane = self.active_pane.toggle();
    }

    /// Ask for confirmation before deleting the selected record
    pub fn request_delete(&mut self) {
        if self.current_record().is_some() {
            self.input_mode = InputMode::ConfirmDelete;
        } else {
            self.set_status("No record selected");
        }
    }

    /// Return to normal mode
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Create a record from parsed editor fields
    pub fn add_record(&mut self, store: &mut RecordStore, fields: RecordFields) -> anyhow::Result<()> {
        if fields.is_empty() {
            self.set_status("Add cancelled (empty)");
            return Ok(());
        }

        let record = store.create(fields)?;
        self.refresh(store);
        self.select(record.id);
        self.set_status(format!("Added #{} '{}'", record.id, record.title));
        Ok(())
    }

    /// Apply parsed editor fields to the selected record
    pub fn edit_current(&mut self, store: &mut RecordStore, fields: RecordFields) -> anyhow::Result<()> {
        let Some(current) = self.current_record().cloned() else {
            self.set_status("No record selected");
            return Ok(());
        };

        let mut preview = current.clone();
        fields.apply_to(&mut preview);
        if preview == current {
            self.set_status("No changes");
            return Ok(());
        }

        let updated = store.update(&current.id.to_string(), fields)?;
        self.refresh(store);
        self.select(updated.id);
        self.set_status(format!("Record #{} is updated", updated.id));
        Ok(())
    }

    /// Delete the selected record (after confirmation)
    pub fn delete_current(&mut self, store: &mut RecordStore) -> anyhow::Result<()> {
        self.input_mode = InputMode::Normal;
        if let Some(record) = self.current_record().cloned() {
            store.delete(&record.id.to_string())?;
            self.refresh(store);
            self.set_status(format!("Deleted #{} '{}'", record.id, record.title));
        }
        Ok(())
    }
}
