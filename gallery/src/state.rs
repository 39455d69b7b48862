//! View state for the gallery window.
//!
//! Everything here is synchronous and free of I/O; the UI drives it from its
//! `update` loop and performs the backend calls the returned values ask for.

use crate::sort::{self, SortMode};
use crate::{GalleryError, LoadedGallery, UploadProgress, UploadReport, UploadResult};
use auth::AdminGate;
use rand::Rng;
use records::MediaRecord;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

pub const SORT_MENU_INITIAL_DELAY: Duration = Duration::from_secs(5);
pub const SORT_MENU_INTERACTION_DELAY: Duration = Duration::from_secs(3);

/// Auto-hiding sort affordance. Each (re)show bumps the generation so only
/// the newest hide timer takes effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortMenu {
    visible: bool,
    generation: u64,
}

impl Default for SortMenu {
    fn default() -> Self {
        SortMenu {
            visible: true,
            generation: 0,
        }
    }
}

impl SortMenu {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn show(&mut self, delay: Duration) -> (u64, Duration) {
        self.visible = true;
        self.generation += 1;
        (self.generation, delay)
    }

    /// Called once at startup. Returns the timer to schedule.
    pub fn start(&mut self) -> (u64, Duration) {
        self.show(SORT_MENU_INITIAL_DELAY)
    }

    pub fn interact(&mut self) -> (u64, Duration) {
        self.show(SORT_MENU_INTERACTION_DELAY)
    }

    /// Hide only if no newer timer was scheduled since `generation`.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.visible = false;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPanel {
    pub selection: Vec<PathBuf>,
    pub uploading: bool,
    pub just_completed: bool,
    /// Percent per file name.
    pub progress: BTreeMap<String, u8>,
    pub results: Vec<UploadResult>,
    /// Bumped for every started upload; keys the progress subscription.
    pub generation: u64,
}

impl UploadPanel {
    pub fn select_files(&mut self, paths: Vec<PathBuf>) {
        self.selection = paths;
        self.just_completed = false;
        self.progress.clear();
        self.results.clear();
    }

    pub fn can_upload(&self) -> bool {
        !self.selection.is_empty() && !self.uploading && !self.just_completed
    }

    pub fn begin(&mut self) -> Result<Vec<PathBuf>, GalleryError> {
        if self.selection.is_empty() {
            return Err(GalleryError::EmptySelection);
        }
        self.uploading = true;
        self.generation += 1;
        self.results.clear();
        self.progress = self
            .selection
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .map(|name| (name.to_string(), 0))
            .collect();
        Ok(self.selection.clone())
    }

    pub fn record_progress(&mut self, update: UploadProgress) {
        if self.uploading {
            self.progress.insert(update.file_name, update.percent);
        }
    }

    pub fn finish(&mut self, report: UploadReport) {
        self.uploading = false;
        self.just_completed = true;
        self.selection.clear();
        self.results = report.results;
    }

    /// The upload could not even start; keep the selection for a retry.
    pub fn abort(&mut self) {
        self.uploading = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Cancelled,
    Enabled,
    Disabled,
    IncorrectSecret,
    /// No admin secret is deployed.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    Ignored,
    OpenedViewer,
    ConfirmDelete(MediaRecord),
    Toggled { selected: bool },
}

/// A dismissable message. Each one expires on its own timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    pub records: Vec<MediaRecord>,
    pub skipped: usize,
    pub sort_mode: SortMode,
    pub sort_menu: SortMenu,
    pub admin_mode: bool,
    pub bulk_mode: bool,
    pub selected: HashSet<String>,
    pub viewer: Option<MediaRecord>,
    pub upload: UploadPanel,
    pub notices: Vec<Notice>,
    pub loading: bool,
    next_notice_id: u64,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loaded(&mut self, loaded: LoadedGallery) {
        self.loading = false;
        self.records = loaded.records;
        self.skipped = loaded.skipped;
        let ids: HashSet<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        self.selected.retain(|id| ids.contains(id.as_str()));
        if let Some(viewer) = &self.viewer {
            if !ids.contains(viewer.id.as_str()) {
                self.viewer = None;
            }
        }
    }

    /// Re-order what is already loaded.
    pub fn set_sort_mode<R: Rng + ?Sized>(&mut self, mode: SortMode, rng: &mut R) {
        self.sort_mode = mode;
        sort::apply(&mut self.records, mode, rng);
    }

    /// Post a notice and return its id for the expiry timer.
    pub fn notify(&mut self, text: impl Into<String>) -> u64 {
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id: self.next_notice_id,
            text: text.into(),
        });
        self.next_notice_id
    }

    pub fn latest_notice_id(&self) -> Option<u64> {
        self.notices.last().map(|n| n.id)
    }

    pub fn notice_texts(&self) -> Vec<&str> {
        self.notices.iter().map(|n| n.text.as_str()).collect()
    }

    /// Remove one notice. Dismissing and expiring share this path, so an
    /// already dismissed id is a no-op.
    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn toggle_admin(&mut self, gate: Option<&AdminGate>, input: Option<&str>) -> AdminOutcome {
        let input = match input {
            Some(s) if !s.is_empty() => s,
            _ => return AdminOutcome::Cancelled,
        };
        let Some(gate) = gate else {
            self.notify("Admin mode is not configured");
            return AdminOutcome::Unavailable;
        };
        if !gate.verify(input) {
            self.notify("Incorrect password");
            return AdminOutcome::IncorrectSecret;
        }
        self.admin_mode = !self.admin_mode;
        if self.admin_mode {
            self.viewer = None;
            self.notify("Admin mode enabled");
            AdminOutcome::Enabled
        } else {
            self.bulk_mode = false;
            self.selected.clear();
            self.notify("Admin mode disabled");
            AdminOutcome::Disabled
        }
    }

    /// Enter or leave bulk mode. Only possible in admin mode.
    pub fn toggle_bulk(&mut self) -> bool {
        if !self.admin_mode {
            return false;
        }
        self.bulk_mode = !self.bulk_mode;
        self.selected.clear();
        true
    }

    pub fn click(&mut self, id: &str) -> ClickAction {
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            return ClickAction::Ignored;
        };
        if self.bulk_mode {
            let selected = if self.selected.remove(id) {
                false
            } else {
                self.selected.insert(id.to_string());
                true
            };
            ClickAction::Toggled { selected }
        } else if self.admin_mode {
            ClickAction::ConfirmDelete(record.clone())
        } else {
            self.viewer = Some(record.clone());
            ClickAction::OpenedViewer
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn select_all(&mut self) {
        if self.bulk_mode {
            self.selected = self.records.iter().map(|r| r.id.clone()).collect();
        }
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn selected_in_display_order(&self) -> Vec<MediaRecord> {
        self.records
            .iter()
            .filter(|r| self.selected.contains(&r.id))
            .cloned()
            .collect()
    }

    /// Drop a single deleted item without reloading.
    pub fn remove_record(&mut self, id: &str) {
        self.records.retain(|r| r.id != id);
        self.selected.remove(id);
        if self.viewer.as_ref().is_some_and(|v| v.id == id) {
            self.viewer = None;
        }
    }

    pub fn finish_bulk_delete(&mut self) {
        self.bulk_mode = false;
        self.selected.clear();
    }

    pub fn open_viewer(&mut self, id: &str) -> bool {
        if self.admin_mode || self.bulk_mode {
            return false;
        }
        match self.records.iter().find(|r| r.id == id) {
            Some(record) => {
                self.viewer = Some(record.clone());
                true
            }
            None => false,
        }
    }

    pub fn close_viewer(&mut self) {
        self.viewer = None;
    }

    /// Escape closes the viewer and leaves bulk mode.
    pub fn escape(&mut self) {
        self.viewer = None;
        if self.bulk_mode {
            self.bulk_mode = false;
            self.selected.clear();
        }
    }
}
