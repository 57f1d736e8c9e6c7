//! Loaded single images, the current selection and recent history.

use crate::constants::MAX_HISTORY;
use crate::model::ImageFile;

/// Flat registry of loaded images.
///
/// The selection holds file ids; how many may be selected at once is
/// decided by the caller.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    files: Vec<ImageFile>,
    selected: Vec<String>,
    /// Most recent first, deduplicated by id, capped at [`MAX_HISTORY`]
    history: Vec<ImageFile>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn history(&self) -> &[ImageFile] {
        &self.history
    }

    /// Resolve the selected ids to files, in selection order.
    pub fn selected(&self) -> Vec<&ImageFile> {
        self.selected
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&ImageFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn add_file(&mut self, file: ImageFile) {
        self.add_to_history(file.clone());
        self.files.push(file);
    }

    pub fn add_files(&mut self, files: Vec<ImageFile>) {
        self.history.retain(|h| !files.iter().any(|f| f.id == h.id));
        let mut history = files.clone();
        history.append(&mut self.history);
        history.truncate(MAX_HISTORY);
        self.history = history;

        self.files.extend(files);
    }

    /// Remove a file and drop it from the selection.
    pub fn remove_file(&mut self, id: &str) {
        self.files.retain(|f| f.id != id);
        self.selected.retain(|s| s != id);
    }

    /// Remove all files and clear the selection. History is kept.
    pub fn clear_files(&mut self) {
        self.files.clear();
        self.selected.clear();
    }

    pub fn select_file(&mut self, id: impl Into<String>) {
        self.selected.push(id.into());
    }

    pub fn deselect_file(&mut self, id: &str) {
        self.selected.retain(|s| s != id);
    }

    pub fn set_selected_files(&mut self, ids: Vec<String>) {
        self.selected = ids;
    }

    pub fn add_to_history(&mut self, file: ImageFile) {
        self.history.retain(|h| h.id != file.id);
        self.history.insert(0, file);
        self.history.truncate(MAX_HISTORY);
    }
}
