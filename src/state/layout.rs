//! Layout selection and the persisted app-level preferences.

use serde::{Deserialize, Serialize};

use crate::config::{CONFIG_VERSION, Namespaced, Theme};

/// How the two images are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    #[default]
    SideBySide,
    TopBottom,
}

impl LayoutKind {
    pub fn toggled(self) -> Self {
        match self {
            LayoutKind::SideBySide => LayoutKind::TopBottom,
            LayoutKind::TopBottom => LayoutKind::SideBySide,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::SideBySide => "side-by-side",
            LayoutKind::TopBottom => "top-bottom",
        }
    }
}

/// Two separate panes, or one pane with a swipe divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Split,
    Swipe,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Split => ViewMode::Swipe,
            ViewMode::Swipe => ViewMode::Split,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Split => "split",
            ViewMode::Swipe => "swipe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMode {
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    /// Unset behaves as [`ViewMode::Split`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
}

impl LayoutMode {
    pub fn new(kind: LayoutKind, view_mode: Option<ViewMode>) -> Self {
        Self { kind, view_mode }
    }

    pub fn effective_view_mode(&self) -> ViewMode {
        self.view_mode.unwrap_or_default()
    }
}

/// App-level preferences that survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPreferences {
    pub version: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub sync_zoom: bool,
    #[serde(default = "default_true")]
    pub sync_pan: bool,
    #[serde(default)]
    pub default_layout: LayoutMode,
}

fn default_true() -> bool {
    true
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            theme: Theme::default(),
            sync_zoom: true,
            sync_pan: true,
            default_layout: LayoutMode::default(),
        }
    }
}

impl Namespaced for AppPreferences {
    const NAMESPACE: &'static str = "vcs-app-store";

    fn version(&self) -> u32 {
        self.version
    }
}

/// Session-wide display state: preferences plus the live layout and loading flag.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    preferences: AppPreferences,
    current_layout: LayoutMode,
    is_loading: bool,
    loading_message: Option<String>,
    is_folder_mode: bool,
}

impl AppState {
    /// Start from saved preferences; the live layout begins at the saved default.
    pub fn new(preferences: AppPreferences) -> Self {
        Self {
            current_layout: preferences.default_layout,
            preferences,
            ..Self::default()
        }
    }

    pub fn preferences(&self) -> &AppPreferences {
        &self.preferences
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.preferences.theme = theme;
    }

    pub fn set_sync_zoom(&mut self, enabled: bool) {
        self.preferences.sync_zoom = enabled;
    }

    pub fn set_sync_pan(&mut self, enabled: bool) {
        self.preferences.sync_pan = enabled;
    }

    pub fn current_layout(&self) -> LayoutMode {
        self.current_layout
    }

    pub fn set_layout(&mut self, layout: LayoutMode) {
        self.current_layout = layout;
    }

    /// Side-by-side and top-bottom swap; the view mode is kept as is.
    pub fn toggle_layout(&mut self) {
        self.current_layout.kind = self.current_layout.kind.toggled();
        log::debug!("Layout: {}", self.current_layout.kind.name());
    }

    pub fn toggle_view_mode(&mut self) {
        let next = self.current_layout.effective_view_mode().toggled();
        self.current_layout.view_mode = Some(next);
        log::debug!("View mode: {}", next.name());
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn loading_message(&self) -> Option<&str> {
        self.loading_message.as_deref()
    }

    pub fn set_loading(&mut self, loading: bool, message: Option<String>) {
        self.is_loading = loading;
        self.loading_message = message;
    }

    pub fn is_folder_mode(&self) -> bool {
        self.is_folder_mode
    }

    pub fn set_folder_mode(&mut self, folder_mode: bool) {
        self.is_folder_mode = folder_mode;
    }
}
