//! Persisted settings for visual-compare.
//!
//! Every persisted document is a versioned JSON file named after its
//! namespace and kept in the platform config directory. [`AppSettings`] holds
//! the user settings (namespace `app-settings`); the layout preferences live in
//! [`crate::state::AppPreferences`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::state::{LayoutKind, ViewMode};

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

const APP_DIR_NAME: &str = "visual-compare";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

/// Line style of the divider between compared images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Comparison mode the app starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Two individually chosen files
    #[default]
    File,
    /// Same-named files from two folders
    Folder,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageDisplaySettings {
    pub default_mode: ImageMode,
    pub default_layout: LayoutKind,
    pub default_view_mode: ViewMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareSettings {
    /// CSS-style hex color
    pub boundary_color: String,
    /// Pixels, never negative
    pub boundary_width: f32,
    pub boundary_style: BorderStyle,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            boundary_color: "#666666".to_string(),
            boundary_width: 1.0,
            boundary_style: BorderStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationSettings {
    /// Action name to accelerator string, e.g. `zoom-in` → `Ctrl+Plus`
    pub shortcuts: BTreeMap<String, String>,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            shortcuts: default_shortcuts(),
        }
    }
}

fn default_shortcuts() -> BTreeMap<String, String> {
    [
        ("zoom-in", "Ctrl+Plus"),
        ("zoom-out", "Ctrl+Minus"),
        ("reset-view", "Ctrl+0"),
        ("open-files", "Ctrl+O"),
        ("open-folder1", "Ctrl+Shift+1"),
        ("open-folder2", "Ctrl+Shift+2"),
        ("toggle-mode", "Ctrl+M"),
        ("toggle-layout", "Ctrl+L"),
        ("toggle-view", "Ctrl+T"),
    ]
    .into_iter()
    .map(|(action, keys)| (action.to_string(), keys.to_string()))
    .collect()
}

/// Partial update of [`GeneralSettings`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct GeneralUpdate {
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayUpdate {
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageDisplayUpdate {
    pub default_mode: Option<ImageMode>,
    pub default_layout: Option<LayoutKind>,
    pub default_view_mode: Option<ViewMode>,
}

#[derive(Debug, Clone, Default)]
pub struct CompareUpdate {
    pub boundary_color: Option<String>,
    pub boundary_width: Option<f32>,
    pub boundary_style: Option<BorderStyle>,
}

#[derive(Debug, Clone, Default)]
pub struct OperationUpdate {
    /// Replaces the whole table
    pub shortcuts: Option<BTreeMap<String, String>>,
}

/// User settings, persisted under the `app-settings` namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Version of the configuration file format
    pub version: u32,
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub image_display: ImageDisplaySettings,
    #[serde(default)]
    pub compare: CompareSettings,
    #[serde(default)]
    pub operation: OperationSettings,
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            general: GeneralSettings::default(),
            display: DisplaySettings::default(),
            image_display: ImageDisplaySettings::default(),
            compare: CompareSettings::default(),
            operation: OperationSettings::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Namespaced for AppSettings {
    const NAMESPACE: &'static str = "app-settings";

    fn version(&self) -> u32 {
        self.version
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_boundary_width(self.compare.boundary_width)
    }
}

fn validate_boundary_width(width: f32) -> Result<(), ConfigError> {
    if width.is_finite() && width >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "boundary width must be a non-negative number, got {}",
            width
        )))
    }
}

impl AppSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_general(&mut self, update: GeneralUpdate) {
        if let Some(language) = update.language {
            if language != self.general.language {
                log::info!("Language changed to {:?}", language);
            }
            self.general.language = language;
        }
    }

    pub fn update_display(&mut self, update: DisplayUpdate) {
        if let Some(theme) = update.theme {
            self.display.theme = theme;
        }
    }

    pub fn update_image_display(&mut self, update: ImageDisplayUpdate) {
        let section = &mut self.image_display;
        if let Some(mode) = update.default_mode {
            section.default_mode = mode;
        }
        if let Some(layout) = update.default_layout {
            section.default_layout = layout;
        }
        if let Some(view_mode) = update.default_view_mode {
            section.default_view_mode = view_mode;
        }
    }

    /// Apply a compare update. A negative boundary width rejects the whole update.
    pub fn update_compare(&mut self, update: CompareUpdate) -> Result<(), ConfigError> {
        if let Some(width) = update.boundary_width {
            validate_boundary_width(width)?;
        }

        let section = &mut self.compare;
        if let Some(color) = update.boundary_color {
            section.boundary_color = color;
        }
        if let Some(width) = update.boundary_width {
            section.boundary_width = width;
        }
        if let Some(style) = update.boundary_style {
            section.boundary_style = style;
        }
        Ok(())
    }

    pub fn update_operation(&mut self, update: OperationUpdate) {
        if let Some(shortcuts) = update.shortcuts {
            self.operation.shortcuts = shortcuts;
        }
    }

    pub fn shortcut(&self, action: &str) -> Option<&str> {
        self.operation.shortcuts.get(action).map(String::as_str)
    }

    /// Restore every section to its default. The log level is kept.
    pub fn reset_all(&mut self) {
        let log_level = self.log_level;
        *self = Self {
            log_level,
            ..Self::default()
        };
        log::info!("Settings reset to defaults");
    }
}

/// A document persisted as `<namespace>.json`.
pub trait Namespaced: Serialize + DeserializeOwned + Default {
    const NAMESPACE: &'static str;

    /// Format version stored in the document.
    fn version(&self) -> u32;

    /// Reject values that parse but are out of range.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn from_json(json: &str) -> Result<Self, ConfigError> {
        let doc: Self = serde_json::from_str(json)?;

        if doc.version() > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: doc.version(),
                supported_version: CONFIG_VERSION,
            });
        }
        doc.validate()?;

        Ok(doc)
    }
}

/// Directory holding one JSON file per namespace.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform config directory, falling back to `~/.config`.
    pub fn default_location() -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(Self::new(config_dir.join(APP_DIR_NAME)))
        } else {
            dirs::home_dir().map(|home| Self::new(home.join(".config").join(APP_DIR_NAME)))
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for<T: Namespaced>(&self) -> PathBuf {
        self.dir.join(format!("{}.json", T::NAMESPACE))
    }

    /// Read a document. `Ok(None)` when it has never been saved.
    pub fn load<T: Namespaced>(&self) -> Result<Option<T>, ConfigError> {
        let path = self.path_for::<T>();
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path)?;
        let doc = T::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(Some(doc))
    }

    /// Read a document, using the default for a missing or unreadable file.
    pub fn load_or_default<T: Namespaced>(&self) -> T {
        match self.load::<T>() {
            Ok(Some(doc)) => doc,
            Ok(None) => T::default(),
            Err(e) => {
                log::warn!(
                    "Failed to load {} from {:?}: {}",
                    T::NAMESPACE,
                    self.path_for::<T>(),
                    e
                );
                T::default()
            }
        }
    }

    pub fn save<T: Namespaced>(&self, doc: &T) -> Result<(), ConfigError> {
        doc.validate()?;
        let path = self.path_for::<T>();

        // Create parent directories if needed
        std::fs::create_dir_all(&self.dir)?;

        let json = doc.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid setting: {0}")]
    InvalidValue(String),
}
