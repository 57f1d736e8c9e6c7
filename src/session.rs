//! The application root.
//!
//! [`CompareSession`] owns every state container for one run of the app and
//! wires them together: folder analysis feeds navigation, navigation triggers
//! lazy pair loading, and a loaded pair becomes the registry's selection.
//! It is built once at startup and consumed by [`CompareSession::shutdown`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use vc_backend::{BackendError, ImageBackend};
use web_time::Instant;

use crate::config::{AppSettings, ConfigError, ConfigStore, ImageMode};
use crate::image_cache::{CacheStats, SharedImageCache, cache_key};
use crate::model::{ImageFile, Payload};
use crate::state::{
    AnalysisOutcome, AppPreferences, AppState, FileRegistry, FolderError, FolderMatcher,
    LayoutMode, PairLoadReport, PairLoader, SyncFlags, ViewerSync,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Folder(#[from] FolderError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct CompareSession {
    backend: Arc<dyn ImageBackend>,
    loader: PairLoader,
    /// `None` keeps everything in memory
    config: Option<ConfigStore>,
    settings: AppSettings,
    app: AppState,
    viewer: ViewerSync,
    files: FileRegistry,
    folders: FolderMatcher,
    /// Settings and preferences as last loaded or saved
    persisted: (AppSettings, AppPreferences),
}

impl CompareSession {
    /// Build a session, restoring persisted settings and preferences from `config`.
    pub fn new(backend: Arc<dyn ImageBackend>, config: Option<ConfigStore>) -> Self {
        let (settings, preferences) = match &config {
            Some(store) => (
                store.load_or_default::<AppSettings>(),
                store.load_or_default::<AppPreferences>(),
            ),
            None => (AppSettings::default(), AppPreferences::default()),
        };

        let viewer = ViewerSync::new(SyncFlags {
            zoom: preferences.sync_zoom,
            pan: preferences.sync_pan,
            ..SyncFlags::default()
        });
        let loader = PairLoader::new(Arc::clone(&backend), SharedImageCache::default());

        let persisted = (settings.clone(), preferences.clone());
        let mut session = Self {
            backend,
            loader,
            config,
            settings,
            persisted,
            app: AppState::new(preferences),
            viewer,
            files: FileRegistry::new(),
            folders: FolderMatcher::new(),
        };
        session.apply_display_defaults();
        session
    }

    /// Start mode and layout come from the image display settings.
    fn apply_display_defaults(&mut self) {
        let defaults = &self.settings.image_display;
        self.app
            .set_folder_mode(defaults.default_mode == ImageMode::Folder);
        self.app.set_layout(LayoutMode::new(
            defaults.default_layout,
            Some(defaults.default_view_mode),
        ));
    }

    pub fn backend(&self) -> &Arc<dyn ImageBackend> {
        &self.backend
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut AppState {
        &mut self.app
    }

    pub fn viewer(&self) -> &ViewerSync {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ViewerSync {
        &mut self.viewer
    }

    pub fn files(&self) -> &FileRegistry {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileRegistry {
        &mut self.files
    }

    pub fn folders(&self) -> &FolderMatcher {
        &self.folders
    }

    /// Where settings are persisted; `None` when running without a config store.
    pub fn config_store(&self) -> Option<&ConfigStore> {
        self.config.as_ref()
    }

    /// Whether settings or preferences differ from what was last loaded or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.persisted.0 != self.settings || &self.persisted.1 != self.app.preferences()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.loader.cache().stats()
    }

    /// Load individual files into the registry. Either every file loads or none is added.
    pub fn open_files(&mut self, paths: &[PathBuf]) -> Result<Vec<String>, SessionError> {
        let count = paths.len();
        self.app.set_loading(
            true,
            Some(format!(
                "Loading {} file{}...",
                count,
                if count == 1 { "" } else { "s" }
            )),
        );

        let result = paths
            .iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>, _>>();
        self.app.set_loading(false, None);

        let files = result.inspect_err(|e| log::error!("Failed to open files: {}", e))?;
        let ids = files.iter().map(|f| f.id.clone()).collect();
        self.files.add_files(files);
        log::info!("Loaded {} files", count);
        Ok(ids)
    }

    fn load_file(&self, path: &Path) -> Result<ImageFile, SessionError> {
        let metadata = self.backend.get_file_metadata(path)?;
        let data = self
            .loader
            .cache()
            .get_or_load(path, || self.backend.read_image_file(path))?;
        let info = self.backend.get_image_info(path)?;

        let mut file = ImageFile::from_metadata(path.to_path_buf(), &metadata, data);
        file.width = info.width;
        file.height = info.height;
        Ok(file)
    }

    /// Thumbnail payload for `path`, cached under a size-qualified key.
    pub fn thumbnail(&self, path: &Path, max_size: u32) -> Result<Payload, SessionError> {
        let key = cache_key(path, Some(max_size));
        let cache = self.loader.cache();
        if let Some(cached) = cache.get(&key) {
            return Ok(cached);
        }

        let data: Payload = Arc::from(self.backend.generate_thumbnail(path, max_size)?);
        cache.set(key, Arc::clone(&data));
        Ok(data)
    }

    /// Select both folders. A background analysis of the old selection is stopped.
    pub fn set_folders(&mut self, folder_a: impl Into<PathBuf>, folder_b: impl Into<PathBuf>) {
        let was_running = self.folders.is_analysis_running();
        self.folders.set_folder_a(folder_a);
        self.folders.set_folder_b(folder_b);
        if was_running {
            self.app.set_loading(false, None);
        }
    }

    /// Analyze the selected folders on this thread and load the first pair.
    pub fn analyze_folders(&mut self) -> Result<AnalysisOutcome, SessionError> {
        self.app.set_folder_mode(true);
        self.app
            .set_loading(true, Some("Analyzing folders...".to_string()));
        let result = self.folders.analyze(self.backend.as_ref());
        self.app.set_loading(false, None);

        let outcome = result?;
        self.after_analysis(outcome);
        Ok(outcome)
    }

    /// Start analysis on a background thread; drive it with [`Self::poll_analysis`].
    pub fn start_analysis(&mut self) -> Result<(), SessionError> {
        self.app.set_folder_mode(true);
        self.folders.start_analysis(Arc::clone(&self.backend))?;
        self.app
            .set_loading(true, Some("Analyzing folders...".to_string()));
        Ok(())
    }

    /// Apply pending analysis progress. Returns the outcome once the run ends.
    pub fn poll_analysis(&mut self) -> Option<Result<AnalysisOutcome, SessionError>> {
        let result = self.folders.poll_analysis()?;
        Some(self.finish_background(result))
    }

    /// Block until the background analysis ends.
    pub fn wait_for_analysis(&mut self) -> Option<Result<AnalysisOutcome, SessionError>> {
        let result = self.folders.wait_for_analysis()?;
        Some(self.finish_background(result))
    }

    fn finish_background(
        &mut self,
        result: Result<AnalysisOutcome, FolderError>,
    ) -> Result<AnalysisOutcome, SessionError> {
        self.app.set_loading(false, None);
        let outcome = result?;
        self.after_analysis(outcome);
        Ok(outcome)
    }

    fn after_analysis(&mut self, outcome: AnalysisOutcome) {
        if let AnalysisOutcome::Matched(_) = outcome {
            self.load_current_pair();
        }
    }

    pub fn cancel_analysis(&mut self) {
        self.folders.cancel();
        self.app.set_loading(false, None);
    }

    pub fn next_pair(&mut self) -> Option<PairLoadReport> {
        self.folders.next();
        self.load_current_pair()
    }

    pub fn previous_pair(&mut self) -> Option<PairLoadReport> {
        self.folders.previous();
        self.load_current_pair()
    }

    pub fn go_to_pair(&mut self, index: isize) -> Option<PairLoadReport> {
        self.folders.go_to(index);
        self.load_current_pair()
    }

    /// Load whichever pair is current now and make its loaded sides the selection.
    pub fn load_current_pair(&mut self) -> Option<PairLoadReport> {
        let file_name = self.folders.current_match()?.file_name.clone();
        let started = Instant::now();
        let report = self.loader.load_pair(&mut self.folders, &file_name)?;

        let loaded: Vec<ImageFile> = self
            .folders
            .find_match(&file_name)?
            .loaded_files()
            .into_iter()
            .cloned()
            .collect();

        self.files.clear_files();
        if loaded.is_empty() {
            log::warn!("No image data loaded for {}", file_name);
        } else {
            let ids = loaded.iter().map(|f| f.id.clone()).collect();
            self.files.add_files(loaded);
            self.files.set_selected_files(ids);
        }

        log::debug!(
            "Displayed {} ({}) in {:?}",
            file_name,
            self.folders.progress_label(),
            started.elapsed()
        );
        Some(report)
    }

    pub fn set_sync_zoom(&mut self, enabled: bool) {
        self.viewer.set_sync_zoom(enabled);
        self.app.set_sync_zoom(enabled);
    }

    pub fn set_sync_pan(&mut self, enabled: bool) {
        self.viewer.set_sync_pan(enabled);
        self.app.set_sync_pan(enabled);
    }

    /// Restore default settings and reapply the display defaults.
    pub fn reset_settings(&mut self) {
        self.settings.reset_all();
        self.apply_display_defaults();
    }

    /// Write settings and preferences to the config store, if there is one.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let Some(store) = &self.config else {
            log::debug!("No config store; settings stay in memory");
            return Ok(());
        };
        store.save(&self.settings)?;
        store.save(self.app.preferences())?;
        self.persisted = (self.settings.clone(), self.app.preferences().clone());
        Ok(())
    }

    /// Stop background work, persist changed state and release cached payloads.
    pub fn shutdown(mut self) {
        self.folders.cancel();
        if self.has_unsaved_changes() {
            if let Err(e) = self.save() {
                log::warn!("Failed to save settings on shutdown: {}", e);
            }
        }
        self.loader.cache().clear();
        log::info!("Session closed");
    }
}
