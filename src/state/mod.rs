//! Application state containers.

mod analysis_worker;
mod file_registry;
mod folder_matcher;
mod layout;
mod matching;
mod pair_loader;
mod viewer;

#[cfg(test)]
pub(crate) mod tests;

pub use analysis_worker::{AnalysisEvent, AnalysisWorker};
pub use file_registry::FileRegistry;
pub use folder_matcher::{AnalysisOutcome, FolderMatcher, NO_MATCHES_NOTICE};
pub use layout::{AppPreferences, AppState, LayoutKind, LayoutMode, ViewMode};
pub use matching::{AnalysisStage, CancellationToken, FolderError, match_folders};
pub use pair_loader::{LoadError, PairLoadReport, PairLoader};
pub use viewer::{
    Pane, SyncFlags, ViewerState, ViewerSync, ViewerUpdate, WheelInput, apply_update, clamp_zoom,
};
