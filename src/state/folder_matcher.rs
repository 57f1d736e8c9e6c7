//! Folder-mode state: two folder selections, their matched pairs and navigation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vc_backend::ImageBackend;
use web_time::Instant;

use super::analysis_worker::{AnalysisEvent, AnalysisWorker};
use super::matching::{AnalysisStage, CancellationToken, FolderError, match_folders};
use crate::model::MatchedPair;

/// Informational message shown when the folders share no file names.
pub const NO_MATCHES_NOTICE: &str = "No matching files found";

/// How a completed analysis ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Pairs were found; holds the count
    Matched(usize),
    /// Both folders were scanned but share no file names
    NoMatches,
    /// The user cancelled; state is back to idle and no message is shown
    Cancelled,
}

/// State of a two-folder comparison.
#[derive(Default)]
pub struct FolderMatcher {
    folder_a: Option<PathBuf>,
    folder_b: Option<PathBuf>,
    matches: Vec<MatchedPair>,
    current_index: usize,
    is_analyzed: bool,
    is_loading: bool,
    /// 0-100, never decreases during a run
    progress: u8,
    loading_message: String,
    error: Option<String>,
    notice: Option<String>,
    cancel: Option<CancellationToken>,
    worker: Option<AnalysisWorker>,
}

impl FolderMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder_a(&self) -> Option<&Path> {
        self.folder_a.as_deref()
    }

    pub fn folder_b(&self) -> Option<&Path> {
        self.folder_b.as_deref()
    }

    pub fn set_folder_a(&mut self, path: impl Into<PathBuf>) {
        self.folder_a = Some(path.into());
        self.reset_matches();
    }

    pub fn set_folder_b(&mut self, path: impl Into<PathBuf>) {
        self.folder_b = Some(path.into());
        self.reset_matches();
    }

    /// Drop the current result. An active run is stopped so its pairs are never published.
    fn reset_matches(&mut self) {
        if self.cancel.is_some() || self.worker.is_some() {
            log::debug!("Stopping running folder analysis");
            self.cancel();
        }
        self.matches.clear();
        self.current_index = 0;
        self.is_analyzed = false;
    }

    fn reset_loading(&mut self) {
        self.is_loading = false;
        self.progress = 0;
        self.loading_message.clear();
        self.cancel = None;
    }

    fn apply_progress(&mut self, stage: AnalysisStage) {
        self.progress = self.progress.max(stage.percent());
        self.loading_message = stage.label().to_string();
    }

    /// Validate the selection and enter the loading state.
    fn begin(&mut self, cancel: CancellationToken) -> Result<(PathBuf, PathBuf), FolderError> {
        let (Some(a), Some(b)) = (self.folder_a.clone(), self.folder_b.clone()) else {
            let err = FolderError::MissingFolderSelection;
            self.error = Some(err.to_string());
            return Err(err);
        };

        self.reset_matches();
        self.is_loading = true;
        self.error = None;
        self.notice = None;
        self.progress = 0;
        self.cancel = Some(cancel);
        log::info!("Analyzing {:?} against {:?}", a, b);

        Ok((a, b))
    }

    /// Apply the result of a run and leave the loading state.
    fn finish(
        &mut self,
        result: Result<Vec<MatchedPair>, FolderError>,
    ) -> Result<AnalysisOutcome, FolderError> {
        match result {
            Ok(pairs) => {
                let count = pairs.len();
                self.matches = pairs;
                self.current_index = 0;
                self.is_analyzed = true;
                self.is_loading = false;
                self.cancel = None;
                self.apply_progress(AnalysisStage::Done);

                if count == 0 {
                    log::info!("Folder analysis found no matching files");
                    self.notice = Some(NO_MATCHES_NOTICE.to_string());
                    Ok(AnalysisOutcome::NoMatches)
                } else {
                    log::info!("Folder analysis found {} matching files", count);
                    Ok(AnalysisOutcome::Matched(count))
                }
            }
            Err(FolderError::Cancelled) => {
                log::info!("Folder analysis cancelled");
                self.reset_loading();
                Ok(AnalysisOutcome::Cancelled)
            }
            Err(e) => {
                log::error!("{}", e);
                self.reset_loading();
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run the analysis on the calling thread.
    pub fn analyze(&mut self, backend: &dyn ImageBackend) -> Result<AnalysisOutcome, FolderError> {
        self.analyze_with(backend, CancellationToken::new())
    }

    /// Run the analysis on the calling thread with a caller-owned cancellation token.
    pub fn analyze_with(
        &mut self,
        backend: &dyn ImageBackend,
        cancel: CancellationToken,
    ) -> Result<AnalysisOutcome, FolderError> {
        let (a, b) = self.begin(cancel.clone())?;
        let started = Instant::now();

        let result = match_folders(backend, &a, &b, &cancel, |stage| self.apply_progress(stage));

        log::debug!("Folder analysis took {:?}", started.elapsed());
        self.finish(result)
    }

    /// Start the analysis on a background thread. Drive it with [`Self::poll_analysis`].
    pub fn start_analysis(&mut self, backend: Arc<dyn ImageBackend>) -> Result<(), FolderError> {
        self.worker = None;

        let cancel = CancellationToken::new();
        let (a, b) = self.begin(cancel.clone())?;

        match AnalysisWorker::spawn(backend, a, b, cancel) {
            Ok(worker) => {
                self.worker = Some(worker);
                Ok(())
            }
            Err(e) => {
                log::error!("{}", e);
                self.reset_loading();
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_analysis_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Apply pending worker events without blocking.
    ///
    /// Returns the outcome once the background run has finished, `None` while
    /// it is still running or when no run is active.
    pub fn poll_analysis(&mut self) -> Option<Result<AnalysisOutcome, FolderError>> {
        loop {
            let event = self.worker.as_ref()?.try_next_event()?;
            if let Some(outcome) = self.handle_event(event) {
                return Some(outcome);
            }
        }
    }

    /// Block until the background run finishes.
    pub fn wait_for_analysis(&mut self) -> Option<Result<AnalysisOutcome, FolderError>> {
        loop {
            let next = self.worker.as_ref()?.next_event();
            let Some(event) = next else {
                log::warn!("Folder analysis thread exited without a result");
                self.worker = None;
                self.reset_loading();
                return Some(Ok(AnalysisOutcome::Cancelled));
            };
            if let Some(outcome) = self.handle_event(event) {
                return Some(outcome);
            }
        }
    }

    fn handle_event(
        &mut self,
        event: AnalysisEvent,
    ) -> Option<Result<AnalysisOutcome, FolderError>> {
        match event {
            AnalysisEvent::Progress(stage) => {
                self.apply_progress(stage);
                None
            }
            AnalysisEvent::Finished(result) => {
                self.worker = None;
                Some(self.finish(result))
            }
        }
    }

    /// Request cancellation and return to the idle state immediately.
    ///
    /// A backend call already in flight still completes; its result is discarded.
    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        if let Some(worker) = self.worker.take() {
            worker.cancel();
        }
        self.reset_loading();
    }

    /// Forget both folders and every analysis result.
    pub fn clear_folders(&mut self) {
        self.folder_a = None;
        self.folder_b = None;
        self.reset_matches();
        self.error = None;
        self.notice = None;
    }

    /// Drop the analysis result but keep the folder selection.
    pub fn reset_analysis(&mut self) {
        self.reset_matches();
        self.error = None;
        self.notice = None;
    }

    pub fn matches(&self) -> &[MatchedPair] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_match(&self) -> Option<&MatchedPair> {
        self.matches.get(self.current_index)
    }

    pub fn find_match(&self, file_name: &str) -> Option<&MatchedPair> {
        self.matches.iter().find(|m| m.file_name == file_name)
    }

    pub fn find_match_mut(&mut self, file_name: &str) -> Option<&mut MatchedPair> {
        self.matches.iter_mut().find(|m| m.file_name == file_name)
    }

    /// Move to the next pair; stays on the last one.
    pub fn next(&mut self) {
        self.go_to(self.current_index as isize + 1);
    }

    /// Move to the previous pair; stays on the first one.
    pub fn previous(&mut self) {
        self.go_to(self.current_index as isize - 1);
    }

    /// Jump to `index`, clamped to the valid range.
    pub fn go_to(&mut self, index: isize) {
        let last = self.matches.len().saturating_sub(1) as isize;
        self.current_index = index.clamp(0, last) as usize;
    }

    /// Position string like "3 / 15".
    pub fn progress_label(&self) -> String {
        if self.matches.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current_index + 1, self.matches.len())
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.is_analyzed
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn loading_message(&self) -> &str {
        &self.loading_message
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Record a user-facing error raised outside analysis (e.g. pair loading).
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
