//! Folder matching: list two folders, intersect by file name, build pairs.
//!
//! [`match_folders`] is the whole protocol. It runs on whichever thread calls
//! it; [`FolderMatcher::analyze`](super::FolderMatcher::analyze) calls it
//! inline and the analysis worker calls it on a background thread.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use vc_backend::{BackendError, ImageBackend};

use crate::constants::ANALYSIS_BATCH_SIZE;
use crate::model::{MatchedPair, compare_file_names, file_name_of};

/// Errors reported by folder analysis.
#[derive(Debug, Error)]
pub enum FolderError {
    /// Analysis requested before both folders were chosen
    #[error("Please select two folders")]
    MissingFolderSelection,

    /// The cancellation token was set; not shown to the user
    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Failed to analyze folders: {0}")]
    Scan(#[from] BackendError),

    #[error("Failed to start analysis worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Shared cancellation flag, polled at batch boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), FolderError> {
        if self.is_cancelled() {
            Err(FolderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Stages of an analysis, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisStage {
    Starting,
    ScanningFolderA,
    ScanningFolderB,
    Matching,
    Sorting,
    Done,
}

impl AnalysisStage {
    /// Progress percentage reached when this stage begins.
    pub fn percent(&self) -> u8 {
        match self {
            AnalysisStage::Starting => 0,
            AnalysisStage::ScanningFolderA => 20,
            AnalysisStage::ScanningFolderB => 50,
            AnalysisStage::Matching => 70,
            AnalysisStage::Sorting => 95,
            AnalysisStage::Done => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::Starting => "Scanning folders...",
            AnalysisStage::ScanningFolderA => "Scanning folder 1...",
            AnalysisStage::ScanningFolderB => "Scanning folder 2...",
            AnalysisStage::Matching => "Finding matching files...",
            AnalysisStage::Sorting => "Sorting files...",
            AnalysisStage::Done => "",
        }
    }
}

/// Map file name to path, in batches, checking for cancellation between them.
///
/// A name seen twice (e.g. in two subfolders) keeps the later path.
fn build_name_map(
    paths: &[PathBuf],
    cancel: &CancellationToken,
) -> Result<HashMap<String, PathBuf>, FolderError> {
    let mut map = HashMap::with_capacity(paths.len());
    let mut batches = paths.chunks(ANALYSIS_BATCH_SIZE).peekable();

    while let Some(batch) = batches.next() {
        cancel.check()?;

        for path in batch {
            map.insert(file_name_of(path), path.clone());
        }

        if batches.peek().is_some() {
            std::thread::yield_now();
        }
    }

    Ok(map)
}

/// List both folders and return placeholder pairs for every shared file name,
/// sorted by name.
pub fn match_folders(
    backend: &dyn ImageBackend,
    folder_a: &Path,
    folder_b: &Path,
    cancel: &CancellationToken,
    mut on_progress: impl FnMut(AnalysisStage),
) -> Result<Vec<MatchedPair>, FolderError> {
    on_progress(AnalysisStage::Starting);

    on_progress(AnalysisStage::ScanningFolderA);
    let files_a = backend.scan_folder_for_images(folder_a)?;

    on_progress(AnalysisStage::ScanningFolderB);
    let files_b = backend.scan_folder_for_images(folder_b)?;

    on_progress(AnalysisStage::Matching);
    let map_a = build_name_map(&files_a, cancel)?;
    let map_b = build_name_map(&files_b, cancel)?;
    cancel.check()?;

    let mut pairs: Vec<MatchedPair> = map_a
        .into_iter()
        .filter_map(|(name, path_a)| {
            let path_b = map_b.get(&name)?.clone();
            Some(MatchedPair::new(name, path_a, path_b))
        })
        .collect();

    on_progress(AnalysisStage::Sorting);
    pairs.sort_by(|a, b| compare_file_names(&a.file_name, &b.file_name));

    log::debug!(
        "Matched {} of {} / {} files",
        pairs.len(),
        files_a.len(),
        files_b.len()
    );

    Ok(pairs)
}
