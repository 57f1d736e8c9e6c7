//! Tests for folder analysis and pair loading against an in-memory backend.

mod folder_matcher_tests;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use vc_backend::{BackendError, FileMetadata, ImageBackend, ImageInfo, Result};

use super::CancellationToken;
use crate::model::file_name_of;

/// In-memory [`ImageBackend`]: folders map to file lists, every file decodes
/// to a fixed size and its payload is derived from its path.
#[derive(Default)]
pub(crate) struct MockBackend {
    folders: HashMap<PathBuf, Vec<PathBuf>>,
    failing_reads: HashSet<PathBuf>,
    failing_scans: HashSet<PathBuf>,
    cancel_on_scan: Mutex<Option<(PathBuf, CancellationToken)>>,
    reads: AtomicUsize,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_folder(mut self, dir: &str, names: &[&str]) -> Self {
        let dir = PathBuf::from(dir);
        let files = names.iter().map(|n| dir.join(n)).collect();
        self.folders.insert(dir, files);
        self
    }

    pub(crate) fn with_failing_read(mut self, path: &str) -> Self {
        self.failing_reads.insert(PathBuf::from(path));
        self
    }

    pub(crate) fn with_failing_scan(mut self, dir: &str) -> Self {
        self.failing_scans.insert(PathBuf::from(dir));
        self
    }

    /// Cancel `token` when `dir` is scanned, simulating a user cancelling mid-run.
    pub(crate) fn cancel_when_scanning(mut self, dir: &str, token: CancellationToken) -> Self {
        self.cancel_on_scan = Mutex::new(Some((PathBuf::from(dir), token)));
        self
    }

    /// Number of pixel reads served so far.
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn payload_for(path: &Path) -> String {
        format!("b64:{}", path.display())
    }

    fn known(&self, path: &Path) -> bool {
        self.folders.values().flatten().any(|p| p == path)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        if !self.known(path) {
            return Err(BackendError::Message(format!("no such file: {}", path.display())));
        }
        Ok(FileMetadata {
            path: path.to_string_lossy().into_owned(),
            name: file_name_of(path),
            size: 1024,
            last_modified: 1_700_000_000_000,
            modified: 1_700_000_000_000,
            created: 1_600_000_000_000,
            accessed: 1_700_000_000_000,
            is_file: true,
            is_dir: false,
            is_symlink: false,
            readonly: false,
        })
    }
}

impl ImageBackend for MockBackend {
    fn get_file_metadata(&self, path: &Path) -> Result<FileMetadata> {
        self.metadata(path)
    }

    fn read_image_file(&self, path: &Path) -> Result<String> {
        if self.failing_reads.contains(path) {
            return Err(BackendError::Message("permission denied".to_string()));
        }
        self.metadata(path)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Self::payload_for(path))
    }

    fn get_image_info(&self, path: &Path) -> Result<ImageInfo> {
        let metadata = self.metadata(path)?;
        let format = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpeg".to_string());
        Ok(ImageInfo {
            metadata,
            width: 640,
            height: 480,
            format,
        })
    }

    fn generate_thumbnail(&self, path: &Path, _max_size: u32) -> Result<String> {
        self.read_image_file(path)
    }

    fn scan_folder_for_images(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if let Some((dir, token)) = self.cancel_on_scan.lock().unwrap().as_ref() {
            if dir == folder {
                token.cancel();
            }
        }
        if self.failing_scans.contains(folder) {
            return Err(BackendError::NotADirectory(folder.to_path_buf()));
        }
        self.folders
            .get(folder)
            .cloned()
            .ok_or_else(|| BackendError::FolderNotFound(folder.to_path_buf()))
    }
}
