//! On-demand loading of matched pairs.
//!
//! Pairs are created as placeholders by folder analysis. When a pair is
//! navigated to, each side still lacking a payload has its image info and
//! pixel data fetched; both sides load concurrently, and so do the two
//! requests of each side. Pixel reads go through the shared payload cache so
//! revisiting a pair costs nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use vc_backend::{BackendError, ImageBackend, ImageInfo};
use web_time::Instant;

use super::folder_matcher::FolderMatcher;
use crate::image_cache::SharedImageCache;
use crate::model::{Payload, Side};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load image data: {0}")]
    Backend(#[from] BackendError),

    #[error("Failed to load image data: loader thread panicked")]
    Panicked,
}

/// What happened to each side of a pair during one load.
#[derive(Debug, Default)]
pub struct PairLoadReport {
    pub file_name: String,
    /// Sides whose payload was fetched by this load
    pub loaded: Vec<Side>,
    /// Sides that failed; the other side is still committed
    pub failures: Vec<(Side, LoadError)>,
}

impl PairLoadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetches pair data from the backend, through the payload cache.
#[derive(Clone)]
pub struct PairLoader {
    backend: Arc<dyn ImageBackend>,
    cache: SharedImageCache,
}

impl PairLoader {
    pub fn new(backend: Arc<dyn ImageBackend>, cache: SharedImageCache) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &SharedImageCache {
        &self.cache
    }

    /// Fetch info and payload for one file, concurrently.
    fn fetch(&self, path: &Path) -> Result<(ImageInfo, Payload), LoadError> {
        thread::scope(|s| -> Result<(ImageInfo, Payload), LoadError> {
            let data = s.spawn(|| {
                self.cache
                    .get_or_load(path, || self.backend.read_image_file(path))
            });
            let info = self.backend.get_image_info(path);
            let data = data.join().map_err(|_| LoadError::Panicked)?;
            Ok((info?, data?))
        })
    }

    /// Load every unloaded side of the pair named `file_name` into `matcher`.
    ///
    /// Returns `None` when no such pair exists. Failures are logged and the
    /// first one is recorded as the matcher's error message; a clean load
    /// clears any message left by an earlier pair.
    pub fn load_pair(&self, matcher: &mut FolderMatcher, file_name: &str) -> Option<PairLoadReport> {
        let pair = matcher.find_match(file_name)?;
        let requests: Vec<(Side, PathBuf)> = pair
            .unloaded_sides()
            .into_iter()
            .map(|side| (side, pair.side(side).path.clone()))
            .collect();

        let mut report = PairLoadReport {
            file_name: file_name.to_string(),
            ..Default::default()
        };
        if requests.is_empty() {
            log::debug!("Pair {} already loaded", file_name);
            matcher.clear_error();
            return Some(report);
        }

        let started = Instant::now();
        let results: Vec<(Side, Result<(ImageInfo, Payload), LoadError>)> = thread::scope(|s| {
            let handles: Vec<_> = requests
                .iter()
                .map(|(side, path)| (*side, s.spawn(move || self.fetch(path))))
                .collect();
            handles
                .into_iter()
                .map(|(side, handle)| {
                    (side, handle.join().unwrap_or_else(|_| Err(LoadError::Panicked)))
                })
                .collect()
        });

        let pair = matcher.find_match_mut(file_name)?;
        for (side, result) in results {
            match result {
                Ok((info, data)) => {
                    pair.side_mut(side).apply_loaded(&info, data);
                    report.loaded.push(side);
                }
                Err(e) => {
                    log::error!("Failed to load {} from {}: {}", file_name, side.label(), e);
                    report.failures.push((side, e));
                }
            }
        }

        match report.failures.first() {
            Some((_, e)) => matcher.set_error(e.to_string()),
            None => matcher.clear_error(),
        }

        log::debug!(
            "Loaded pair {} ({} sides) in {:?}",
            file_name,
            report.loaded.len(),
            started.elapsed()
        );
        Some(report)
    }
}
