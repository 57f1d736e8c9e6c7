//! Background thread for folder analysis.
//!
//! Runs [`match_folders`] off the owning thread and reports progress and the
//! final result over a channel. The owner polls with
//! [`AnalysisWorker::try_next_event`] and applies events to its own state, so
//! no state is shared with the worker except the cancellation token.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use vc_backend::ImageBackend;

use super::matching::{AnalysisStage, CancellationToken, FolderError, match_folders};
use crate::model::MatchedPair;

/// Message sent from the worker to its owner.
#[derive(Debug)]
pub enum AnalysisEvent {
    /// A new stage has begun
    Progress(AnalysisStage),
    /// Analysis ended; the worker exits after sending this
    Finished(Result<Vec<MatchedPair>, FolderError>),
}

/// Owns a single background analysis run.
pub struct AnalysisWorker {
    event_rx: Receiver<AnalysisEvent>,
    thread_handle: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl AnalysisWorker {
    /// Spawn a worker analyzing `folder_a` against `folder_b`.
    pub fn spawn(
        backend: Arc<dyn ImageBackend>,
        folder_a: PathBuf,
        folder_b: PathBuf,
        cancel: CancellationToken,
    ) -> Result<Self, FolderError> {
        let (event_tx, event_rx) = mpsc::channel::<AnalysisEvent>();
        let token = cancel.clone();

        let thread_handle = thread::Builder::new()
            .name("folder-analysis".to_string())
            .spawn(move || {
                log::debug!("Folder analysis thread started");
                let result = match_folders(backend.as_ref(), &folder_a, &folder_b, &token, |stage| {
                    // Owner may have gone away; the result send below reports that
                    let _ = event_tx.send(AnalysisEvent::Progress(stage));
                });
                if event_tx.send(AnalysisEvent::Finished(result)).is_err() {
                    log::debug!("Analysis owner dropped before completion");
                }
                log::debug!("Folder analysis thread exiting");
            })
            .map_err(FolderError::WorkerSpawn)?;

        Ok(Self {
            event_rx,
            thread_handle: Some(thread_handle),
            cancel,
        })
    }

    /// Take one pending event without blocking.
    pub fn try_next_event(&self) -> Option<AnalysisEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Folder analysis thread disconnected");
                None
            }
        }
    }

    /// Block until the next event arrives. `None` once the worker has exited.
    pub fn next_event(&self) -> Option<AnalysisEvent> {
        self.event_rx.recv().ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.cancel.cancel();

        // A worker blocked inside a backend scan is detached; it exits at the
        // next batch boundary and its sends fail harmlessly.
        if let Some(handle) = self.thread_handle.take() {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    log::warn!("Folder analysis thread panicked: {:?}", e);
                }
            } else {
                log::debug!("Detaching running folder analysis thread");
            }
        }
    }
}
