//! Visual Compare - side-by-side image comparison
//!
//! Compares two images, or two folders of same-named images, with
//! synchronized zoom and pan across the viewing panes. File access goes
//! through the [`vc_backend`] crate; this crate holds the application state.

pub mod config;
pub mod constants;
pub mod image_cache;
pub mod model;
pub mod session;
pub mod state;

pub use session::{CompareSession, SessionError};
pub use vc_backend::{ImageBackend, NativeBackend};
