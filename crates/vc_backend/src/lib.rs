//! File-system and image-decoding backend for Visual Compare.
//!
//! The viewer core never touches the disk directly. Every file listing,
//! metadata lookup and pixel read goes through the [`ImageBackend`] trait so
//! the state layer can be driven by the native implementation in production
//! and by in-memory fakes in tests.

pub mod error;
pub mod native;
pub mod types;

pub use error::{BackendError, Result};
pub use native::{IMAGE_EXTENSIONS, NativeBackend, is_image_path};
pub use types::{FileMetadata, ImageInfo};

use std::path::{Path, PathBuf};

/// Command surface consumed by the viewer core.
///
/// Implementations must be shareable across threads: folder analysis runs on
/// a worker thread and pair loading fans out one request per side.
pub trait ImageBackend: Send + Sync {
    /// Read file-system metadata for `path`.
    fn get_file_metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Read the full file contents of `path` as a base64 string.
    fn read_image_file(&self, path: &Path) -> Result<String>;

    /// Read metadata plus pixel dimensions and format for `path`.
    fn get_image_info(&self, path: &Path) -> Result<ImageInfo>;

    /// Produce a PNG thumbnail no larger than `max_size` on either side, base64 encoded.
    fn generate_thumbnail(&self, path: &Path, max_size: u32) -> Result<String>;

    /// List every image file below `folder`, recursively, sorted by path.
    fn scan_folder_for_images(&self, folder: &Path) -> Result<Vec<PathBuf>>;
}
