//! Image file records shared by the file registry and the folder matcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;
use vc_backend::{FileMetadata, ImageInfo};

/// Base64 pixel payload, shared between the cache and file records.
pub type Payload = Arc<str>;

/// Last path component as a display name. Both `/` and `\` separate components.
pub fn file_name_of(path: &Path) -> String {
    let path = path.to_string_lossy();
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// MIME-ish type string derived from the file extension, e.g. `image/png`.
/// Files without an extension are assumed to be JPEG.
pub fn mime_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "jpeg".to_string());
    format!("image/{}", ext)
}

/// A single image known to the viewer.
///
/// `image_data` is present exactly when the file has been fully loaded;
/// `size`, `width`, `height` and `last_modified` are zero placeholders until then.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// Content path for folder matches, a generated id for ad-hoc loads
    pub id: String,
    pub path: PathBuf,
    /// Display name (file name without directories)
    pub name: String,
    /// Size on disk in bytes
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    /// Milliseconds since the UNIX epoch
    pub last_modified: u64,
    pub image_data: Option<Payload>,
}

impl ImageFile {
    /// Create an unloaded record whose identity is its path.
    pub fn placeholder(path: PathBuf) -> Self {
        Self {
            id: path.to_string_lossy().into_owned(),
            name: file_name_of(&path),
            mime_type: mime_type_for(&path),
            path,
            size: 0,
            width: 0,
            height: 0,
            last_modified: 0,
            image_data: None,
        }
    }

    /// Create a loaded record for a file opened directly (not through a folder match).
    pub fn from_metadata(path: PathBuf, metadata: &FileMetadata, data: Payload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: file_name_of(&path),
            mime_type: mime_type_for(&path),
            path,
            size: metadata.size,
            width: 0,
            height: 0,
            last_modified: metadata.modified,
            image_data: Some(data),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image_data.is_some()
    }

    /// Replace placeholder metadata with real values and attach the payload.
    pub fn apply_loaded(&mut self, info: &ImageInfo, data: Payload) {
        self.size = info.metadata.size;
        self.width = info.width;
        self.height = info.height;
        self.last_modified = info.metadata.last_modified;
        self.mime_type = format!("image/{}", info.format);
        self.image_data = Some(data);
    }
}
