//! Native file-system backend.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, ImageReader};

use crate::error::{BackendError, Result};
use crate::types::{FileMetadata, ImageInfo};
use crate::ImageBackend;

/// Extensions accepted by folder scans (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif", "bmp", "gif"];

/// Check if a path has a supported image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn epoch_millis(time: std::io::Result<SystemTime>) -> u64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Backend that reads directly from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Recursively collect image files below `dir`.
    /// Unreadable subdirectories are skipped with a warning.
    fn scan_directory_recursive(dir: &Path, images: &mut Vec<PathBuf>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|source| BackendError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();

            if path.is_dir() {
                if let Err(e) = Self::scan_directory_recursive(&path, images) {
                    log::warn!("Skipping unreadable subdirectory {:?}: {}", path, e);
                }
            } else if path.is_file() && is_image_path(&path) {
                images.push(path);
            }
        }

        Ok(())
    }
}

impl ImageBackend for NativeBackend {
    fn get_file_metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::metadata(path).map_err(|source| BackendError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        let is_symlink = fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let modified = epoch_millis(metadata.modified());

        Ok(FileMetadata {
            path: path.to_string_lossy().into_owned(),
            name,
            size: metadata.len(),
            last_modified: modified,
            modified,
            created: epoch_millis(metadata.created()),
            accessed: epoch_millis(metadata.accessed()),
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
            is_symlink,
            readonly: metadata.permissions().readonly(),
        })
    }

    fn read_image_file(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|source| BackendError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Read {:?} ({} bytes)", path, bytes.len());
        Ok(general_purpose::STANDARD.encode(&bytes))
    }

    fn get_image_info(&self, path: &Path) -> Result<ImageInfo> {
        let metadata = self.get_file_metadata(path)?;

        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| BackendError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let format = reader.format().map(format_name).unwrap_or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_else(|| "unknown".to_string())
        });

        let (width, height) = reader
            .into_dimensions()
            .map_err(|source| BackendError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(ImageInfo {
            metadata,
            width,
            height,
            format,
        })
    }

    fn generate_thumbnail(&self, path: &Path, max_size: u32) -> Result<String> {
        let img = image::open(path).map_err(|source| BackendError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let max_size = max_size.max(1);
        let thumb = if img.width() > max_size || img.height() > max_size {
            img.thumbnail(max_size, max_size)
        } else {
            img
        };

        let mut buf = Cursor::new(Vec::new());
        thumb
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|source| BackendError::Encode {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!(
            "Generated {}x{} thumbnail for {:?}",
            thumb.width(),
            thumb.height(),
            path
        );
        Ok(general_purpose::STANDARD.encode(buf.into_inner()))
    }

    fn scan_folder_for_images(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if !folder.exists() {
            return Err(BackendError::FolderNotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(BackendError::NotADirectory(folder.to_path_buf()));
        }

        let mut images = Vec::new();
        Self::scan_directory_recursive(folder, &mut images)?;
        images.sort();

        log::info!("Scanned folder {:?}: found {} images", folder, images.len());
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbImage::new(width, height).save(path).unwrap();
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("a.png")));
        assert!(is_image_path(Path::new("dir/B.JPG")));
        assert!(is_image_path(Path::new("photo.avif")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("png")));
        assert!(!is_image_path(Path::new("")));
    }

    #[test]
    fn test_scan_folder_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        write_png(&dir.path().join("b.png"), 2, 2);
        write_png(&dir.path().join("a.png"), 2, 2);
        write_png(&nested.join("c.png"), 2, 2);
        fs::write(dir.path().join("readme.txt"), "not an image").unwrap();

        let images = NativeBackend::new()
            .scan_folder_for_images(dir.path())
            .unwrap();

        assert_eq!(
            images,
            vec![
                dir.path().join("a.png"),
                dir.path().join("b.png"),
                nested.join("c.png"),
            ]
        );
    }

    #[test]
    fn test_scan_missing_folder() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = NativeBackend::new()
            .scan_folder_for_images(&missing)
            .unwrap_err();
        assert!(matches!(err, BackendError::FolderNotFound(_)));
    }

    #[test]
    fn test_scan_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.png");
        write_png(&file, 1, 1);
        let err = NativeBackend::new().scan_folder_for_images(&file).unwrap_err();
        assert!(matches!(err, BackendError::NotADirectory(_)));
    }

    #[test]
    fn test_file_metadata() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("data.png");
        fs::write(&file, b"twelve bytes").unwrap();

        let meta = NativeBackend::new().get_file_metadata(&file).unwrap();
        assert_eq!(meta.name, "data.png");
        assert_eq!(meta.size, 12);
        assert!(meta.is_file);
        assert!(!meta.is_dir);
        assert!(meta.modified > 0);
        assert_eq!(meta.last_modified, meta.modified);
    }

    #[test]
    fn test_file_metadata_nonexistent() {
        let err = NativeBackend::new()
            .get_file_metadata(Path::new("nonexistent/file.png"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Metadata { .. }));
    }

    #[test]
    fn test_image_info_reads_dimensions() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("wide.png");
        write_png(&file, 7, 3);

        let info = NativeBackend::new().get_image_info(&file).unwrap();
        assert_eq!((info.width, info.height), (7, 3));
        assert_eq!(info.format, "png");
        assert_eq!(info.metadata.name, "wide.png");
    }

    #[test]
    fn test_image_info_rejects_garbage() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("fake.png");
        fs::write(&file, b"fake image data").unwrap();

        let err = NativeBackend::new().get_image_info(&file).unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }));
    }

    #[test]
    fn test_read_image_file_is_base64_of_contents() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("raw.png");
        fs::write(&file, b"test data").unwrap();

        let encoded = NativeBackend::new().read_image_file(&file).unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"test data");
    }

    #[test]
    fn test_thumbnail_is_bounded() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("big.png");
        write_png(&file, 64, 32);

        let encoded = NativeBackend::new().generate_thumbnail(&file, 16).unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (16, 8));
    }

    #[test]
    fn test_thumbnail_does_not_upscale() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("small.png");
        write_png(&file, 4, 4);

        let encoded = NativeBackend::new().generate_thumbnail(&file, 256).unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (4, 4));
    }

    #[test]
    fn test_image_info_serializes_flat() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("s.png");
        write_png(&file, 2, 5);

        let info = NativeBackend::new().get_image_info(&file).unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["width"], 2);
        assert_eq!(json["name"], "s.png");
        assert!(json.get("lastModified").is_some());
    }
}
