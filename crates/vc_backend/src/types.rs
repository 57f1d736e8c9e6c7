use serde::{Deserialize, Serialize};

/// File-system metadata for a single path.
///
/// Timestamps are milliseconds since the UNIX epoch; a platform that cannot
/// report one yields `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub last_modified: u64,
    pub modified: u64,
    pub created: u64,
    pub accessed: u64,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub readonly: bool,
}

/// File metadata extended with decoded image properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(flatten)]
    pub metadata: FileMetadata,
    pub width: u32,
    pub height: u32,
    /// Lowercase format name, e.g. `png` or `jpeg`
    pub format: String,
}
