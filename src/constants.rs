//! Global constants for the Visual Compare application

/// Byte budget of the payload cache (100 MB)
pub const IMAGE_CACHE_MAX_BYTES: usize = 100 * 1024 * 1024;

/// Decoded bytes per base64 character, used to estimate cache entry sizes
pub const BASE64_SIZE_RATIO: f64 = 0.75;

/// Smallest zoom factor any pane accepts
pub const MIN_ZOOM: f32 = 0.1;

/// Largest zoom factor any pane accepts
pub const MAX_ZOOM: f32 = 10.0;

/// Multiplier applied by a single zoom-in step
pub const ZOOM_IN_FACTOR: f32 = 1.1;

/// Multiplier applied by a single zoom-out step
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

/// Pixels panned by one wheel notch
pub const PAN_STEP: f32 = 20.0;

/// Number of scanned paths processed between cancellation checks
pub const ANALYSIS_BATCH_SIZE: usize = 1000;

/// Maximum number of entries kept in the recent-files history
pub const MAX_HISTORY: usize = 50;

/// Default edge length for generated thumbnails
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 256;
