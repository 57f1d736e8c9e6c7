//! Data models for the Visual Compare application.

mod image_file;
mod matched_pair;

pub use image_file::{ImageFile, Payload, file_name_of, mime_type_for};
pub use matched_pair::{MatchedPair, Side, compare_file_names};
