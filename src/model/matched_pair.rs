//! Pairs of same-named images found in two compared folders.

use std::cmp::Ordering;
use std::path::PathBuf;

use super::image_file::ImageFile;

/// Which of the two compared folders a file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn label(&self) -> &'static str {
        match self {
            Side::A => "folder 1",
            Side::B => "folder 2",
        }
    }
}

/// Two same-named images, one from each folder.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    /// File name shared by both sides; the pair's identity
    pub file_name: String,
    pub file_a: ImageFile,
    pub file_b: ImageFile,
}

impl MatchedPair {
    /// Create a pair of unloaded placeholders.
    pub fn new(file_name: impl Into<String>, path_a: PathBuf, path_b: PathBuf) -> Self {
        Self {
            file_name: file_name.into(),
            file_a: ImageFile::placeholder(path_a),
            file_b: ImageFile::placeholder(path_b),
        }
    }

    pub fn side(&self, side: Side) -> &ImageFile {
        match side {
            Side::A => &self.file_a,
            Side::B => &self.file_b,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut ImageFile {
        match side {
            Side::A => &mut self.file_a,
            Side::B => &mut self.file_b,
        }
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.file_a.is_loaded() && self.file_b.is_loaded()
    }

    /// Sides that still need their payload fetched.
    pub fn unloaded_sides(&self) -> Vec<Side> {
        Side::BOTH
            .into_iter()
            .filter(|s| !self.side(*s).is_loaded())
            .collect()
    }

    /// Files that carry a payload, in side order.
    pub fn loaded_files(&self) -> Vec<&ImageFile> {
        Side::BOTH
            .into_iter()
            .map(|s| self.side(s))
            .filter(|f| f.is_loaded())
            .collect()
    }
}

/// Locale-style file name ordering.
///
/// Names compare case-insensitively first, with punctuation and whitespace
/// before digits and digits before letters. Names differing only in case put
/// the lowercase form first.
pub fn compare_file_names(a: &str, b: &str) -> Ordering {
    let keys = |s: &str| {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(collation_key)
            .collect::<Vec<_>>()
    };
    keys(a).cmp(&keys(b)).then_with(|| b.cmp(a))
}

fn collation_key(c: char) -> (u8, char) {
    let class = if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    };
    (class, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_file_names_ignores_case_first() {
        let mut names = vec!["b.png", "C.png", "a.png", "B.png"];
        names.sort_by(|a, b| compare_file_names(a, b));
        assert_eq!(names, vec!["a.png", "b.png", "B.png", "C.png"]);
    }

    #[test]
    fn test_punctuation_sorts_before_digits_and_letters() {
        let mut names = vec!["ab.png", "a1.png", "a_1.png"];
        names.sort_by(|a, b| compare_file_names(a, b));
        assert_eq!(names, vec!["a_1.png", "a1.png", "ab.png"]);
        assert_eq!(compare_file_names("a.png", "a1.png"), Ordering::Less);
    }

    #[test]
    fn test_new_pair_is_unloaded() {
        let pair = MatchedPair::new(
            "x.png",
            PathBuf::from("/left/x.png"),
            PathBuf::from("/right/x.png"),
        );
        assert_eq!(pair.unloaded_sides(), vec![Side::A, Side::B]);
        assert!(pair.loaded_files().is_empty());
        assert!(!pair.is_fully_loaded());
        assert_eq!(pair.side(Side::B).path, PathBuf::from("/right/x.png"));
    }
}
