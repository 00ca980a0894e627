//! Path segmentation
//!
//! Paths are plain text joined by one reserved separator. Drive and provider
//! prefixes are stripped by the caller before anything here sees the text.

use crate::config::{PathConfig, DEFAULT_SEPARATOR};

/// Splits and joins textual paths. Knows nothing about the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathTool {
    separator: char,
}

impl Default for PathTool {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl PathTool {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn from_config(config: &PathConfig) -> Self {
        Self::new(config.separator)
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Splits a path into its non-empty segments, left to right.
    ///
    /// An absent path yields no segments rather than an error; callers treat
    /// that the same as the resolution root. Leading, trailing and repeated
    /// separators collapse.
    ///
    /// ```
    /// use arbor_core::PathTool;
    ///
    /// let paths = PathTool::default();
    /// assert!(paths.split(None).is_empty());
    /// assert_eq!(paths.split(Some("a")), vec!["a"]);
    /// assert_eq!(paths.split(Some("a\\b")), vec!["a", "b"]);
    /// ```
    pub fn split(&self, path: Option<&str>) -> Vec<String> {
        match path {
            Some(text) => self.split_str(text),
            None => Vec::new(),
        }
    }

    pub fn split_str(&self, path: &str) -> Vec<String> {
        path.split(self.separator)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let mut out = String::new();
        for (idx, segment) in segments.iter().enumerate() {
            if idx > 0 {
                out.push(self.separator);
            }
            out.push_str(segment.as_ref());
        }
        out
    }

    /// A usable item name: non-empty and free of the separator.
    pub fn is_valid_name(&self, name: &str) -> bool {
        !name.is_empty() && !name.contains(self.separator)
    }
}

/// Splits segments into the parent prefix and the final name.
pub fn split_last<S: AsRef<str>>(segments: &[S]) -> Option<(&[S], &str)> {
    segments
        .split_last()
        .map(|(last, parent)| (parent, last.as_ref()))
}
