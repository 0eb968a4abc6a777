//! Pattern library — reusable code idioms keyed by language
//!
//! A pattern id names a reusable idiom, e.g. `tailwind.layout.grid`.
//! The library maps a language id to an ordered list of pattern ids.
//! Insertion order within a language is significant: selection tie-breaks
//! and analysis output preserve it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Languages every library knows, even when loading fails
pub const DEFAULT_LANGUAGES: [&str; 3] = ["react", "typescript", "python"];

/// Immutable mapping language-id -> ordered pattern ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternLibrary {
    patterns: HashMap<String, Vec<String>>,
}

impl PatternLibrary {
    /// Build a library from an explicit mapping
    pub fn new(patterns: HashMap<String, Vec<String>>) -> Self {
        Self { patterns }
    }

    /// The fallback library: the known default languages, each empty
    pub fn default_library() -> Self {
        let patterns = DEFAULT_LANGUAGES
            .iter()
            .map(|lang| ((*lang).to_string(), Vec::new()))
            .collect();
        Self { patterns }
    }

    /// Load a pattern library from a JSON file, surfacing failures.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::PatternLoad(format!("{}: {}", path.display(), e)))?;
        let patterns = serde_json::from_str::<HashMap<String, Vec<String>>>(&content)
            .map_err(|e| Error::PatternLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self { patterns })
    }

    /// Load a pattern library from a JSON file.
    ///
    /// Any failure (missing file, malformed JSON, wrong shape) falls back
    /// to [`PatternLibrary::default_library`]; the error is logged, never
    /// raised.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(library) => library,
            Err(e) => {
                tracing::warn!(error = %e, "pattern library unavailable, using defaults");
                Self::default_library()
            }
        }
    }

    /// Ordered pattern ids for a language. Unknown languages yield an
    /// empty slice, not an error.
    pub fn patterns_for(&self, language: &str) -> &[String] {
        self.patterns
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Known language ids (arbitrary order)
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Total number of pattern entries across all languages
    pub fn len(&self) -> usize {
        self.patterns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::default_library()
    }
}
