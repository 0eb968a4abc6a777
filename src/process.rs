//! Thinking processes — named, ordered generation strategies
//!
//! A thinking process is a plain-text resource: one step per non-empty
//! line. An optional directive header (`language:`, `framework:`,
//! `patterns:`, `output:`, `description:` on the leading lines) carries
//! selection metadata and the output format; everything after the header
//! is a step.
//!
//! ## Example resource
//!
//! ```text
//! language: typescript
//! framework: next.js
//! patterns: tailwind.layout.grid, tailwind.components.card
//!
//! Define the component structure and props
//! Add imports for framework modules
//! Apply layout and styling patterns
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Directive keys recognized in a process header. Anything else with a
/// colon is an ordinary step.
const HEADER_KEYS: [&str; 5] = ["language", "framework", "patterns", "output", "description"];

/// Selection metadata declared by a process header
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessMeta {
    /// Language this process is tuned for
    pub language: Option<String>,

    /// Framework this process is tuned for
    pub framework: Option<String>,

    /// Pattern ids this process knows how to apply
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// A parsed thinking process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThinkingProcess {
    /// Identifier, generated from the resource name
    pub id: String,

    /// Human-readable description (empty unless declared)
    #[serde(default)]
    pub description: String,

    /// Ordered generation steps
    pub steps: Vec<String>,

    /// Format-key -> expected value kind, e.g. `type: code`
    #[serde(default)]
    pub output_format: HashMap<String, String>,

    /// Selection metadata
    #[serde(default)]
    pub meta: ProcessMeta,
}

impl ThinkingProcess {
    /// Parse raw resource content into a process.
    ///
    /// Leading directive lines populate metadata; remaining non-empty
    /// lines become steps. A resource with no steps is a parse error.
    pub fn parse(id: &str, content: &str) -> Result<Self> {
        let mut description = String::new();
        let mut output_format = HashMap::new();
        let mut meta = ProcessMeta::default();
        let mut steps = Vec::new();
        let mut in_header = true;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                in_header = false;
                continue;
            }

            if in_header {
                if let Some((key, value)) = parse_directive(line) {
                    match key {
                        "language" => meta.language = Some(value.to_string()),
                        "framework" => meta.framework = Some(value.to_string()),
                        "patterns" => {
                            meta.patterns = value
                                .split(',')
                                .map(str::trim)
                                .filter(|p| !p.is_empty())
                                .map(String::from)
                                .collect();
                        }
                        "output" => {
                            output_format.insert("type".to_string(), value.to_string());
                        }
                        "description" => description = value.to_string(),
                        _ => unreachable!("parse_directive only yields header keys"),
                    }
                    continue;
                }
                in_header = false;
            }

            steps.push(line.to_string());
        }

        if steps.is_empty() {
            return Err(Error::ProcessParse {
                id: id.to_string(),
                reason: "no steps found".to_string(),
            });
        }

        output_format
            .entry("type".to_string())
            .or_insert_with(|| "text".to_string());

        Ok(Self {
            id: id.to_string(),
            description,
            steps,
            output_format,
            meta,
        })
    }

    /// The declared output kind (`text` when unspecified)
    pub fn output_kind(&self) -> &str {
        self.output_format
            .get("type")
            .map(String::as_str)
            .unwrap_or("text")
    }
}

fn parse_directive(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if HEADER_KEYS.contains(&key) {
        Some((key, value.trim()))
    } else {
        None
    }
}

/// Registry of thinking processes, load order preserved
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    entries: Vec<ThinkingProcess>,
    index: HashMap<String, usize>,
}

impl ProcessRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every resource in a directory, sorted by file name so load
    /// order is reproducible.
    ///
    /// A resource that cannot be read or parsed is logged and skipped;
    /// it never aborts the remaining loads. A missing directory yields
    /// an empty registry.
    pub fn load_all(dir: &Path) -> Self {
        let mut registry = Self::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "process directory not readable");
                return registry;
            }
        };

        let mut files: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            let id = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable process");
                    continue;
                }
            };

            match ThinkingProcess::parse(&id, &content) {
                Ok(process) => registry.register(process),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparsable process");
                }
            }
        }

        tracing::debug!(count = registry.len(), "thinking processes loaded");
        registry
    }

    /// Add a process, replacing any previous entry with the same id
    pub fn register(&mut self, process: ThinkingProcess) {
        match self.index.get(&process.id).copied() {
            Some(pos) => self.entries[pos] = process,
            None => {
                self.index.insert(process.id.clone(), self.entries.len());
                self.entries.push(process);
            }
        }
    }

    /// Look up a process by id
    pub fn get(&self, id: &str) -> Option<&ThinkingProcess> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Processes in load order
    pub fn iter(&self) -> impl Iterator<Item = &ThinkingProcess> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
