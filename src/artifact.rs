//! Code artifacts and persistence
//!
//! A [`CodeArtifact`] is an opaque text payload with a declared language
//! tag. Persistence writes the payload bytes exactly (reading the file
//! back yields byte-identical content) and keeps a YAML sidecar with a
//! content hash so unchanged artifacts are not rewritten.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// An opaque generated payload plus its language tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeArtifact {
    /// Declared language id, e.g. `typescript`
    pub language: String,

    /// Text payload
    pub content: String,
}

impl CodeArtifact {
    pub fn new(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// SHA-256 of the payload, hex-encoded
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Sidecar metadata stored next to a written artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// SHA-256 of the artifact payload
    pub content_hash: String,

    /// Declared language of the artifact
    pub language: String,

    /// When the artifact was written
    pub generated_at: DateTime<Utc>,

    /// Ghostwriter version that wrote it
    pub tool_version: String,
}

impl ArtifactMeta {
    fn for_artifact(artifact: &CodeArtifact) -> Self {
        Self {
            content_hash: artifact.content_hash(),
            language: artifact.language.clone(),
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Sidecar path for an artifact path
    pub fn path_for(artifact_path: &Path) -> PathBuf {
        let mut name = artifact_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(".meta.yaml");
        artifact_path.with_file_name(name)
    }

    /// Load the sidecar for an artifact path, if present
    pub fn load(artifact_path: &Path) -> Result<Option<Self>> {
        let meta_path = Self::path_for(artifact_path);
        if !meta_path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&meta_path).map_err(Error::Io)?;
        let meta = serde_norway::from_str(&content)
            .map_err(|e| Error::Other(format!("Failed to parse {}: {}", meta_path.display(), e)))?;
        Ok(Some(meta))
    }

    fn save(&self, artifact_path: &Path) -> Result<()> {
        let yaml = serde_norway::to_string(self)?;
        std::fs::write(Self::path_for(artifact_path), yaml).map_err(Error::Io)
    }
}

/// Write an artifact to `path`, creating intermediate directories.
///
/// Returns `false` when the sidecar shows the on-disk content already
/// matches and nothing was written. The payload file always contains
/// exactly the artifact bytes; provenance lives only in the sidecar.
pub fn write_artifact(artifact: &CodeArtifact, path: &Path) -> Result<bool> {
    if path.exists() {
        if let Ok(Some(meta)) = ArtifactMeta::load(path) {
            if meta.content_hash == artifact.content_hash() {
                tracing::debug!(path = %path.display(), "artifact unchanged, skipping write");
                return Ok(false);
            }
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
    }

    std::fs::write(path, artifact.content.as_bytes()).map_err(Error::Io)?;
    ArtifactMeta::for_artifact(artifact).save(path)?;

    tracing::debug!(path = %path.display(), bytes = artifact.content.len(), "artifact written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("feature.tsx");
        let artifact = CodeArtifact::new("typescript", "export const x = 1;\n// trailing\n");

        assert!(write_artifact(&artifact, &path).unwrap());

        let read_back = std::fs::read(&path).unwrap();
        assert_eq!(read_back, artifact.content.as_bytes());
    }

    #[test]
    fn test_unchanged_artifact_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature.tsx");
        let artifact = CodeArtifact::new("typescript", "const a = 1;\n");

        assert!(write_artifact(&artifact, &path).unwrap());
        assert!(!write_artifact(&artifact, &path).unwrap());
    }

    #[test]
    fn test_changed_artifact_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature.tsx");

        let first = CodeArtifact::new("typescript", "const a = 1;\n");
        let second = CodeArtifact::new("typescript", "const a = 2;\n");

        assert!(write_artifact(&first, &path).unwrap());
        assert!(write_artifact(&second, &path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            second.content
        );
    }

    #[test]
    fn test_sidecar_hash_matches_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature.py");
        let artifact = CodeArtifact::new("python", "def f():\n    return 1\n");

        write_artifact(&artifact, &path).unwrap();

        let meta = ArtifactMeta::load(&path).unwrap().unwrap();
        assert_eq!(meta.content_hash, artifact.content_hash());
        assert_eq!(meta.language, "python");
    }
}
