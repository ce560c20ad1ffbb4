//! Persistence for trained profit models.
//!
//! A model is stored as a single JSON document holding the schema descriptor
//! and the serialized forest. Saves are write-then-rename, last writer wins.

use crate::domain::errors::ArtifactError;
use crate::domain::ml::ModelArtifact;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_MODEL_PATH: &str = "models/arbitrage_model.json";

/// Handles persistence of the model artifact at a fixed path.
#[derive(Debug, Clone)]
pub struct ModelStore {
    file_path: PathBuf,
}

impl ModelStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.is_file()
    }

    /// Saves the artifact, creating parent directories and replacing any previous model.
    pub fn save(&self, artifact: &ModelArtifact) -> Result<(), ArtifactError> {
        let bytes = artifact.to_json()?;

        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Atomic write: write to a unique temp file next to the target, then rename
        let temp_path = self.temp_path();
        fs::write(&temp_path, &bytes).map_err(|source| ArtifactError::Io {
            path: temp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&temp_path, &self.file_path) {
            fs::remove_file(&temp_path).ok();
            return Err(ArtifactError::Io {
                path: self.file_path.clone(),
                source,
            });
        }

        info!(
            "Saved model ({} bytes, schema {}) to {:?}",
            bytes.len(),
            artifact.schema(),
            self.file_path
        );
        Ok(())
    }

    /// Loads the artifact. `NotFound` when no file exists, `Corrupt` when it cannot be decoded.
    pub fn load(&self) -> Result<ModelArtifact, ArtifactError> {
        let bytes = match fs::read(&self.file_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound {
                    path: self.file_path.clone(),
                });
            }
            Err(source) => {
                return Err(ArtifactError::Io {
                    path: self.file_path.clone(),
                    source,
                });
            }
        };

        let artifact = ModelArtifact::from_json(&bytes, &self.file_path)?;
        info!(
            "Loaded model trained at {} from {:?}",
            artifact.trained_at(),
            self.file_path
        );
        Ok(artifact)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        self.file_path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}
