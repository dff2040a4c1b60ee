//! Preferences persistence
//!
//! Preferences live in a versioned JSON envelope under the platform data
//! directory, or under a caller-supplied root.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use takeoff_core::Preferences;

const PREFS_SCHEMA_VERSION: u32 = 1;
const PREFS_FILE_NAME: &str = "preferences.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("unsupported preferences schema version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreferencesEnvelope {
    version: u32,
    preferences: Preferences,
}

impl Storage {
    pub fn from_default_project() -> StorageResult<Self> {
        let dirs =
            ProjectDirs::from("dev", "Takeoff", "Takeoff").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.root.join(PREFS_FILE_NAME)
    }

    /// Load preferences, falling back to defaults when none were saved
    pub fn load_preferences(&self) -> StorageResult<Preferences> {
        let path = self.preferences_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no saved preferences, using defaults");
            return Ok(Preferences::default());
        }

        let bytes = fs::read(&path)?;
        let envelope: PreferencesEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > PREFS_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion { found: envelope.version });
        }

        tracing::debug!(path = %path.display(), version = envelope.version, "preferences loaded");
        Ok(envelope.preferences)
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;

        let envelope =
            PreferencesEnvelope { version: PREFS_SCHEMA_VERSION, preferences: preferences.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        let path = self.preferences_path();
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "preferences saved");
        Ok(())
    }
}
