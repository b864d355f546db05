//! Loading and saving the preset store.
//!
//! A repository moves whole [`PresetStore`] snapshots. The JSON file backend
//! writes to a temporary sibling and renames it over the target, so a crash
//! mid-save leaves the previous file intact.

use std::sync::Mutex;
#[cfg(feature = "serde")]
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use tracing::debug;

use crate::filter::error::PresetError;
use crate::filter::preset::PresetId;

use super::{PresetStore, STORE_VERSION};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown preset: {0}")]
    UnknownPreset(PresetId),

    #[error("unsupported store version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Repository trait
// ---------------------------------------------------------------------------

/// Persistence backend for the preset store.
pub trait PresetRepository: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PresetStore>, StoreError>;

    fn save(&self, store: &PresetStore) -> Result<(), StoreError>;
}

fn check_version(store: &PresetStore) -> Result<(), StoreError> {
    if store.version > STORE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: store.version,
            supported: STORE_VERSION,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Pretty-printed JSON in a single file.
#[cfg(feature = "serde")]
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

#[cfg(feature = "serde")]
impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl PresetRepository for JsonFileRepository {
    fn load(&self) -> Result<Option<PresetStore>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let store: PresetStore = serde_json::from_slice(&bytes)?;
        check_version(&store)?;
        debug!(path = %self.path.display(), presets = store.len(), "read preset store");
        Ok(Some(store))
    }

    fn save(&self, store: &PresetStore) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(store)?;
        bytes.push(b'\n');
        self.write_atomic(&bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "wrote preset store");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps the last saved snapshot in memory. Saves can be made to fail, to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    saved: Mutex<Option<PresetStore>>,
    fail_saves: Mutex<bool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: PresetStore) -> Self {
        Self {
            saved: Mutex::new(Some(store)),
            fail_saves: Mutex::new(false),
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// The last successfully saved snapshot.
    pub fn saved(&self) -> Option<PresetStore> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PresetRepository for MemoryRepository {
    fn load(&self) -> Result<Option<PresetStore>, StoreError> {
        let saved = self.saved();
        if let Some(store) = &saved {
            check_version(store)?;
        }
        Ok(saved)
    }

    fn save(&self, store: &PresetStore) -> Result<(), StoreError> {
        if *self.fail_saves.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::Unavailable("saves disabled".into()));
        }
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(store.clone());
        Ok(())
    }
}
