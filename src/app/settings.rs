// ListingDesk - app/settings.rs
//
// Persisted view settings: current page, rows per page, and per-action
// "don't ask again" flags.
//
// The store never touches storage directly. It is handed a
// `SettingsBackend` with load/save, so the same code runs against a JSON
// file, an in-memory map, or any key-value store a host provides.
//
// File backend:
// - Saved atomically (write temp, rename) so a crash during save never
//   corrupts the previous good file.
// - Load problems are never fatal: missing, malformed, or
//   version-mismatched files just mean defaults.

use crate::util::constants::SETTINGS_FILE_NAME;
use crate::util::error::SettingsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Version stamp for forward-compatibility checks.
///
/// Bump whenever `PersistedSettings` changes in a breaking way. Version
/// mismatches silently discard the stored settings.
pub const SETTINGS_VERSION: u32 = 1;

/// Actions that ask for confirmation unless the user opted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    BulkDelete,
    RemoveInvalidRows,
    ReplaceOnImport,
    BulkEdit,
}

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    /// Schema version, must equal `SETTINGS_VERSION` to be accepted.
    pub version: u32,

    #[serde(default = "default_page")]
    pub current_page: usize,

    /// `None` until the user picks a size; the viewport default applies.
    #[serde(default)]
    pub rows_per_page: Option<usize>,

    /// Actions whose confirmation prompt is skipped.
    #[serde(default)]
    pub skip_confirm: BTreeMap<ConfirmAction, bool>,

    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_page() -> usize {
    1
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            current_page: 1,
            rows_per_page: None,
            skip_confirm: BTreeMap::new(),
            saved_at: None,
        }
    }
}

impl PersistedSettings {
    pub fn skips_confirm(&self, action: ConfirmAction) -> bool {
        self.skip_confirm.get(&action).copied().unwrap_or(false)
    }
}

/// Injected load/save for persisted settings.
pub trait SettingsBackend {
    /// `None` means "nothing usable stored"; callers fall back to defaults.
    fn load(&self) -> Option<PersistedSettings>;

    fn save(&self, settings: &PersistedSettings) -> Result<(), SettingsError>;
}

// =============================================================================
// JSON file backend
// =============================================================================

/// Settings stored as pretty JSON in one file.
#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/settings.json`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for JsonFileSettings {
    fn load(&self) -> Option<PersistedSettings> {
        let path = &self.path;
        let content = std::fs::read_to_string(path)
            .map_err(|e| {
                // "Not found" is the normal first run.
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "Cannot read settings file");
                }
            })
            .ok()?;

        let data: PersistedSettings = serde_json::from_str(&content)
            .map_err(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings file is malformed, using defaults"
                );
            })
            .ok()?;

        if data.version != SETTINGS_VERSION {
            tracing::warn!(
                found = data.version,
                expected = SETTINGS_VERSION,
                "Settings file version mismatch, using defaults"
            );
            return None;
        }

        tracing::debug!(path = %path.display(), "Settings loaded");
        Some(data)
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), SettingsError> {
        let path = &self.path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut stamped = settings.clone();
        stamped.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&stamped)
            .map_err(|e| SettingsError::Serialise { source: e })?;

        // Write a sibling temp file then rename over the real one.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(|e| SettingsError::Io {
            path: tmp.clone(),
            source: e,
        })?;

        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            SettingsError::Io {
                path: path.clone(),
                source: e,
            }
        })?;

        tracing::debug!(path = %path.display(), "Settings saved");
        Ok(())
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Settings held in memory. Clones share the same slot, so a test can keep
/// a handle and inspect what the store saved.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    slot: Rc<RefCell<Option<PersistedSettings>>>,
}

impl MemorySettings {
    pub fn with(settings: PersistedSettings) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(settings))),
        }
    }

    /// Last saved value.
    pub fn current(&self) -> Option<PersistedSettings> {
        self.slot.borrow().clone()
    }
}

impl SettingsBackend for MemorySettings {
    fn load(&self) -> Option<PersistedSettings> {
        self.current()
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), SettingsError> {
        *self.slot.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> PersistedSettings {
        let mut s = PersistedSettings {
            current_page: 3,
            rows_per_page: Some(100),
            ..Default::default()
        };
        s.skip_confirm.insert(ConfirmAction::BulkDelete, true);
        s
    }

    #[test]
    fn test_file_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileSettings::in_data_dir(dir.path());
        backend.save(&sample()).expect("save should succeed");

        let loaded = backend.load().expect("load should return Some after save");
        assert_eq!(loaded.current_page, 3);
        assert_eq!(loaded.rows_per_page, Some(100));
        assert!(loaded.skips_confirm(ConfirmAction::BulkDelete));
        assert!(!loaded.skips_confirm(ConfirmAction::BulkEdit));
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(JsonFileSettings::new(dir.path().join("nope.json")).load().is_none());
    }

    #[test]
    fn test_load_malformed_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(JsonFileSettings::new(&path).load().is_none());
    }

    #[test]
    fn test_load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileSettings::in_data_dir(dir.path());
        let mut data = sample();
        data.version = 99;
        backend.save(&data).unwrap();
        assert!(backend.load().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories_and_ignores_stale_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let backend = JsonFileSettings::new(&path);
        backend.save(&sample()).unwrap();

        std::fs::write(path.with_extension("json.tmp"), b"garbage").unwrap();
        let mut updated = sample();
        updated.current_page = 7;
        backend.save(&updated).unwrap();
        assert_eq!(backend.load().unwrap().current_page, 7);
    }

    #[test]
    fn test_memory_backend_shares_slot_between_clones() {
        let backend = MemorySettings::default();
        let handle = backend.clone();
        assert!(handle.current().is_none());
        backend.save(&sample()).unwrap();
        assert_eq!(handle.current().unwrap().current_page, 3);
    }
}
