//! Persisted snap settings.
//!
//! Settings are stored as a single JSON document under
//! [`SETTINGS_KEY`] in any [`KeyValueStore`]:
//!
//! ```json
//! { "version": 1, "config": { "snap_distance": 24, "snap_to_grid": true } }
//! ```
//!
//! Anything that is missing, unparseable or carries another version is
//! replaced by defaults with a warning; loading never fails.

use crate::config::{ConfigChange, SnapConfig};
use crate::traits::KeyValueStore;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

/// Store key for the snap settings document.
pub const SETTINGS_KEY: &str = "snapgrd.snap-config";

/// Schema version written by this build.
pub const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSettings {
    version: u32,
    config: SnapConfig,
}

/// A [`KeyValueStore`] that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Infallible> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Errors produced by [`FileStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// A [`KeyValueStore`] keeping one file per key in a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader sees either the old or the new value, never a torn one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(s) => Some(s),
            Err(e) => {
                debug!("no value at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }
}

/// The live [`SnapConfig`] plus the store it is persisted to.
///
/// Every mutation is clamped, then written back as a whole document.
pub struct SnapSettings<S: KeyValueStore> {
    store: S,
    config: SnapConfig,
}

impl<S: KeyValueStore> SnapSettings<S> {
    /// Load settings from `store`, falling back to defaults.
    pub fn load(store: S) -> Self {
        let config = match store.get(SETTINGS_KEY) {
            None => {
                debug!("no persisted snap settings, using defaults");
                SnapConfig::default()
            }
            Some(raw) => match serde_json::from_str::<PersistedSettings>(&raw) {
                Ok(p) if p.version == SETTINGS_VERSION => p.config.sanitized(),
                Ok(p) => {
                    warn!(
                        "snap settings version {} (expected {}), using defaults",
                        p.version, SETTINGS_VERSION
                    );
                    SnapConfig::default()
                }
                Err(e) => {
                    warn!("corrupt snap settings ({}), using defaults", e);
                    SnapConfig::default()
                }
            },
        };
        Self { store, config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply one change and persist the result.
    pub fn update(&mut self, change: ConfigChange) -> Result<&SnapConfig, SettingsError> {
        self.config.apply(change);
        self.persist()?;
        Ok(&self.config)
    }

    /// Write the current configuration to the store.
    pub fn persist(&mut self) -> Result<(), SettingsError> {
        let doc = PersistedSettings {
            version: SETTINGS_VERSION,
            config: self.config.clone(),
        };
        let json = serde_json::to_string(&doc)?;
        self.store
            .set(SETTINGS_KEY, &json)
            .map_err(|e| SettingsError::Store(e.to_string()))
    }
}

/// Errors from persisting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to store settings: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_dir() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("snapgrd-test-{}-{}", std::process::id(), id))
    }

    fn store_with(raw: &str) -> MemoryStore {
        let mut s = MemoryStore::new();
        s.set(SETTINGS_KEY, raw).unwrap();
        s
    }

    #[test]
    fn missing_settings_use_defaults() {
        let settings = SnapSettings::load(MemoryStore::new());
        assert_eq!(settings.config(), &SnapConfig::default());
    }

    #[test]
    fn corrupt_settings_use_defaults() {
        let settings = SnapSettings::load(store_with("{ not json"));
        assert_eq!(settings.config(), &SnapConfig::default());
    }

    #[test]
    fn unversioned_or_future_settings_use_defaults() {
        let settings = SnapSettings::load(store_with(r#"{ "snap_distance": 30 }"#));
        assert_eq!(settings.config(), &SnapConfig::default());

        let settings = SnapSettings::load(store_with(
            r#"{ "version": 2, "config": { "snap_distance": 30 } }"#,
        ));
        assert_eq!(settings.config(), &SnapConfig::default());
    }

    #[test]
    fn valid_settings_are_loaded_and_clamped() {
        let raw = r#"{ "version": 1, "config": { "snap_distance": 400, "snap_to_grid": true } }"#;
        let settings = SnapSettings::load(store_with(raw));
        assert_eq!(settings.config().snap_distance, 50);
        assert!(settings.config().snap_to_grid);
    }

    #[test]
    fn every_update_is_persisted() {
        let mut settings = SnapSettings::load(MemoryStore::new());
        settings.update(ConfigChange::SnapDistance(3)).unwrap();
        assert_eq!(settings.config().snap_distance, 5);

        let raw = settings.store().get(SETTINGS_KEY).expect("persisted");
        let reloaded = SnapSettings::load(store_with(&raw));
        assert_eq!(reloaded.config().snap_distance, 5);

        settings.update(ConfigChange::SnapToGrid(true)).unwrap();
        let raw = settings.store().get(SETTINGS_KEY).expect("persisted");
        assert!(raw.contains("\"snap_to_grid\":true"));
    }

    #[test]
    fn file_store_round_trips_and_survives_reload() {
        let dir = tmp_dir();
        let mut store = FileStore::new(&dir);
        assert_eq!(store.dir(), dir.as_path());
        assert!(store.get(SETTINGS_KEY).is_none());
        store.set(SETTINGS_KEY, "hello").unwrap();
        assert_eq!(store.get(SETTINGS_KEY).as_deref(), Some("hello"));

        let mut settings = SnapSettings::load(FileStore::new(&dir));
        settings.update(ConfigChange::GridSize(40)).unwrap();
        let reloaded = SnapSettings::load(FileStore::new(&dir));
        assert_eq!(reloaded.config().grid_size, 40);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_sanitizes_key_names() {
        let store = FileStore::new("/tmp/x");
        assert_eq!(
            store.path_for("a/b c"),
            PathBuf::from("/tmp/x/a_b_c.json")
        );
    }
}
