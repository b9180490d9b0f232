//! Settings registration facility
//!
//! Modules register their configuration flags here under their own
//! namespace. Persisted client values load from a TOML file before
//! registration; a registered setting keeps the persisted value when one
//! exists, otherwise its default. Settings whose definition asks for a
//! reload are applied by flagging a full reload, never by live
//! reconfiguration.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Error loading persisted client settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("Parse error in '{path:?}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
}

/// What the host does when a setting changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingChange {
    #[default]
    Nothing,
    /// Force a full client reload
    RequireReload,
}

/// Definition supplied at registration time
#[derive(Debug, Clone)]
pub struct SettingDefinition {
    /// Display name in the config UI
    pub name: String,
    /// Help text shown below the control
    pub hint: String,
    /// Whether the setting appears in the config UI
    pub config: bool,
    pub default: bool,
    pub on_change: SettingChange,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct PersistedNamespace(HashMap<String, bool>);

#[derive(Default)]
struct StoreState {
    definitions: HashMap<String, SettingDefinition>,
    values: HashMap<String, bool>,
    persisted: HashMap<String, bool>,
    reload_requested: bool,
}

/// Boolean settings store keyed `namespace.key`
#[derive(Default)]
pub struct SettingsStore {
    state: RwLock<StoreState>,
}

fn qualified(namespace: &str, key: &str) -> String {
    format!("{}.{}", namespace, key)
}

impl SettingsStore {
    pub fn new() -> Self {
        SettingsStore::default()
    }

    /// Load persisted client values from a TOML file shaped as
    /// `[namespace]` tables of `key = bool` entries. Unknown keys are kept
    /// and applied if a module later registers them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: path.to_path_buf(),
        })?;
        let namespaces: HashMap<String, PersistedNamespace> =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                error: e,
                path: path.to_path_buf(),
            })?;

        let store = SettingsStore::new();
        {
            let mut state = store.state.write().unwrap_or_else(|e| e.into_inner());
            for (namespace, keys) in namespaces {
                for (key, value) in keys.0 {
                    state.persisted.insert(qualified(&namespace, &key), value);
                }
            }
        }
        Ok(store)
    }

    /// Register a setting; a persisted value takes precedence over the
    /// definition default.
    pub fn register(&self, namespace: &str, key: &str, definition: SettingDefinition) {
        let id = qualified(namespace, key);
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let initial = state.persisted.get(&id).copied().unwrap_or(definition.default);
        state.values.insert(id.clone(), initial);
        state.definitions.insert(id, definition);
    }

    pub fn is_registered(&self, namespace: &str, key: &str) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.definitions.contains_key(&qualified(namespace, key))
    }

    /// Current value; unregistered settings read as `false`
    pub fn get_bool(&self, namespace: &str, key: &str) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .values
            .get(&qualified(namespace, key))
            .copied()
            .unwrap_or(false)
    }

    /// Change a value, honoring the definition's on-change behavior
    pub fn set_bool(&self, namespace: &str, key: &str, value: bool) {
        let id = qualified(namespace, key);
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let changed = state.values.get(&id) != Some(&value);
        state.values.insert(id.clone(), value);
        if changed {
            if let Some(definition) = state.definitions.get(&id) {
                if definition.on_change == SettingChange::RequireReload {
                    state.reload_requested = true;
                }
            }
        }
    }

    /// Whether a change has requested a full reload since the last take
    pub fn take_reload_request(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut state.reload_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn definition(default: bool, on_change: SettingChange) -> SettingDefinition {
        SettingDefinition {
            name: "PC Mode".to_string(),
            hint: "Only player characters.".to_string(),
            config: true,
            default,
            on_change,
        }
    }

    #[test]
    fn test_register_and_get() {
        let store = SettingsStore::new();
        store.register("negative-hp", "pc_mode", definition(false, SettingChange::Nothing));
        assert!(store.is_registered("negative-hp", "pc_mode"));
        assert!(!store.get_bool("negative-hp", "pc_mode"));
    }

    #[test]
    fn test_unregistered_reads_false() {
        let store = SettingsStore::new();
        assert!(!store.get_bool("negative-hp", "missing"));
    }

    #[test]
    fn test_reload_requested_on_change() {
        let store = SettingsStore::new();
        store.register(
            "negative-hp",
            "pc_mode",
            definition(false, SettingChange::RequireReload),
        );

        // Writing the current value is not a change
        store.set_bool("negative-hp", "pc_mode", false);
        assert!(!store.take_reload_request());

        store.set_bool("negative-hp", "pc_mode", true);
        assert!(store.take_reload_request());
        // Taken flag resets
        assert!(!store.take_reload_request());
    }

    #[test]
    fn test_persisted_value_wins_over_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client-settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"[negative-hp]\npc_mode = true\n").unwrap();

        let store = SettingsStore::load(&path).unwrap();
        store.register("negative-hp", "pc_mode", definition(false, SettingChange::RequireReload));
        assert!(store.get_bool("negative-hp", "pc_mode"));
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client-settings.toml");
        std::fs::write(&path, "not valid toml [").unwrap();
        assert!(matches!(
            SettingsStore::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
