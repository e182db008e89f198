use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use imagegen_core::KeyValueStore;
use imagegen_engine::AtomicFileWriter;
use imagegen_logging::{imagegen_error, imagegen_info, imagegen_warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    entries: BTreeMap<String, String>,
}

/// Flat string store kept in a RON file. Every `set` rewrites the file; read
/// or write failures are logged and otherwise ignored.
#[derive(Debug)]
pub(crate) struct RonFileStore {
    path: PathBuf,
    state: PersistedState,
}

impl RonFileStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_state(&path);
        Self { path, state }
    }

    fn save(&self) {
        let Some(filename) = self.path.file_name().and_then(|name| name.to_str()) else {
            imagegen_error!("State file path {:?} has no usable file name", self.path);
            return;
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&self.state, pretty) {
            Ok(text) => text,
            Err(err) => {
                imagegen_error!("Failed to serialize persisted state: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(dir);
        if let Err(err) = writer.replace(filename, content.as_bytes()) {
            imagegen_error!("Failed to write persisted state to {:?}: {}", self.path, err);
        }
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.state.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.state
            .entries
            .insert(key.to_string(), value.to_string());
        self.save();
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.state
                .entries
                .insert((*key).to_string(), (*value).to_string());
        }
        self.save();
    }
}

fn load_state(path: &Path) -> PersistedState {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PersistedState::default();
        }
        Err(err) => {
            imagegen_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return PersistedState::default();
        }
    };

    match ron::from_str(&content) {
        Ok(state) => {
            imagegen_info!("Loaded persisted form state from {:?}", path);
            state
        }
        Err(err) => {
            imagegen_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            PersistedState::default()
        }
    }
}
