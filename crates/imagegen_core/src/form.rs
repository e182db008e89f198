use std::collections::HashMap;

pub const PROMPT_KEY: &str = "ai-image-last-prompt";
pub const ASPECT_KEY: &str = "ai-image-aspect";

/// Flat string store holding the last-used form values.
///
/// Implementations are best-effort: a failing backend logs and carries on, so
/// neither method reports errors.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);

    /// Writes several keys as one update. Stores that persist on every `set`
    /// override this so related keys land together.
    fn set_many(&mut self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }
}

/// Form values read back at startup. Unset fields leave the form defaults alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedFormState {
    pub prompt: Option<String>,
    pub aspect: Option<String>,
}

pub fn persist_form(store: &mut dyn KeyValueStore, prompt: &str, aspect: &str) {
    store.set_many(&[(PROMPT_KEY, prompt), (ASPECT_KEY, aspect)]);
}

/// Empty stored values are treated like missing keys.
pub fn restore_form(store: &dyn KeyValueStore) -> PersistedFormState {
    let read = |key: &str| store.get(key).filter(|value| !value.is_empty());
    PersistedFormState {
        prompt: read(PROMPT_KEY),
        aspect: read(ASPECT_KEY),
    }
}
