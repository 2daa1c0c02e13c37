//! Per-scheme filesystem options

use std::collections::BTreeMap;

/// Options passed along with a filesystem request, keyed by scheme then key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSystemOptions {
    values: BTreeMap<String, BTreeMap<String, String>>,
}

impl FileSystemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, scheme: &str, key: &str, value: impl Into<String>) {
        self.values
            .entry(scheme.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn get(&self, scheme: &str, key: &str) -> Option<&str> {
        self.values
            .get(scheme)
            .and_then(|options| options.get(key))
            .map(String::as_str)
    }

    pub fn remove(&mut self, scheme: &str, key: &str) -> Option<String> {
        let options = self.values.get_mut(scheme)?;
        let removed = options.remove(key);
        if options.is_empty() {
            self.values.remove(scheme);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
