use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// Key under which the bearer token is kept
pub const TOKEN_KEY: &str = "token";

/// Key/value store the view reads its bearer credential from
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process-local key/value storage, optionally seeded from a JSON object file
#[derive(Debug, Default)]
pub struct LocalStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from a JSON object of string values, e.g. `{"token": "..."}`
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&raw)?;
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.into());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

impl CredentialStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = LocalStorage::new();
        assert_eq!(storage.get(TOKEN_KEY), None);

        storage.set(TOKEN_KEY, "abc");
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("abc"));

        storage.remove(TOKEN_KEY);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"token":"from-disk"}"#).unwrap();

        let storage = LocalStorage::from_file(&path).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("from-disk"));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(LocalStorage::from_file(&path).is_err());
    }
}
