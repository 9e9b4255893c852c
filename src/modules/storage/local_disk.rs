use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::shared::validation::safe_extension;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of writing one upload to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Location recorded in `files.path`
    pub path: String,
    pub size: i64,
}

/// Stores uploaded binaries under a root directory, one sub-directory per client
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.upload_dir.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root_exists(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Io {
                path: self.root.display().to_string(),
                source,
            })
    }

    /// Build the on-disk location for a new upload: `<root>/<client_id>/<uuid>[.<ext>]`
    pub fn generate_path(&self, client_id: i64, original_filename: &str) -> PathBuf {
        let file_name = match safe_extension(original_filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        self.root.join(client_id.to_string()).join(file_name)
    }

    /// Write `data` for `client_id`, returning the stored path and size
    pub async fn store(
        &self,
        client_id: i64,
        original_filename: &str,
        data: &[u8],
    ) -> Result<StoredObject, StorageError> {
        let path = self.generate_path(client_id, original_filename);

        // A concurrent `remove` may prune the client directory between the two
        // calls, so the write is retried once after recreating it.
        let mut attempts = 0;
        loop {
            attempts += 1;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StorageError::Io {
                        path: parent.display().to_string(),
                        source,
                    })?;
            }

            match fs::write(&path, data).await {
                Ok(()) => break,
                Err(e) if e.kind() == ErrorKind::NotFound && attempts < 2 => continue,
                Err(source) => {
                    return Err(StorageError::Io {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }

        debug!("Stored {} bytes at {}", data.len(), path.display());

        Ok(StoredObject {
            path: path.display().to_string(),
            size: data.len() as i64,
        })
    }

    /// Remove a previously stored binary, and its client directory once empty
    pub async fn remove(&self, path: &str) -> Result<(), StorageError> {
        fs::remove_file(path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.to_string(),
                source,
            })?;

        debug!("Removed stored file {}", path);
        self.prune_empty_dir(Path::new(path)).await;
        Ok(())
    }

    async fn prune_empty_dir(&self, file_path: &Path) {
        let Some(dir) = file_path.parent() else {
            return;
        };
        if dir == self.root || !dir.starts_with(&self.root) {
            return;
        }

        // `remove_dir` refuses non-empty directories
        match fs::remove_dir(dir).await {
            Ok(()) => debug!("Removed empty directory {}", dir.display()),
            Err(e) => debug!("Kept directory {}: {}", dir.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::DEFAULT_MAX_UPLOAD_SIZE;
    use tokio_test::{assert_err, assert_ok};

    fn storage(dir: &tempfile::TempDir) -> LocalDiskStorage {
        LocalDiskStorage::new(&StorageConfig {
            upload_dir: dir.path().join("uploads"),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        })
    }

    #[test]
    fn test_generate_path_keeps_safe_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let path = storage.generate_path(7, "Contract.PDF");
        assert!(path.starts_with(storage.root().join("7")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));

        let path = storage.generate_path(7, "../../etc/passwd");
        assert_eq!(path.parent(), Some(storage.root().join("7").as_path()));
        assert_eq!(path.extension(), None);
    }

    #[tokio::test]
    async fn test_store_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let stored = storage.store(3, "notes.txt", b"hello").await.unwrap();
        assert_eq!(stored.size, 5);
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"hello");

        assert_ok!(storage.remove(&stored.path).await);
        assert!(!Path::new(&stored.path).exists());
        assert!(!storage.root().join("3").exists());
        assert!(storage.root().exists());
    }

    #[tokio::test]
    async fn test_remove_keeps_directory_with_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let first = storage.store(5, "a.txt", b"a").await.unwrap();
        let second = storage.store(5, "b.txt", b"b").await.unwrap();

        assert_ok!(storage.remove(&first.path).await);
        assert!(storage.root().join("5").is_dir());
        assert!(Path::new(&second.path).exists());

        assert_ok!(storage.remove(&second.path).await);
        assert!(!storage.root().join("5").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let missing = dir.path().join("nope.bin");
        assert_err!(storage.remove(&missing.display().to_string()).await);
    }
}
