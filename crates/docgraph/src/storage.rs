//! Key/value persistence behind the document graph

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Operations every storage backend supports
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Store data at the specified key
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Retrieve data from the specified key
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete data at the specified key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List all keys with a given prefix
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get base path of the storage
    fn base_path(&self) -> Option<PathBuf>;
}

/// Extension trait for JSON serialization/deserialization
#[async_trait]
pub trait JsonStorage: Storage {
    /// Store a serializable value at the specified key
    async fn put_json<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json_data = serde_json::to_vec_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.put(key, &json_data).await
    }

    /// Retrieve and deserialize a value from the specified key
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> StorageResult<T> {
        let data = self.get(key).await?;
        serde_json::from_slice(&data)
            .map_err(|e| StorageError::DeserializationError(e.to_string()))
    }
}

impl<T: Storage + ?Sized> JsonStorage for T {}

/// File system storage; each key is a file below `base_path`
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| StorageError::IoError(format!("Failed to create {}: {}", base_path.display(), e)))?;
        Ok(FileStorage { base_path })
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(relative))
    }

    fn key_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_path(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await
                .map_err(|e| StorageError::IoError(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&path, data).await
            .map_err(|e| StorageError::IoError(format!("Failed to write {}: {}", key, e)))
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::KeyNotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::IoError(format!("Failed to read {}: {}", key, e))),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::KeyNotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::IoError(format!("Failed to delete {}: {}", key, e))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_path(key)?;
        Ok(tokio::fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        // Walk from the deepest directory fully named by the prefix
        let dir_part = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let start = if dir_part.is_empty() {
            self.base_path.clone()
        } else {
            self.key_path(dir_part)?
        };

        let mut result = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::IoError(format!("Failed to read directory: {}", e))),
            };

            while let Some(entry) = entries.next_entry().await
                .map_err(|e| StorageError::IoError(format!("Failed to read directory entry: {}", e)))? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_of(&path) {
                    if key.starts_with(prefix) {
                        result.push(key);
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    fn base_path(&self) -> Option<PathBuf> {
        Some(self.base_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_storage_basic_operations() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();

        storage.put("docgraph/documents/abc", b"doc").await.unwrap();
        assert!(temp_dir.path().join("docgraph/documents/abc").exists());
        assert_eq!(storage.get("docgraph/documents/abc").await.unwrap(), b"doc");
        assert!(storage.exists("docgraph/documents/abc").await.unwrap());
        assert!(!storage.exists("docgraph/documents/def").await.unwrap());

        storage.put("docgraph/edges/00000000000000000001", b"e1").await.unwrap();
        storage.put("docgraph/edges/00000000000000000002", b"e2").await.unwrap();
        let keys = storage.list("docgraph/edges/").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "docgraph/edges/00000000000000000001".to_string(),
                "docgraph/edges/00000000000000000002".to_string(),
            ]
        );
        assert_eq!(storage.list("docgraph/").await.unwrap().len(), 3);

        storage.delete("docgraph/documents/abc").await.unwrap();
        assert!(matches!(
            storage.get("docgraph/documents/abc").await,
            Err(StorageError::KeyNotFound(_))
        ));
        assert!(matches!(
            storage.delete("docgraph/documents/abc").await,
            Err(StorageError::KeyNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_storage_rejects_escaping_keys() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();

        assert!(matches!(
            storage.put("../outside", b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get("/etc/passwd").await, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_json_storage() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();

        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Settings {
            dao: String,
            paused: bool,
        }

        let settings = Settings { dao: "dao.hypha".to_string(), paused: false };
        storage.put_json("settings", &settings).await.unwrap();
        let loaded: Settings = storage.get_json("settings").await.unwrap();
        assert_eq!(loaded, settings);
    }
}
