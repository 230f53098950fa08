use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageResult};

/// In-memory storage; keys are kept ordered so listings are stable
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let mut storage = self.data.write().await;
        storage.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let storage = self.data.read().await;
        storage.get(key)
            .cloned()
            .ok_or_else(|| StorageError::KeyNotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut storage = self.data.write().await;
        if storage.remove(key).is_none() {
            return Err(StorageError::KeyNotFound(key.to_string()));
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let storage = self.data.read().await;
        Ok(storage.contains_key(key))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let storage = self.data.read().await;
        Ok(storage
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn base_path(&self) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonStorage;

    #[tokio::test]
    async fn test_memory_storage_basic_operations() {
        let storage = MemoryStorage::new();

        storage.put("docgraph/documents/a", b"doc-a").await.unwrap();
        assert_eq!(storage.get("docgraph/documents/a").await.unwrap(), b"doc-a");
        assert!(storage.exists("docgraph/documents/a").await.unwrap());
        assert!(!storage.exists("docgraph/documents/b").await.unwrap());

        storage.put("docgraph/edges/2", b"e2").await.unwrap();
        storage.put("docgraph/edges/1", b"e1").await.unwrap();
        storage.put("docgraph/edgesx", b"other").await.unwrap();
        let keys = storage.list("docgraph/edges/").await.unwrap();
        assert_eq!(keys, vec!["docgraph/edges/1".to_string(), "docgraph/edges/2".to_string()]);

        storage.delete("docgraph/documents/a").await.unwrap();
        assert!(!storage.exists("docgraph/documents/a").await.unwrap());
        assert_eq!(storage.len().await, 3);
    }

    #[tokio::test]
    async fn test_memory_storage_errors() {
        let storage = MemoryStorage::new();

        let result = storage.get("missing").await;
        assert!(matches!(result, Err(StorageError::KeyNotFound(_))));

        let result = storage.delete("missing").await;
        assert!(matches!(result, Err(StorageError::KeyNotFound(_))));

        let result: StorageResult<u32> = storage.get_json("missing").await;
        assert!(matches!(result, Err(StorageError::KeyNotFound(_))));
    }
}
