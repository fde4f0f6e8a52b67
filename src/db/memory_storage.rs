// src/db/memory_storage.rs

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::storage::{Collection, Storage, StorageError};

/// Armazenamento em memória, com cota opcional em bytes (como o
/// localStorage de um navegador). Usado nos testes e no modo `memory`.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<Collection, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, collection: Collection) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.read().await.get(&collection).cloned())
    }

    async fn set(&self, collection: Collection, blob: String) -> Result<(), StorageError> {
        let mut blobs = self.blobs.write().await;

        if let Some(limit) = self.quota_bytes {
            let others: usize = blobs
                .iter()
                .filter(|(key, _)| **key != collection)
                .map(|(_, value)| value.len())
                .sum();
            let needed = others + blob.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        blobs.insert(collection, blob);
        Ok(())
    }

    async fn remove(&self, collection: Collection) -> Result<(), StorageError> {
        self.blobs.write().await.remove(&collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_writes_over_the_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set(Collection::Users, "[]".into()).await.unwrap();

        let err = storage
            .set(Collection::Patients, "[1,2,3,4,5,6]".into())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 15, limit: 10 }));

        // A coleção que falhou continua como estava
        assert_eq!(storage.get(Collection::Patients).await.unwrap(), None);
    }

    #[tokio::test]
    async fn replacing_a_blob_does_not_count_the_old_value() {
        let storage = MemoryStorage::with_quota(8);
        storage.set(Collection::Users, "[1,2,3]".into()).await.unwrap();
        storage.set(Collection::Users, "[4,5,6]".into()).await.unwrap();
        assert_eq!(storage.get(Collection::Users).await.unwrap().as_deref(), Some("[4,5,6]"));
    }
}
