// src/db/file_storage.rs

use async_trait::async_trait;
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;

use super::storage::{Collection, Storage, StorageError};

/// Um arquivo JSON por coleção dentro de `DATA_DIR`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::info!("📁 Armazenamento em arquivos: {}", dir.display());
        Ok(Self { dir })
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, collection: Collection) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(collection)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, collection: Collection, blob: String) -> Result<(), StorageError> {
        // Escreve num arquivo temporário e renomeia, para nunca deixar um JSON pela metade
        let target = self.path(collection);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, blob).await?;
        fs::rename(&tmp, &target).await?;
        Ok(())
    }

    async fn remove(&self, collection: Collection) -> Result<(), StorageError> {
        match fs::remove_file(self.path(collection)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blobs_survive_reopening_the_directory() {
        let dir = std::env::temp_dir().join(format!("clinica-fs-{}", uuid::Uuid::new_v4()));

        let storage = FileStorage::open(&dir).await.unwrap();
        assert_eq!(storage.get(Collection::Products).await.unwrap(), None);
        storage.set(Collection::Products, "[{\"a\":1}]".into()).await.unwrap();

        let reopened = FileStorage::open(&dir).await.unwrap();
        assert_eq!(
            reopened.get(Collection::Products).await.unwrap().as_deref(),
            Some("[{\"a\":1}]")
        );

        reopened.remove(Collection::Products).await.unwrap();
        reopened.remove(Collection::Products).await.unwrap();
        assert_eq!(reopened.get(Collection::Products).await.unwrap(), None);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
