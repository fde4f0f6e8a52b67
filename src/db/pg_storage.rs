// src/db/pg_storage.rs

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use super::storage::{Collection, Storage, StorageError};

/// Tabela chave/valor no Postgres: uma linha por coleção.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&pool).await?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get(&self, collection: Collection) -> Result<Option<String>, StorageError> {
        let blob = sqlx::query_scalar::<_, String>(
            "SELECT value FROM clinic_collections WHERE key = $1",
        )
        .bind(collection.key())
        .fetch_optional(&self.pool)
        .await?;

        Ok(blob)
    }

    async fn set(&self, collection: Collection, blob: String) -> Result<(), StorageError> {
        // UPSERT: a coleção inteira é substituída de uma vez
        sqlx::query(
            r#"
            INSERT INTO clinic_collections (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key)
            DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            "#,
        )
        .bind(collection.key())
        .bind(blob)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, collection: Collection) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM clinic_collections WHERE key = $1")
            .bind(collection.key())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
