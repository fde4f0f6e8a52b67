// src/services/backup_service.rs

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::{Collection, RecordStore},
};

#[derive(Clone)]
pub struct BackupService {
    store: RecordStore,
}

impl BackupService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn export(&self) -> Value {
        tracing::info!("📤 Exportando backup");
        self.store.export().await
    }

    /// Restaura um backup. Nada é gravado se alguma coleção for inválida.
    pub async fn import(&self, json: &str) -> Result<Vec<&'static str>, AppError> {
        let imported = self.store.import(json).await.inspect_err(|e| {
            tracing::warn!("⛔ Backup recusado: {}", e);
        })?;
        Ok(imported.into_iter().map(Collection::export_name).collect())
    }

    pub async fn clear(&self) {
        tracing::warn!("🧹 Limpando todos os dados da clínica");
        self.store.clear_all().await;
    }
}
