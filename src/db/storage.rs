// src/db/storage.rs

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

// ---
// Coleções
// ---
// Cada coleção é persistida como um único blob JSON (lista de registros)
// sob a sua chave.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Patients,
    Procedures,
    Products,
    Appointments,
    Treatments,
    FinancialRecords,
    StockMovements,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Users,
        Collection::Patients,
        Collection::Procedures,
        Collection::Products,
        Collection::Appointments,
        Collection::Treatments,
        Collection::FinancialRecords,
        Collection::StockMovements,
    ];

    /// Chave de armazenamento da coleção.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Users => "clinic_users",
            Collection::Patients => "clinic_patients",
            Collection::Procedures => "clinic_procedures",
            Collection::Products => "clinic_products",
            Collection::Appointments => "clinic_appointments",
            Collection::Treatments => "clinic_treatments",
            Collection::FinancialRecords => "clinic_financial_records",
            Collection::StockMovements => "clinic_stock_movements",
        }
    }

    /// Nome usado no arquivo de backup (export/import).
    pub fn export_name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Patients => "patients",
            Collection::Procedures => "procedures",
            Collection::Products => "products",
            Collection::Appointments => "appointments",
            Collection::Treatments => "treatments",
            Collection::FinancialRecords => "financial_records",
            Collection::StockMovements => "stock_movements",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Erro ao rodar as migrações: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cota de armazenamento excedida: {needed} bytes de {limit} permitidos")]
    QuotaExceeded { needed: usize, limit: usize },
}

/// Meio de persistência por trás do `RecordStore`.
///
/// Guarda blobs opacos por coleção. A implementação é escolhida pelo processo
/// (ver `config.rs`) e injetada no store.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, collection: Collection) -> Result<Option<String>, StorageError>;

    async fn set(&self, collection: Collection, blob: String) -> Result<(), StorageError>;

    async fn remove(&self, collection: Collection) -> Result<(), StorageError>;
}
