// src/config.rs

use anyhow::Context;
use std::{env, path::PathBuf, str::FromStr, sync::Arc};

use crate::{
    db::{FileStorage, MemoryStorage, PgStorage, RecordStore, Storage},
    services::{
        auth::AuthService, backup_service::BackupService, crm_service::CrmService,
        dashboard_service::DashboardService, finance_service::FinanceService,
        inventory_service::InventoryService, operation_service::OperationsService,
        seed_service::SeedService,
    },
};

// ---
// Configuração (variáveis de ambiente)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "postgres" => Ok(StorageBackend::Postgres),
            other => anyhow::bail!("STORAGE_BACKEND inválido: '{}' (use memory, file ou postgres)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub storage_quota_bytes: Option<usize>,
    pub bcrypt_cost: u32,
    pub seed_on_start: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let storage_backend = get_env("STORAGE_BACKEND")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(StorageBackend::File);

        let database_url = get_env("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida quando STORAGE_BACKEND=postgres");
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            jwt_secret,
            storage_backend,
            data_dir: get_env("DATA_DIR").unwrap_or_else(|| "./data".to_string()).into(),
            database_url,
            storage_quota_bytes: parse_env("STORAGE_QUOTA_BYTES")?,
            bcrypt_cost: parse_env("BCRYPT_COST")?.unwrap_or(bcrypt::DEFAULT_COST),
            seed_on_start: parse_env("SEED_ON_START")?.unwrap_or(false),
        })
    }

    // Configuração usada nos testes: memória, sem seed, bcrypt barato
    pub fn for_tests() -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            jwt_secret: "segredo-de-teste".to_string(),
            storage_backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
            database_url: None,
            storage_quota_bytes: None,
            bcrypt_cost: 4,
            seed_on_start: false,
        }
    }
}

// Variável vazia conta como ausente
fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get_env(key)
        .map(|v| v.trim().parse::<T>().with_context(|| format!("{} inválido: '{}'", key, v)))
        .transpose()
}

/// Abre o meio de persistência escolhido na configuração.
pub async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.storage_backend {
        StorageBackend::Memory => match config.storage_quota_bytes {
            Some(quota) => Arc::new(MemoryStorage::with_quota(quota)),
            None => Arc::new(MemoryStorage::new()),
        },
        StorageBackend::File => Arc::new(FileStorage::open(&config.data_dir).await?),
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL deve ser definida")?;
            Arc::new(PgStorage::connect(url).await?)
        }
    };

    tracing::info!("✅ Persistência pronta ({:?})", config.storage_backend);
    Ok(storage)
}

// ---
// Estado compartilhado da aplicação
// ---

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: RecordStore,
    pub auth_service: AuthService,
    pub crm_service: CrmService,
    pub operations_service: OperationsService,
    pub inventory_service: InventoryService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,
    pub seed_service: SeedService,
    pub backup_service: BackupService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::from_env()?;
        let storage = open_storage(&config).await?;
        Ok(Self::with_storage(config, storage))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Self {
        let store = RecordStore::new(storage);

        let auth_service =
            AuthService::new(store.clone(), config.jwt_secret.clone(), config.bcrypt_cost);
        let seed_service = SeedService::new(store.clone(), auth_service.clone());

        Self {
            config: Arc::new(config),
            crm_service: CrmService::new(store.clone()),
            operations_service: OperationsService::new(store.clone()),
            inventory_service: InventoryService::new(store.clone()),
            finance_service: FinanceService::new(store.clone()),
            dashboard_service: DashboardService::new(store.clone()),
            backup_service: BackupService::new(store.clone()),
            auth_service,
            seed_service,
            store,
        }
    }
}
