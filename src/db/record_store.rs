// src/db/record_store.rs

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

use super::{
    populate::Populate,
    record::{generate_id, next_timestamp, Patchable, Record},
    storage::{Collection, Storage},
};
use crate::models::{
    auth::User,
    crm::Patient,
    finance::FinancialRecord,
    inventory::{NewStockMovement, Product, ProductPatch, StockMovement},
    operations::{Appointment, Procedure, Treatment},
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("o backup deve ser um objeto JSON")]
    NotAnObject,

    #[error("coleção '{collection}' inválida: {source}")]
    InvalidCollection {
        collection: &'static str,
        source: serde_json::Error,
    },
}

/// CRUD genérico sobre as coleções da clínica.
///
/// Cada operação lê a coleção inteira, altera em memória e grava a coleção
/// inteira de volta. Não há lock: duas escritas concorrentes na mesma coleção
/// terminam com a última vencendo.
///
/// Falhas do meio de persistência não sobem como erro. Leituras que falham
/// viram coleção vazia; escritas que falham são logadas e o chamador recebe o
/// resultado em memória, que não sobrevive a um reload.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn Storage>,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // ---
    // Acesso ao blob
    // ---

    async fn load<T: Record>(&self) -> Vec<T> {
        let blob = match self.storage.get(T::COLLECTION).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("🔥 Falha ao ler a coleção {}: {}", T::COLLECTION, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&blob).unwrap_or_else(|e| {
            tracing::error!("🔥 Coleção {} ilegível, tratada como vazia: {}", T::COLLECTION, e);
            Vec::new()
        })
    }

    async fn persist<T: Record>(&self, records: &[T]) {
        match serde_json::to_string(records) {
            Ok(blob) => self.write_blob(T::COLLECTION, blob).await,
            Err(e) => tracing::error!("🔥 Falha ao serializar a coleção {}: {}", T::COLLECTION, e),
        }
    }

    async fn write_blob(&self, collection: Collection, blob: String) {
        if let Err(e) = self.storage.set(collection, blob).await {
            tracing::error!("🔥 Erro ao salvar a coleção {}: {}", collection, e);
        }
    }

    // ---
    // CRUD
    // ---

    pub async fn create<T: Record>(&self, draft: T::Draft) -> T {
        let mut records = self.load::<T>().await;

        let mut id = generate_id();
        while records.iter().any(|r| r.id() == id) {
            id = generate_id();
        }

        let record = T::from_draft(id, Utc::now(), draft);
        records.push(record.clone());
        self.persist(&records).await;
        record
    }

    /// Todos os registros, na ordem de inserção.
    pub async fn find_all<T: Record>(&self) -> Vec<T> {
        self.load::<T>().await
    }

    pub async fn find_by_id<T: Record>(&self, id: &str) -> Option<T> {
        self.load::<T>().await.into_iter().find(|r| r.id() == id)
    }

    /// Aplica o patch sobre o registro e renova o `updatedAt`.
    /// `None` se o id não existir.
    pub async fn update<T: Patchable>(&self, id: &str, patch: T::Patch) -> Option<T> {
        let mut records = self.load::<T>().await;
        let record = records.iter_mut().find(|r| r.id() == id)?;

        record.apply(patch);
        let updated_at = next_timestamp(record.updated_at());
        record.set_updated_at(updated_at);
        let updated = record.clone();

        self.persist(&records).await;
        Some(updated)
    }

    /// Remoção física. Retorna se algum registro foi de fato removido.
    pub async fn delete<T: Record>(&self, id: &str) -> bool {
        let mut records = self.load::<T>().await;
        let initial_len = records.len();
        records.retain(|r| r.id() != id);
        let removed = records.len() < initial_len;

        self.persist(&records).await;
        removed
    }

    /// Coleção indexada por id, usada para resolver relações.
    pub async fn index<T: Record>(&self) -> HashMap<String, T> {
        self.load::<T>()
            .await
            .into_iter()
            .map(|r| (r.id().to_string(), r))
            .collect()
    }

    // ---
    // Relações
    // ---

    pub async fn find_all_populated<T: Populate>(&self) -> Vec<T::Populated> {
        let records = self.load::<T>().await;
        T::populate(self, records).await
    }

    pub async fn find_by_id_populated<T: Populate>(&self, id: &str) -> Option<T::Populated> {
        let record = self.find_by_id::<T>(id).await?;
        T::populate(self, vec![record]).await.pop()
    }

    // ---
    // Estoque
    // ---

    /// Grava a movimentação e depois ajusta o `currentStock` do produto.
    ///
    /// São duas escritas independentes: se a segunda falhar o estoque fica
    /// divergente das movimentações. Não há piso: uma saída maior que o saldo
    /// deixa o estoque negativo (a checagem fica no `InventoryService`).
    pub async fn create_stock_movement(&self, draft: NewStockMovement) -> StockMovement {
        let delta = draft.movement_type.signed(draft.quantity);
        let product_id = draft.product_id.clone();

        let movement = self.create::<StockMovement>(draft).await;

        match self.find_by_id::<Product>(&product_id).await {
            Some(product) => {
                let patch = ProductPatch {
                    current_stock: Some(product.current_stock + delta),
                    ..Default::default()
                };
                self.update::<Product>(&product_id, patch).await;
            }
            None => tracing::warn!(
                "⚠️ Movimentação {} aponta para o produto inexistente {}",
                movement.id,
                product_id
            ),
        }

        movement
    }

    // ---
    // Utilitários (backup)
    // ---

    pub async fn clear_all(&self) {
        for collection in Collection::ALL {
            if let Err(e) = self.storage.remove(collection).await {
                tracing::error!("🔥 Erro ao limpar a coleção {}: {}", collection, e);
            }
        }
        tracing::info!("🧹 Todas as coleções foram limpas");
    }

    /// Todas as coleções num único objeto JSON, chaveado pelo nome da coleção.
    pub async fn export(&self) -> Value {
        let mut data = Map::new();
        for collection in Collection::ALL {
            let records = self.export_collection(collection).await;
            data.insert(collection.export_name().to_string(), records);
        }
        Value::Object(data)
    }

    async fn export_collection(&self, collection: Collection) -> Value {
        let value = match collection {
            Collection::Users => serde_json::to_value(self.find_all::<User>().await),
            Collection::Patients => serde_json::to_value(self.find_all::<Patient>().await),
            Collection::Procedures => serde_json::to_value(self.find_all::<Procedure>().await),
            Collection::Products => serde_json::to_value(self.find_all::<Product>().await),
            Collection::Appointments => serde_json::to_value(self.find_all::<Appointment>().await),
            Collection::Treatments => serde_json::to_value(self.find_all::<Treatment>().await),
            Collection::FinancialRecords => {
                serde_json::to_value(self.find_all::<FinancialRecord>().await)
            }
            Collection::StockMovements => {
                serde_json::to_value(self.find_all::<StockMovement>().await)
            }
        };

        value.unwrap_or_else(|e| {
            tracing::error!("🔥 Falha ao exportar a coleção {}: {}", collection, e);
            Value::Array(Vec::new())
        })
    }

    /// Restaura as coleções presentes no backup.
    ///
    /// Tudo é validado antes da primeira escrita: um backup com qualquer
    /// coleção inválida não altera nada.
    pub async fn import(&self, json: &str) -> Result<Vec<Collection>, ImportError> {
        let Value::Object(data) = serde_json::from_str::<Value>(json)? else {
            return Err(ImportError::NotAnObject);
        };

        let mut blobs = Vec::new();
        for collection in Collection::ALL {
            let Some(value) = data.get(collection.export_name()).filter(|v| !v.is_null()) else {
                continue;
            };

            let blob = match collection {
                Collection::Users => revalidate::<User>(value)?,
                Collection::Patients => revalidate::<Patient>(value)?,
                Collection::Procedures => revalidate::<Procedure>(value)?,
                Collection::Products => revalidate::<Product>(value)?,
                Collection::Appointments => revalidate::<Appointment>(value)?,
                Collection::Treatments => revalidate::<Treatment>(value)?,
                Collection::FinancialRecords => revalidate::<FinancialRecord>(value)?,
                Collection::StockMovements => revalidate::<StockMovement>(value)?,
            };
            blobs.push((collection, blob));
        }

        let imported: Vec<Collection> = blobs.iter().map(|(c, _)| *c).collect();
        for (collection, blob) in blobs {
            self.write_blob(collection, blob).await;
        }

        tracing::info!("📦 Backup importado: {} coleções", imported.len());
        Ok(imported)
    }
}

fn revalidate<T: Record>(value: &Value) -> Result<String, ImportError> {
    let records = Vec::<T>::deserialize(value).map_err(|source| ImportError::InvalidCollection {
        collection: T::COLLECTION.export_name(),
        source,
    })?;
    Ok(serde_json::to_string(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStorage, StorageError};
    use crate::models::{
        auth::{NewUser, UserRole},
        crm::{NewPatient, PatientPatch},
        inventory::{NewProduct, StockMovementType},
        operations::{AppointmentStatus, NewAppointment, NewProcedure},
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    fn store() -> RecordStore {
        RecordStore::new(Arc::new(MemoryStorage::new()))
    }

    fn new_patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            phone: "(11) 99999-1111".to_string(),
            active: true,
            ..Default::default()
        }
    }

    fn new_product(current_stock: i64, min_stock: i64) -> NewProduct {
        NewProduct {
            name: "Sérum Vitamina C".to_string(),
            brand: Some("SkinCare Pro".to_string()),
            category: "Séruns".to_string(),
            unit: "ml".to_string(),
            cost_price: Decimal::from(25),
            sale_price: Some(Decimal::from(45)),
            min_stock: Decimal::from(min_stock),
            current_stock: Decimal::from(current_stock),
            active: true,
        }
    }

    fn movement(product_id: &str, movement_type: StockMovementType, quantity: i64) -> NewStockMovement {
        NewStockMovement {
            product_id: product_id.to_string(),
            movement_type,
            quantity: Decimal::from(quantity),
            reason: "Ajuste".to_string(),
            user_id: "user-1".to_string(),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_non_empty_ids() {
        let store = store();
        for i in 0..50 {
            store.create::<Patient>(new_patient(&format!("Paciente {}", i))).await;
        }

        let patients = store.find_all::<Patient>().await;
        let ids: HashSet<&str> = patients.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(patients.len(), 50);
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn find_all_keeps_insertion_order() {
        let store = store();
        store.create::<Patient>(new_patient("Ana")).await;
        store.create::<Patient>(new_patient("Bruno")).await;
        store.create::<Patient>(new_patient("Carla")).await;

        let names: Vec<String> = store
            .find_all::<Patient>()
            .await
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Ana", "Bruno", "Carla"]);
    }

    #[tokio::test]
    async fn find_all_on_an_empty_collection_is_empty() {
        let store = store();
        assert!(store.find_all::<Appointment>().await.is_empty());
        assert!(store.find_all_populated::<Appointment>().await.is_empty());
    }

    #[tokio::test]
    async fn update_merges_fields_and_bumps_updated_at() {
        let store = store();
        let created = store.create::<Patient>(new_patient("João Silva")).await;

        let patch = PatientPatch {
            city: Some(Some("São Paulo".to_string())),
            ..Default::default()
        };
        let updated = store.update::<Patient>(&created.id, patch).await.unwrap();
        assert_eq!(updated.city.as_deref(), Some("São Paulo"));

        let found = store.find_by_id::<Patient>(&created.id).await.unwrap();
        assert_eq!(found.city.as_deref(), Some("São Paulo"));
        assert_eq!(found.name, "João Silva");
        assert_eq!(found.created_at, created.created_at);
        assert!(found.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_of_an_absent_id_returns_none() {
        let store = store();
        store.create::<Patient>(new_patient("Ana")).await;

        let patch = PatientPatch {
            active: Some(false),
            ..Default::default()
        };
        assert!(store.update::<Patient>("nao-existe", patch).await.is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_record_and_reports_absent_ids() {
        let store = store();
        let ana = store.create::<Patient>(new_patient("Ana")).await;
        store.create::<Patient>(new_patient("Bruno")).await;

        assert!(store.delete::<Patient>(&ana.id).await);
        assert!(store.find_by_id::<Patient>(&ana.id).await.is_none());

        assert!(!store.delete::<Patient>("nao-existe").await);
        assert_eq!(store.find_all::<Patient>().await.len(), 1);
    }

    #[tokio::test]
    async fn interleaved_movements_net_out_on_current_stock() {
        let store = store();
        let product = store.create::<Product>(new_product(10, 2)).await;

        let steps = [
            (StockMovementType::In, 5),
            (StockMovementType::Out, 3),
            (StockMovementType::In, 12),
            (StockMovementType::Out, 7),
            (StockMovementType::Out, 1),
        ];
        let mut expected = Decimal::from(10);
        for (kind, qty) in steps {
            let before = store.find_by_id::<Product>(&product.id).await.unwrap().current_stock;
            store.create_stock_movement(movement(&product.id, kind, qty)).await;
            let after = store.find_by_id::<Product>(&product.id).await.unwrap().current_stock;

            assert_eq!(after, before + kind.signed(Decimal::from(qty)));
            expected += kind.signed(Decimal::from(qty));
        }

        let product = store.find_by_id::<Product>(&product.id).await.unwrap();
        assert_eq!(product.current_stock, expected);
        assert_eq!(product.current_stock, Decimal::from(16));
        assert_eq!(store.find_all::<StockMovement>().await.len(), steps.len());
    }

    #[tokio::test]
    async fn out_movement_larger_than_stock_goes_negative() {
        let store = store();
        let product = store.create::<Product>(new_product(20, 5)).await;

        store
            .create_stock_movement(movement(&product.id, StockMovementType::Out, 25))
            .await;

        let product = store.find_by_id::<Product>(&product.id).await.unwrap();
        assert_eq!(product.current_stock, Decimal::from(-5));
    }

    #[tokio::test]
    async fn movement_for_a_missing_product_is_still_recorded() {
        let store = store();
        let recorded = store
            .create_stock_movement(movement("fantasma", StockMovementType::In, 3))
            .await;

        assert!(store.find_by_id::<StockMovement>(&recorded.id).await.is_some());
        assert!(store.find_all::<Product>().await.is_empty());
    }

    #[tokio::test]
    async fn appointment_is_populated_with_its_relations() {
        let store = store();
        let patient = store.create::<Patient>(new_patient("Maria Oliveira")).await;
        let procedure = store
            .create::<Procedure>(NewProcedure {
                name: "Limpeza de Pele".to_string(),
                description: None,
                duration: 60,
                price: Decimal::from(80),
                category: "Facial".to_string(),
                active: true,
            })
            .await;
        let user = store
            .create::<User>(NewUser {
                name: "Dra. Maria Silva".to_string(),
                email: "maria@clinica.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Esthetician,
                active: true,
            })
            .await;

        let appointment = store
            .create::<Appointment>(NewAppointment {
                patient_id: patient.id.clone(),
                procedure_id: procedure.id.clone(),
                user_id: user.id.clone(),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                start_time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                status: AppointmentStatus::Scheduled,
                notes: None,
            })
            .await;

        let detail = store
            .find_by_id_populated::<Appointment>(&appointment.id)
            .await
            .unwrap();
        assert_eq!(detail.patient.unwrap().name, "Maria Oliveira");
        assert_eq!(detail.procedure.unwrap().name, "Limpeza de Pele");
        assert_eq!(detail.user.unwrap().name, "Dra. Maria Silva");

        // O JSON não vaza o hash da senha
        let all = store.find_all_populated::<Appointment>().await;
        let json = serde_json::to_value(&all).unwrap();
        assert!(json[0]["user"].get("password").is_none());
        assert_eq!(json[0]["startTime"], "09:00");
    }

    #[tokio::test]
    async fn dangling_references_become_absent_relations() {
        let store = store();
        let appointment = store
            .create::<Appointment>(NewAppointment {
                patient_id: "sumiu".to_string(),
                procedure_id: "sumiu".to_string(),
                user_id: "sumiu".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                start_time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                status: AppointmentStatus::Scheduled,
                notes: None,
            })
            .await;

        let detail = store
            .find_by_id_populated::<Appointment>(&appointment.id)
            .await
            .unwrap();
        assert!(detail.patient.is_none());
        assert!(detail.procedure.is_none());
        assert!(detail.user.is_none());

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json["patient"].is_null());
    }

    #[tokio::test]
    async fn failed_writes_still_return_the_in_memory_record() {
        let store = RecordStore::new(Arc::new(MemoryStorage::with_quota(16)));

        let patient = store.create::<Patient>(new_patient("Ana")).await;
        assert_eq!(patient.name, "Ana");
        assert!(!patient.id.is_empty());

        // Nada chegou ao meio de persistência
        assert!(store.find_by_id::<Patient>(&patient.id).await.is_none());
    }

    struct BrokenStorage;

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn get(&self, _: Collection) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disco indisponível").into())
        }

        async fn set(&self, _: Collection, _: String) -> Result<(), StorageError> {
            Err(std::io::Error::other("disco indisponível").into())
        }

        async fn remove(&self, _: Collection) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn read_failures_look_like_empty_collections() {
        let store = RecordStore::new(Arc::new(BrokenStorage));
        assert!(store.find_all::<Product>().await.is_empty());
        assert!(store.find_by_id::<Product>("x").await.is_none());
        assert!(!store.delete::<Product>("x").await);
    }

    #[tokio::test]
    async fn unreadable_blob_reads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(Collection::Patients, "isto não é json".to_string())
            .await
            .unwrap();

        let store = RecordStore::new(storage);
        assert!(store.find_all::<Patient>().await.is_empty());
    }

    #[tokio::test]
    async fn export_then_import_restores_every_collection() {
        let source = store();
        source.create::<Patient>(new_patient("Ana")).await;
        source.create::<Product>(new_product(4, 1)).await;
        let backup = source.export().await;

        assert_eq!(backup["patients"].as_array().unwrap().len(), 1);
        assert_eq!(backup["stock_movements"].as_array().unwrap().len(), 0);

        let target = store();
        let imported = target.import(&backup.to_string()).await.unwrap();
        assert_eq!(imported.len(), Collection::ALL.len());
        assert_eq!(target.find_all::<Patient>().await, source.find_all::<Patient>().await);
        assert_eq!(target.find_all::<Product>().await, source.find_all::<Product>().await);
    }

    #[tokio::test]
    async fn import_rejects_bad_input_without_writing() {
        let store = store();
        store.create::<Patient>(new_patient("Ana")).await;

        assert!(matches!(store.import("{oops").await, Err(ImportError::Json(_))));
        assert!(matches!(store.import("[1, 2]").await, Err(ImportError::NotAnObject)));

        // "patients" é válido, "products" não: nada deve ser gravado
        let bad = serde_json::json!({
            "patients": [],
            "products": [{ "name": "sem os outros campos" }],
        });
        let err = store.import(&bad.to_string()).await.unwrap_err();
        assert!(matches!(err, ImportError::InvalidCollection { collection: "products", .. }));
        assert_eq!(store.find_all::<Patient>().await.len(), 1);
    }

    #[tokio::test]
    async fn import_skips_collections_absent_from_the_backup() {
        let store = store();
        store.create::<Product>(new_product(4, 1)).await;

        let imported = store.import(r#"{ "patients": [] }"#).await.unwrap();
        assert_eq!(imported, vec![Collection::Patients]);
        assert_eq!(store.find_all::<Product>().await.len(), 1);
    }

    #[tokio::test]
    async fn import_accepts_dates_saved_as_full_timestamps() {
        let store = store();
        let backup = r#"{
            "patients": [{
                "id": "m7x1k2p0abc", "name": "Fernanda Costa", "phone": "(11) 98888-2222",
                "birthDate": "1990-05-15T03:00:00.000Z", "active": true,
                "createdAt": "2025-03-01T12:00:00.000Z", "updatedAt": "2025-03-01T12:00:00.000Z"
            }],
            "appointments": [{
                "id": "m7x1k2p1def", "patientId": "m7x1k2p0abc", "procedureId": "proc-1",
                "userId": "user-1", "date": "2025-03-10T03:00:00.000Z",
                "startTime": "09:00", "endTime": "10:00", "status": "SCHEDULED",
                "createdAt": "2025-03-01T12:00:00.000Z", "updatedAt": "2025-03-01T12:00:00.000Z"
            }],
            "treatments": [{
                "id": "m7x1k2p2ghi", "patientId": "m7x1k2p0abc", "procedureId": "proc-1",
                "userId": "user-1", "date": "2025-03-10T03:00:00.000Z",
                "price": 120, "discount": 20, "totalPaid": 100, "paymentMethod": "PIX",
                "createdAt": "2025-03-10T15:00:00.000Z", "updatedAt": "2025-03-10T15:00:00.000Z"
            }],
            "financial_records": [{
                "id": "m7x1k2p3jkl", "type": "INCOME", "category": "Tratamentos",
                "description": "Limpeza de pele", "amount": 100,
                "date": "2025-03-10T03:00:00.000Z", "userId": "user-1",
                "createdAt": "2025-03-10T15:00:00.000Z", "updatedAt": "2025-03-10T15:00:00.000Z"
            }]
        }"#;

        let imported = store.import(backup).await.unwrap();
        assert_eq!(imported.len(), 4);

        let march_10 = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let patient = store.find_by_id::<Patient>("m7x1k2p0abc").await.unwrap();
        assert_eq!(patient.birth_date, NaiveDate::from_ymd_opt(1990, 5, 15));
        assert_eq!(store.find_by_id::<Appointment>("m7x1k2p1def").await.unwrap().date, march_10);
        assert_eq!(store.find_by_id::<Treatment>("m7x1k2p2ghi").await.unwrap().date, march_10);
        assert_eq!(
            store.find_by_id::<FinancialRecord>("m7x1k2p3jkl").await.unwrap().date,
            march_10
        );
    }

    #[tokio::test]
    async fn clear_all_empties_every_collection() {
        let store = store();
        store.create::<Patient>(new_patient("Ana")).await;
        store.create::<Product>(new_product(4, 1)).await;

        store.clear_all().await;

        assert!(store.find_all::<Patient>().await.is_empty());
        assert!(store.find_all::<Product>().await.is_empty());
    }
}
