// src/db/populate.rs

use async_trait::async_trait;
use std::collections::HashMap;

use super::{record::Record, record_store::RecordStore};
use crate::models::{
    auth::{User, UserProfile},
    crm::Patient,
    finance::{FinancialRecord, FinancialRecordDetail},
    inventory::{Product, StockMovement, StockMovementDetail},
    operations::{Appointment, AppointmentDetail, Procedure, Treatment, TreatmentDetail},
};

/// Registros com relações resolvíveis por id.
///
/// As coleções relacionadas são carregadas uma vez por chamada e indexadas,
/// então popular uma lista inteira custa uma leitura por coleção.
#[async_trait]
pub trait Populate: Record {
    type Populated: serde::Serialize + Send;

    async fn populate(store: &RecordStore, records: Vec<Self>) -> Vec<Self::Populated>;
}

async fn profiles(store: &RecordStore) -> HashMap<String, UserProfile> {
    store
        .index::<User>()
        .await
        .into_iter()
        .map(|(id, user)| (id, UserProfile::from(&user)))
        .collect()
}

#[async_trait]
impl Populate for Appointment {
    type Populated = AppointmentDetail;

    async fn populate(store: &RecordStore, records: Vec<Self>) -> Vec<AppointmentDetail> {
        let patients = store.index::<Patient>().await;
        let procedures = store.index::<Procedure>().await;
        let users = profiles(store).await;

        records
            .into_iter()
            .map(|appointment| AppointmentDetail {
                patient: patients.get(&appointment.patient_id).cloned(),
                procedure: procedures.get(&appointment.procedure_id).cloned(),
                user: users.get(&appointment.user_id).cloned(),
                appointment,
            })
            .collect()
    }
}

#[async_trait]
impl Populate for Treatment {
    type Populated = TreatmentDetail;

    async fn populate(store: &RecordStore, records: Vec<Self>) -> Vec<TreatmentDetail> {
        let patients = store.index::<Patient>().await;
        let procedures = store.index::<Procedure>().await;
        let users = profiles(store).await;

        records
            .into_iter()
            .map(|treatment| TreatmentDetail {
                patient: patients.get(&treatment.patient_id).cloned(),
                procedure: procedures.get(&treatment.procedure_id).cloned(),
                user: users.get(&treatment.user_id).cloned(),
                treatment,
            })
            .collect()
    }
}

#[async_trait]
impl Populate for StockMovement {
    type Populated = StockMovementDetail;

    async fn populate(store: &RecordStore, records: Vec<Self>) -> Vec<StockMovementDetail> {
        let products = store.index::<Product>().await;
        let users = profiles(store).await;

        records
            .into_iter()
            .map(|movement| StockMovementDetail {
                product: products.get(&movement.product_id).cloned(),
                user: users.get(&movement.user_id).cloned(),
                movement,
            })
            .collect()
    }
}

#[async_trait]
impl Populate for FinancialRecord {
    type Populated = FinancialRecordDetail;

    async fn populate(store: &RecordStore, records: Vec<Self>) -> Vec<FinancialRecordDetail> {
        let users = profiles(store).await;

        records
            .into_iter()
            .map(|record| FinancialRecordDetail {
                user: users.get(&record.user_id).cloned(),
                record,
            })
            .collect()
    }
}
