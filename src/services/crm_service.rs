// src/services/crm_service.rs

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        crm::{CreatePatientPayload, NewPatient, Patient, PatientPatch, UpdatePatientPayload},
        operations::{Appointment, Treatment},
        DeleteOutcome,
    },
};

#[derive(Clone)]
pub struct CrmService {
    store: RecordStore,
}

impl CrmService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Pacientes mais recentes primeiro.
    pub async fn list_patients(&self) -> Vec<Patient> {
        let mut patients = self.store.find_all::<Patient>().await;
        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        patients
    }

    pub async fn get_patient(&self, id: &str) -> Result<Patient, AppError> {
        self.store
            .find_by_id::<Patient>(id)
            .await
            .ok_or(AppError::PatientNotFound)
    }

    pub async fn create_patient(&self, payload: CreatePatientPayload) -> Patient {
        let patient = self
            .store
            .create::<Patient>(NewPatient::from(payload))
            .await;
        tracing::info!("🧑 Paciente cadastrado: {}", patient.name);
        patient
    }

    pub async fn update_patient(
        &self,
        id: &str,
        payload: UpdatePatientPayload,
    ) -> Result<Patient, AppError> {
        self.store
            .update::<Patient>(id, PatientPatch::from(payload))
            .await
            .ok_or(AppError::PatientNotFound)
    }

    /// Paciente com agendamentos ou tratamentos é apenas desativado.
    pub async fn delete_patient(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        let patient = self.get_patient(id).await?;

        let has_appointments = self
            .store
            .find_all::<Appointment>()
            .await
            .iter()
            .any(|a| a.patient_id == patient.id);
        let has_treatments = self
            .store
            .find_all::<Treatment>()
            .await
            .iter()
            .any(|t| t.patient_id == patient.id);

        if has_appointments || has_treatments {
            let patch = PatientPatch {
                active: Some(false),
                ..Default::default()
            };
            self.store.update::<Patient>(id, patch).await;
            tracing::warn!("⚠️ Paciente {} possui histórico, apenas desativado", patient.name);
            return Ok(DeleteOutcome::Deactivated);
        }

        self.store.delete::<Patient>(id).await;
        tracing::info!("🗑️ Paciente {} excluído", patient.name);
        Ok(DeleteOutcome::Deleted)
    }
}
