// src/services/operation_service.rs

use chrono::{Duration, NaiveTime};

use crate::{
    common::error::AppError,
    db::{Populate, RecordStore},
    models::{
        operations::{
            Appointment, AppointmentDetail, AppointmentFilter, AppointmentPatch,
            AppointmentStatus, CreateAppointmentPayload, CreateProcedurePayload,
            CreateTreatmentPayload, NewAppointment, NewProcedure, NewTreatment, Procedure,
            ProcedurePatch, Treatment, TreatmentDetail, UpdateAppointmentPayload,
            UpdateProcedurePayload,
        },
        DeleteOutcome,
    },
};

/// Horário de término: início + duração, dando a volta na meia-noite.
/// `None` se o início não estiver no formato "HH:MM".
pub fn compute_end_time(start_time: &str, duration_minutes: u32) -> Option<String> {
    let start = NaiveTime::parse_from_str(start_time, "%H:%M").ok()?;
    let (end, _) = start.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
    Some(end.format("%H:%M").to_string())
}

#[derive(Clone)]
pub struct OperationsService {
    store: RecordStore,
}

impl OperationsService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    // ---
    // PROCEDIMENTOS
    // ---

    pub async fn list_procedures(&self) -> Vec<Procedure> {
        let mut procedures = self.store.find_all::<Procedure>().await;
        procedures.sort_by(|a, b| a.name.cmp(&b.name));
        procedures
    }

    pub async fn create_procedure(
        &self,
        payload: CreateProcedurePayload,
    ) -> Result<Procedure, AppError> {
        self.ensure_unique_name(&payload.name, None).await?;

        let procedure = self
            .store
            .create::<Procedure>(NewProcedure {
                name: payload.name,
                description: payload.description,
                duration: payload.duration,
                price: payload.price,
                category: payload.category,
                active: payload.active.unwrap_or(true),
            })
            .await;

        tracing::info!("💆 Procedimento criado: {} ({} min)", procedure.name, procedure.duration);
        Ok(procedure)
    }

    pub async fn update_procedure(
        &self,
        id: &str,
        payload: UpdateProcedurePayload,
    ) -> Result<Procedure, AppError> {
        if self.store.find_by_id::<Procedure>(id).await.is_none() {
            return Err(AppError::ProcedureNotFound);
        }
        if let Some(name) = &payload.name {
            self.ensure_unique_name(name, Some(id)).await?;
        }

        self.store
            .update::<Procedure>(id, ProcedurePatch::from(payload))
            .await
            .ok_or(AppError::ProcedureNotFound)
    }

    /// Procedimento usado em agendamentos ou tratamentos é apenas desativado.
    pub async fn delete_procedure(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        let procedure = self
            .store
            .find_by_id::<Procedure>(id)
            .await
            .ok_or(AppError::ProcedureNotFound)?;

        let in_appointments = self
            .store
            .find_all::<Appointment>()
            .await
            .iter()
            .any(|a| a.procedure_id == procedure.id);
        let in_treatments = self
            .store
            .find_all::<Treatment>()
            .await
            .iter()
            .any(|t| t.procedure_id == procedure.id);

        if in_appointments || in_treatments {
            let patch = ProcedurePatch {
                active: Some(false),
                ..Default::default()
            };
            self.store.update::<Procedure>(id, patch).await;
            tracing::warn!("⚠️ Procedimento {} em uso, apenas desativado", procedure.name);
            return Ok(DeleteOutcome::Deactivated);
        }

        self.store.delete::<Procedure>(id).await;
        tracing::info!("🗑️ Procedimento {} excluído", procedure.name);
        Ok(DeleteOutcome::Deleted)
    }

    // Nome único entre os procedimentos ativos
    async fn ensure_unique_name(&self, name: &str, except_id: Option<&str>) -> Result<(), AppError> {
        let taken = self
            .store
            .find_all::<Procedure>()
            .await
            .iter()
            .any(|p| p.active && p.name == name && Some(p.id.as_str()) != except_id);

        if taken {
            return Err(AppError::DuplicateProcedureName(name.to_string()));
        }
        Ok(())
    }

    // ---
    // AGENDAMENTOS
    // ---

    /// Agendamentos do dia/status pedidos, por data e horário de início.
    /// `status=all` (ou ausente) não filtra.
    pub async fn list_appointments(&self, filter: AppointmentFilter) -> Vec<AppointmentDetail> {
        let status = filter
            .status
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "all");

        let mut appointments: Vec<Appointment> = self
            .store
            .find_all::<Appointment>()
            .await
            .into_iter()
            .filter(|a| filter.date.is_none_or(|date| a.date == date))
            .filter(|a| status.is_none_or(|s| a.status.to_string() == s))
            .collect();

        appointments.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });

        Appointment::populate(&self.store, appointments).await
    }

    pub async fn get_appointment(&self, id: &str) -> Result<AppointmentDetail, AppError> {
        self.store
            .find_by_id_populated::<Appointment>(id)
            .await
            .ok_or(AppError::AppointmentNotFound)
    }

    pub async fn create_appointment(
        &self,
        payload: CreateAppointmentPayload,
        caller_id: &str,
    ) -> Result<AppointmentDetail, AppError> {
        let computed = self
            .end_time_for(&payload.procedure_id, &payload.start_time)
            .await;
        let end_time = computed
            .or(payload.end_time)
            .unwrap_or_else(|| payload.start_time.clone());

        let appointment = self
            .store
            .create::<Appointment>(NewAppointment {
                patient_id: payload.patient_id,
                procedure_id: payload.procedure_id,
                user_id: payload.user_id.unwrap_or_else(|| caller_id.to_string()),
                date: payload.date,
                start_time: payload.start_time,
                end_time,
                status: payload.status.unwrap_or(AppointmentStatus::Scheduled),
                notes: payload.notes,
            })
            .await;

        tracing::info!(
            "📅 Agendamento criado para {} às {}-{}",
            appointment.date,
            appointment.start_time,
            appointment.end_time
        );
        self.appointment_detail(appointment).await
    }

    /// Atualização parcial. Trocar início ou procedimento recalcula o término,
    /// a não ser que ele venha no payload.
    pub async fn update_appointment(
        &self,
        id: &str,
        payload: UpdateAppointmentPayload,
    ) -> Result<AppointmentDetail, AppError> {
        let current = self
            .store
            .find_by_id::<Appointment>(id)
            .await
            .ok_or(AppError::AppointmentNotFound)?;

        if let Some(next) = payload.status {
            ensure_transition(current.status, next)?;
        }

        let mut end_time = payload.end_time;
        if end_time.is_none() && (payload.start_time.is_some() || payload.procedure_id.is_some()) {
            let procedure_id = payload.procedure_id.as_deref().unwrap_or(&current.procedure_id);
            let start_time = payload.start_time.as_deref().unwrap_or(&current.start_time);
            end_time = self.end_time_for(procedure_id, start_time).await;
        }

        let patch = AppointmentPatch {
            patient_id: payload.patient_id,
            procedure_id: payload.procedure_id,
            user_id: payload.user_id,
            date: payload.date,
            start_time: payload.start_time,
            end_time,
            status: payload.status,
            notes: payload.notes,
        };

        let appointment = self
            .store
            .update::<Appointment>(id, patch)
            .await
            .ok_or(AppError::AppointmentNotFound)?;
        self.appointment_detail(appointment).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<AppointmentDetail, AppError> {
        let current = self
            .store
            .find_by_id::<Appointment>(id)
            .await
            .ok_or(AppError::AppointmentNotFound)?;

        ensure_transition(current.status, status)?;

        let patch = AppointmentPatch {
            status: Some(status),
            ..Default::default()
        };
        let appointment = self
            .store
            .update::<Appointment>(id, patch)
            .await
            .ok_or(AppError::AppointmentNotFound)?;

        tracing::info!("🔄 Agendamento {}: {} -> {}", id, current.status, status);
        self.appointment_detail(appointment).await
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete::<Appointment>(id).await {
            return Err(AppError::AppointmentNotFound);
        }
        tracing::info!("🗑️ Agendamento {} excluído", id);
        Ok(())
    }

    async fn end_time_for(&self, procedure_id: &str, start_time: &str) -> Option<String> {
        let procedure = self.store.find_by_id::<Procedure>(procedure_id).await?;
        compute_end_time(start_time, procedure.duration)
    }

    async fn appointment_detail(
        &self,
        appointment: Appointment,
    ) -> Result<AppointmentDetail, AppError> {
        Appointment::populate(&self.store, vec![appointment])
            .await
            .pop()
            .ok_or(AppError::AppointmentNotFound)
    }

    // ---
    // TRATAMENTOS
    // ---

    /// Tratamentos mais recentes primeiro.
    pub async fn list_treatments(&self) -> Vec<TreatmentDetail> {
        let mut treatments = self.store.find_all_populated::<Treatment>().await;
        treatments.sort_by(|a, b| b.treatment.date.cmp(&a.treatment.date));
        treatments
    }

    pub async fn create_treatment(
        &self,
        payload: CreateTreatmentPayload,
        caller_id: &str,
    ) -> Result<TreatmentDetail, AppError> {
        let treatment = self
            .store
            .create::<Treatment>(NewTreatment {
                patient_id: payload.patient_id,
                procedure_id: payload.procedure_id,
                user_id: payload.user_id.unwrap_or_else(|| caller_id.to_string()),
                date: payload.date,
                price: payload.price,
                discount: payload.discount,
                total_paid: payload.total_paid,
                payment_method: payload.payment_method,
                observations: payload.observations,
            })
            .await;

        tracing::info!("✨ Tratamento registrado em {} ({})", treatment.date, treatment.total_paid);
        Treatment::populate(&self.store, vec![treatment])
            .await
            .pop()
            .ok_or(AppError::TreatmentNotFound)
    }

    pub async fn delete_treatment(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete::<Treatment>(id).await {
            return Err(AppError::TreatmentNotFound);
        }
        Ok(())
    }
}

fn ensure_transition(from: AppointmentStatus, to: AppointmentStatus) -> Result<(), AppError> {
    if !from.can_transition_to(to) {
        tracing::warn!("⛔ Transição de status recusada: {} -> {}", from, to);
        return Err(AppError::InvalidStatusTransition { from, to });
    }
    Ok(())
}
