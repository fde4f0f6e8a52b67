// src/models/operations.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::db::{Collection, Patchable, Record};
use crate::models::{
    auth::UserProfile, calendar_date, crm::Patient, non_negative, nullable, time_of_day,
};

// =============================================================================
//  PROCEDIMENTOS (Catálogo)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration: u32, // minutos
    pub price: Decimal,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProcedure {
    pub name: String,
    pub description: Option<String>,
    pub duration: u32,
    pub price: Decimal,
    pub category: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProcedurePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub duration: Option<u32>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl Record for Procedure {
    const COLLECTION: Collection = Collection::Procedures;
    type Draft = NewProcedure;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewProcedure) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            duration: draft.duration,
            price: draft.price,
            category: draft.category,
            active: draft.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Patchable for Procedure {
    type Patch = ProcedurePatch;

    fn apply(&mut self, patch: ProcedurePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

// =============================================================================
//  AGENDAMENTOS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// SCHEDULED -> CONFIRMED -> IN_PROGRESS -> COMPLETED.
    /// CANCELLED e NO_SHOW só a partir de SCHEDULED/CONFIRMED, e são finais.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Scheduled | Confirmed, Cancelled | NoShow)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub procedure_id: String,
    pub user_id: String,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM"
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: String,
    pub procedure_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub patient_id: Option<String>,
    pub procedure_id: Option<String>,
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<Option<String>>,
}

impl Record for Appointment {
    const COLLECTION: Collection = Collection::Appointments;
    type Draft = NewAppointment;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewAppointment) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            procedure_id: draft.procedure_id,
            user_id: draft.user_id,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            status: draft.status,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Patchable for Appointment {
    type Patch = AppointmentPatch;

    fn apply(&mut self, patch: AppointmentPatch) {
        if let Some(patient_id) = patch.patient_id {
            self.patient_id = patient_id;
        }
        if let Some(procedure_id) = patch.procedure_id {
            self.procedure_id = procedure_id;
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

// Agendamento com as relações resolvidas.
// Relações ausentes (referência quebrada) viram `null`: é um enriquecimento
// de melhor esforço, não uma garantia de integridade referencial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: Option<Patient>,
    pub procedure: Option<Procedure>,
    pub user: Option<UserProfile>,
}

// =============================================================================
//  TRATAMENTOS (Atendimentos realizados)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: String,
    pub patient_id: String,
    pub procedure_id: String,
    pub user_id: String,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub total_paid: Decimal,
    pub payment_method: String,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTreatment {
    pub patient_id: String,
    pub procedure_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub total_paid: Decimal,
    pub payment_method: String,
    pub observations: Option<String>,
}

impl Record for Treatment {
    const COLLECTION: Collection = Collection::Treatments;
    type Draft = NewTreatment;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewTreatment) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            procedure_id: draft.procedure_id,
            user_id: draft.user_id,
            date: draft.date,
            price: draft.price,
            discount: draft.discount,
            total_paid: draft.total_paid,
            payment_method: draft.payment_method,
            observations: draft.observations,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentDetail {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub patient: Option<Patient>,
    pub procedure: Option<Procedure>,
    pub user: Option<UserProfile>,
}

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcedurePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 minuto."))]
    pub duration: u32,
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProcedurePayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 minuto."))]
    pub duration: Option<u32>,
    #[validate(custom(function = "non_negative"))]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, message = "A categoria não pode ficar vazia."))]
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateProcedurePayload> for ProcedurePatch {
    fn from(payload: UpdateProcedurePayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            duration: payload.duration,
            price: payload.price,
            category: payload.category,
            active: payload.active,
        }
    }
}

// `endTime` é calculado a partir da duração do procedimento quando possível.
// `userId` ausente = usuário logado.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    #[validate(length(min = 1, message = "O paciente é obrigatório."))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "O procedimento é obrigatório."))]
    pub procedure_id: String,
    pub user_id: Option<String>,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    #[validate(custom(function = "time_of_day"))]
    pub start_time: String,
    #[validate(custom(function = "time_of_day"))]
    pub end_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentPayload {
    pub patient_id: Option<String>,
    pub procedure_id: Option<String>,
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(custom(function = "time_of_day"))]
    pub start_time: Option<String>,
    #[validate(custom(function = "time_of_day"))]
    pub end_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: AppointmentStatus,
}

// Filtros da listagem: `date=YYYY-MM-DD`, `status=<STATUS>|all`
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentPayload {
    #[validate(length(min = 1, message = "O paciente é obrigatório."))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "O procedimento é obrigatório."))]
    pub procedure_id: String,
    pub user_id: Option<String>,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub discount: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub total_paid: Decimal,
    #[validate(length(min = 1, message = "A forma de pagamento é obrigatória."))]
    pub payment_method: String,
    pub observations: Option<String>,
}
