// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{Collection, Patchable, Record};
use crate::models::{nullable, optional_calendar_date};

// --- PACIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub cpf: Option<String>,
    #[serde(default, deserialize_with = "optional_calendar_date")]
    pub birth_date: Option<NaiveDate>,

    // Endereço
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    pub observations: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPatient {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub observations: Option<String>,
    pub active: bool,
}

// `Some(None)` limpa um campo opcional; `None` mantém o valor atual.
#[derive(Debug, Clone, Default)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<String>,
    pub cpf: Option<Option<String>>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub address: Option<Option<String>>,
    pub neighborhood: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub zip_code: Option<Option<String>>,
    pub observations: Option<Option<String>>,
    pub active: Option<bool>,
}

impl Record for Patient {
    const COLLECTION: Collection = Collection::Patients;
    type Draft = NewPatient;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewPatient) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            cpf: draft.cpf,
            birth_date: draft.birth_date,
            address: draft.address,
            neighborhood: draft.neighborhood,
            city: draft.city,
            state: draft.state,
            zip_code: draft.zip_code,
            observations: draft.observations,
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

impl Patchable for Patient {
    type Patch = PatientPatch;

    fn apply(&mut self, patch: PatientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(cpf) = patch.cpf {
            self.cpf = cpf;
        }
        if let Some(birth_date) = patch.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(neighborhood) = patch.neighborhood {
            self.neighborhood = neighborhood;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(state) = patch.state {
            self.state = state;
        }
        if let Some(zip_code) = patch.zip_code {
            self.zip_code = zip_code;
        }
        if let Some(observations) = patch.observations {
            self.observations = observations;
        }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: String,
    pub cpf: Option<String>,
    #[serde(default, deserialize_with = "optional_calendar_date")]
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub observations: Option<String>,
    pub active: Option<bool>,
}

impl From<CreatePatientPayload> for NewPatient {
    fn from(payload: CreatePatientPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            cpf: payload.cpf,
            birth_date: payload.birth_date,
            address: payload.address,
            neighborhood: payload.neighborhood,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            observations: payload.observations,
            active: payload.active.unwrap_or(true),
        }
    }
}

// Campos opcionais aceitam `null` para limpar o valor.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[validate(length(min = 1, message = "O telefone não pode ficar vazio."))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cpf: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub neighborhood: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub zip_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub observations: Option<Option<String>>,
    pub active: Option<bool>,
}

impl From<UpdatePatientPayload> for PatientPatch {
    fn from(payload: UpdatePatientPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            cpf: payload.cpf,
            birth_date: payload.birth_date,
            address: payload.address,
            neighborhood: payload.neighborhood,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            observations: payload.observations,
            active: payload.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_distinguishes_null_from_absent() {
        let payload: UpdatePatientPayload =
            serde_json::from_str(r#"{ "city": null, "state": "RJ" }"#).unwrap();

        assert_eq!(payload.city, Some(None));
        assert_eq!(payload.state, Some(Some("RJ".to_string())));
        assert_eq!(payload.address, None);
    }

    #[test]
    fn phone_is_required_on_create() {
        let payload: CreatePatientPayload =
            serde_json::from_str(r#"{ "name": "Ana", "phone": "" }"#).unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }
}
