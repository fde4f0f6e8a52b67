// src/services/seed_service.rs

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::{NewUser, User, UserRole},
        crm::{NewPatient, Patient},
        inventory::{NewProduct, Product},
        operations::{Appointment, AppointmentStatus, NewAppointment, NewProcedure, Procedure},
    },
    services::{auth::AuthService, operation_service::compute_end_time},
};

#[derive(Clone)]
pub struct SeedService {
    store: RecordStore,
    auth_service: AuthService,
}

impl SeedService {
    pub fn new(store: RecordStore, auth_service: AuthService) -> Self {
        Self { store, auth_service }
    }

    /// Cria os dados iniciais se ainda não houver usuários.
    /// Retorna `false` quando o banco já tinha dados.
    pub async fn seed(&self, today: NaiveDate) -> Result<bool, AppError> {
        if !self.store.find_all::<User>().await.is_empty() {
            tracing::info!("🌱 Banco já possui dados, pulando seed...");
            return Ok(false);
        }

        tracing::info!("🌱 Criando dados iniciais...");

        // --- Usuários ---
        let users = [
            ("Administrador", "admin@clinica.com", "admin123", UserRole::Admin),
            ("Dra. Maria Silva", "maria@clinica.com", "esteticista123", UserRole::Esthetician),
            ("Ana Santos", "ana@clinica.com", "recepcao123", UserRole::Receptionist),
            ("Usuário Teste", "teste@teste.com", "123", UserRole::Admin),
        ];
        let mut esthetician_id = String::new();
        for (name, email, password, role) in users {
            let password_hash = self.auth_service.hash_password(password.to_string()).await?;
            let user = self
                .store
                .create::<User>(NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash,
                    role,
                    active: true,
                })
                .await;
            if role == UserRole::Esthetician {
                esthetician_id = user.id;
            }
        }

        // --- Procedimentos ---
        let procedures = [
            ("Limpeza de Pele", "Limpeza profunda da pele com extração de cravos", 60, 80, "Facial"),
            ("Microagulhamento", "Tratamento com microagulhas para renovação celular", 90, 150, "Facial"),
            ("Drenagem Linfática", "Massagem para redução de inchaço e melhora da circulação", 60, 100, "Corporal"),
            ("Peeling Químico", "Renovação celular com ácidos", 45, 120, "Facial"),
            ("Massagem Relaxante", "Massagem corporal para relaxamento", 90, 140, "Corporal"),
        ];
        let mut created_procedures = Vec::new();
        for (name, description, duration, price, category) in procedures {
            let procedure = self
                .store
                .create::<Procedure>(NewProcedure {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    duration,
                    price: Decimal::from(price),
                    category: category.to_string(),
                    active: true,
                })
                .await;
            created_procedures.push(procedure);
        }

        // --- Produtos ---
        let products = [
            ("Sérum Vitamina C", "SkinCare Pro", "Séruns", "ml", 25, 45, 5, 20),
            ("Máscara de Argila", "Natural Beauty", "Máscaras", "unidade", 12, 25, 10, 30),
        ];
        for (name, brand, category, unit, cost, sale, min, current) in products {
            self.store
                .create::<Product>(NewProduct {
                    name: name.to_string(),
                    brand: Some(brand.to_string()),
                    category: category.to_string(),
                    unit: unit.to_string(),
                    cost_price: Decimal::from(cost),
                    sale_price: Some(Decimal::from(sale)),
                    min_stock: Decimal::from(min),
                    current_stock: Decimal::from(current),
                    active: true,
                })
                .await;
        }

        // --- Pacientes ---
        let patients = [
            ("João Silva", "joao@email.com", "(11) 99999-1111", "123.456.789-00", (1990, 5, 15), "Rua das Flores, 123", "Centro", "01234-567", Some("Pele sensível")),
            ("Maria Oliveira", "maria@email.com", "(11) 99999-2222", "987.654.321-00", (1985, 8, 20), "Av. Paulista, 456", "Bela Vista", "01310-100", None),
            ("Ana Costa", "ana.costa@email.com", "(11) 99999-3333", "456.789.123-00", (1992, 12, 10), "Rua Augusta, 789", "Consolação", "01305-000", Some("Primeira consulta")),
            ("Carlos Santos", "carlos@email.com", "(11) 99999-4444", "789.123.456-00", (1988, 3, 25), "Rua da Liberdade, 321", "Liberdade", "01503-000", None),
        ];
        let mut created_patients = Vec::new();
        for (name, email, phone, cpf, (y, m, d), address, neighborhood, zip_code, observations) in patients {
            let patient = self
                .store
                .create::<Patient>(NewPatient {
                    name: name.to_string(),
                    email: Some(email.to_string()),
                    phone: phone.to_string(),
                    cpf: Some(cpf.to_string()),
                    birth_date: NaiveDate::from_ymd_opt(y, m, d),
                    address: Some(address.to_string()),
                    neighborhood: Some(neighborhood.to_string()),
                    city: Some("São Paulo".to_string()),
                    state: Some("SP".to_string()),
                    zip_code: Some(zip_code.to_string()),
                    observations: observations.map(str::to_string),
                    active: true,
                })
                .await;
            created_patients.push(patient);
        }

        // --- Agendamentos: hoje, amanhã e semana que vem ---
        let agenda = [
            (0, 0, 0, "09:00", AppointmentStatus::Confirmed, "Primeira sessão de limpeza"),
            (1, 1, 1, "14:00", AppointmentStatus::Scheduled, "Sessão de microagulhamento facial"),
            (2, 2, 7, "10:00", AppointmentStatus::Scheduled, "Primeira consulta - drenagem"),
        ];
        for (patient_idx, procedure_idx, days_ahead, start_time, status, notes) in agenda {
            let (Some(patient), Some(procedure)) =
                (created_patients.get(patient_idx), created_procedures.get(procedure_idx))
            else {
                continue;
            };
            let date = today.checked_add_days(Days::new(days_ahead)).unwrap_or(today);
            let end_time = compute_end_time(start_time, procedure.duration)
                .unwrap_or_else(|| start_time.to_string());

            self.store
                .create::<Appointment>(NewAppointment {
                    patient_id: patient.id.clone(),
                    procedure_id: procedure.id.clone(),
                    user_id: esthetician_id.clone(),
                    date,
                    start_time: start_time.to_string(),
                    end_time,
                    status,
                    notes: Some(notes.to_string()),
                })
                .await;
        }

        tracing::info!("✅ Dados iniciais criados com sucesso!");
        tracing::info!("👤 Admin: admin@clinica.com / admin123");
        tracing::info!("👤 Esteticista: maria@clinica.com / esteticista123");
        tracing::info!("👤 Recepcionista: ana@clinica.com / recepcao123");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use std::sync::Arc;

    fn service() -> (RecordStore, SeedService) {
        let store = RecordStore::new(Arc::new(MemoryStorage::new()));
        let auth = AuthService::new(store.clone(), "segredo".to_string(), 4);
        (store.clone(), SeedService::new(store, auth))
    }

    #[tokio::test]
    async fn seeds_once() {
        let (store, seed) = service();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        assert!(seed.seed(today).await.unwrap());
        assert!(!seed.seed(today).await.unwrap());

        assert_eq!(store.find_all::<User>().await.len(), 4);
        assert_eq!(store.find_all::<Procedure>().await.len(), 5);
        assert_eq!(store.find_all::<Product>().await.len(), 2);
        assert_eq!(store.find_all::<Patient>().await.len(), 4);

        let appointments = store.find_all_populated::<Appointment>().await;
        assert_eq!(appointments.len(), 3);
        assert!(appointments.iter().all(|a| a.patient.is_some() && a.procedure.is_some()));
        assert_eq!(appointments[0].appointment.date, today);
        assert_eq!(appointments[1].appointment.end_time, "15:30");
    }
}
