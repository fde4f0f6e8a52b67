// src/services/dashboard_service.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    db::RecordStore,
    models::{
        crm::Patient,
        dashboard::DashboardStats,
        inventory::Product,
        operations::{Appointment, AppointmentStatus, Procedure, Treatment},
    },
};

#[derive(Clone)]
pub struct DashboardService {
    store: RecordStore,
}

impl DashboardService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Indicadores do painel. `today` define o dia e o mês de referência.
    pub async fn get_stats(&self, today: NaiveDate) -> DashboardStats {
        let patients = self.store.find_all::<Patient>().await;
        let appointments = self.store.find_all::<Appointment>().await;
        let treatments = self.store.find_all::<Treatment>().await;
        let procedures = self.store.find_all::<Procedure>().await;
        let products = self.store.find_all::<Product>().await;

        let same_month = |date: NaiveDate| date.year() == today.year() && date.month() == today.month();

        let monthly_revenue = treatments
            .iter()
            .filter(|t| same_month(t.date))
            .map(|t| t.total_paid)
            .sum::<Decimal>();

        DashboardStats {
            total_patients: patients.iter().filter(|p| p.active).count(),
            appointments_today: appointments.iter().filter(|a| a.date == today).count(),
            monthly_revenue,
            active_procedures: procedures.iter().filter(|p| p.active).count(),
            pending_appointments: appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Scheduled)
                .count(),
            treatments_performed: treatments.len(),
            low_stock_products: products
                .iter()
                .filter(|p| p.active && p.is_low_stock())
                .count(),
        }
    }
}
