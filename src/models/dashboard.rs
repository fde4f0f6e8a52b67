// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

// Os cards do topo do painel. As chaves seguem o contrato já usado pelo front.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(rename = "totalPacientes")]
    pub total_patients: usize, // Pacientes ativos
    #[serde(rename = "agendamentosHoje")]
    pub appointments_today: usize,
    #[serde(rename = "receitaMes")]
    pub monthly_revenue: Decimal, // Soma do total pago nos tratamentos do mês
    #[serde(rename = "procedimentosAtivos")]
    pub active_procedures: usize,
    #[serde(rename = "agendamentosPendentes")]
    pub pending_appointments: usize, // Status SCHEDULED
    #[serde(rename = "tratamentosRealizados")]
    pub treatments_performed: usize,
    pub low_stock_products: usize,
}
