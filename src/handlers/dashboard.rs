// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use chrono::Local;

use crate::{config::AppState, models::dashboard::DashboardStats};

// Os indicadores usam o dia local do servidor como referência
pub async fn get_stats(State(app_state): State<AppState>) -> Json<DashboardStats> {
    let today = Local::now().date_naive();
    Json(app_state.dashboard_service.get_stats(today).await)
}
