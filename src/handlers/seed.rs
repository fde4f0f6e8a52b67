// src/handlers/seed.rs

use axum::{extract::State, Json};
use chrono::Local;
use serde_json::{json, Value};

use crate::{common::error::ApiError, config::AppState, middleware::i18n::Locale};

pub async fn seed(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Value>, ApiError> {
    let seeded = app_state
        .seed_service
        .seed(Local::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = match (seeded, locale.is_english()) {
        (true, false) => "Dados iniciais criados com sucesso!",
        (true, true) => "Initial data created successfully!",
        (false, false) => "Banco já possui dados, seed ignorado.",
        (false, true) => "Database already has data, seed skipped.",
    };

    Ok(Json(json!({ "success": true, "seeded": seeded, "message": message })))
}
