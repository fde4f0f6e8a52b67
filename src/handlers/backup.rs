// src/handlers/backup.rs

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
};

pub async fn export_backup(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Json<Value> {
    Json(app_state.backup_service.export().await)
}

// O corpo é o próprio arquivo de backup
pub async fn import_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let imported = app_state
        .backup_service
        .import(&body)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(json!({ "success": true, "imported": imported })))
}

pub async fn clear_data(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> StatusCode {
    app_state.backup_service.clear().await;
    StatusCode::NO_CONTENT
}
