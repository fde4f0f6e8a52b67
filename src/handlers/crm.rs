// src/handlers/crm.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::crm::{CreatePatientPayload, Patient, UpdatePatientPayload},
};

// ---
// Pacientes
// ---

pub async fn list_patients(State(app_state): State<AppState>) -> Json<Vec<Patient>> {
    Json(app_state.crm_service.list_patients().await)
}

pub async fn get_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = app_state
        .crm_service
        .get_patient(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(patient))
}

pub async fn create_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreatePatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let patient = app_state.crm_service.create_patient(payload).await;

    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn update_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePatientPayload>,
) -> Result<Json<Patient>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let patient = app_state
        .crm_service
        .update_patient(&id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(patient))
}

pub async fn delete_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .crm_service
        .delete_patient(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(json!({ "result": outcome })))
}
