// src/handlers/operations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ClinicalStaff, RequireRole},
    },
    models::operations::{
        AppointmentDetail, AppointmentFilter, CreateAppointmentPayload, CreateProcedurePayload,
        CreateTreatmentPayload, Procedure, TreatmentDetail, UpdateAppointmentPayload,
        UpdateProcedurePayload, UpdateStatusPayload,
    },
};

// ---
// Procedimentos
// ---

pub async fn list_procedures(State(app_state): State<AppState>) -> Json<Vec<Procedure>> {
    Json(app_state.operations_service.list_procedures().await)
}

pub async fn create_procedure(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ClinicalStaff>,
    Json(payload): Json<CreateProcedurePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let procedure = app_state
        .operations_service
        .create_procedure(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(procedure)))
}

pub async fn update_procedure(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ClinicalStaff>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProcedurePayload>,
) -> Result<Json<Procedure>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let procedure = app_state
        .operations_service
        .update_procedure(&id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(procedure))
}

pub async fn delete_procedure(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ClinicalStaff>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .operations_service
        .delete_procedure(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(json!({ "result": outcome })))
}

// ---
// Agendamentos
// ---

pub async fn list_appointments(
    State(app_state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
) -> Json<Vec<AppointmentDetail>> {
    Json(app_state.operations_service.list_appointments(filter).await)
}

pub async fn get_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let appointment = app_state
        .operations_service
        .get_appointment(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(appointment))
}

pub async fn create_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let appointment = app_state
        .operations_service
        .create_appointment(payload, user.id())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAppointmentPayload>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let appointment = app_state
        .operations_service
        .update_appointment(&id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(appointment))
}

pub async fn update_appointment_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let appointment = app_state
        .operations_service
        .update_status(&id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(appointment))
}

pub async fn delete_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .operations_service
        .delete_appointment(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Tratamentos
// ---

pub async fn list_treatments(State(app_state): State<AppState>) -> Json<Vec<TreatmentDetail>> {
    Json(app_state.operations_service.list_treatments().await)
}

pub async fn create_treatment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTreatmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let treatment = app_state
        .operations_service
        .create_treatment(payload, user.id())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(treatment)))
}

pub async fn delete_treatment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .operations_service
        .delete_treatment(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
