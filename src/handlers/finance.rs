// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::finance::{
        CreateFinancialRecordPayload, FinancialRecordDetail, FinancialSummary, SummaryPeriod,
    },
};

pub async fn list_financial_records(
    State(app_state): State<AppState>,
) -> Json<Vec<FinancialRecordDetail>> {
    Json(app_state.finance_service.list_records().await)
}

pub async fn create_financial_record(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateFinancialRecordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let record = app_state
        .finance_service
        .create_record(payload, user.id())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn delete_financial_record(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .finance_service
        .delete_record(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// Resumo do período (?from=YYYY-MM-DD&to=YYYY-MM-DD)
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(period): Query<SummaryPeriod>,
) -> Json<FinancialSummary> {
    Json(app_state.finance_service.summary(&period).await)
}
