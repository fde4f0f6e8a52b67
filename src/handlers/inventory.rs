// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

// Importa os nossos extratores e erros
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ClinicalStaff, RequireRole},
    },
    models::inventory::{
        CreateProductPayload, CreateStockMovementPayload, Product, StockMovementDetail,
        UpdateProductPayload,
    },
};

// ---
// Produtos
// ---

pub async fn list_products(State(app_state): State<AppState>) -> Json<Vec<Product>> {
    Json(app_state.inventory_service.list_products().await)
}

pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .inventory_service
        .get_product(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ClinicalStaff>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let product = app_state.inventory_service.create_product(payload).await;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ClinicalStaff>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<Product>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let product = app_state
        .inventory_service
        .update_product(&id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ClinicalStaff>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .inventory_service
        .delete_product(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(json!({ "result": outcome })))
}

// ---
// Movimentações de estoque
// ---

pub async fn list_stock_movements(
    State(app_state): State<AppState>,
) -> Json<Vec<StockMovementDetail>> {
    Json(app_state.inventory_service.list_movements().await)
}

pub async fn create_stock_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<ClinicalStaff>,
    Json(payload): Json<CreateStockMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let movement = app_state
        .inventory_service
        .create_movement(payload, user.id())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(movement)))
}
