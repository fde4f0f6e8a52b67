// src/handlers/auth.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::auth::{AuthResponse, CreateUserPayload, LoginUserPayload, UpdateUserPayload, UserProfile},
};

// Handler de login
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(response))
}

// Handler da rota protegida /me
pub async fn get_me(user: AuthenticatedUser) -> Json<UserProfile> {
    Json(user.profile())
}

// ---
// Usuários
// ---

pub async fn list_users(State(app_state): State<AppState>) -> Json<Vec<UserProfile>> {
    Json(app_state.auth_service.list_users().await)
}

pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .create_user(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserProfile>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .update_user(&id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(user))
}
