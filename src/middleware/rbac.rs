// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O Trait que define quais papéis podem passar
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Extrai Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

        // B. Confere o papel
        if !T::allowed().contains(&user.0.role) {
            tracing::warn!("⛔ {} ({}) sem permissão para {}", user.0.email, user.0.role, parts.uri.path());
            return Err(AppError::Forbidden.to_api_error(&locale));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

// Quem mexe em catálogo e estoque
pub struct ClinicalStaff;
impl RoleDef for ClinicalStaff {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin, UserRole::Esthetician] }
}

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin] }
}
