// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::auth::{
        AuthResponse, Claims, CreateUserPayload, NewUser, UpdateUserPayload, User, UserPatch,
        UserProfile,
    },
};

#[derive(Clone)]
pub struct AuthService {
    store: RecordStore,
    jwt_secret: String,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: RecordStore, jwt_secret: String, bcrypt_cost: u32) -> Self {
        Self { store, jwt_secret, bcrypt_cost }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .find_by_email(email)
            .await
            .filter(|u| u.active)
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!("🔒 Tentativa de login inválida para {}", email);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        tracing::info!("🔑 Login de {} ({})", user.email, user.role);

        Ok(AuthResponse {
            token,
            user: UserProfile::from(&user),
        })
    }

    /// Valida o JWT e devolve o usuário, que precisa continuar ativo.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.store
            .find_by_id::<User>(&token_data.claims.sub)
            .await
            .filter(|u| u.active)
            .ok_or(AppError::InvalidToken)
    }

    // ---
    // Gestão de usuários
    // ---

    /// Usuários ativos, em ordem alfabética.
    pub async fn list_users(&self) -> Vec<UserProfile> {
        let mut users: Vec<UserProfile> = self
            .store
            .find_all::<User>()
            .await
            .iter()
            .filter(|u| u.active)
            .map(UserProfile::from)
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        users
    }

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<UserProfile, AppError> {
        if self.find_by_email(&payload.email).await.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = self.hash_password(payload.password).await?;
        let user = self
            .store
            .create::<User>(NewUser {
                name: payload.name,
                email: payload.email,
                password_hash,
                role: payload.role,
                active: true,
            })
            .await;

        tracing::info!("👤 Usuário criado: {} ({})", user.email, user.role);
        Ok(UserProfile::from(&user))
    }

    pub async fn update_user(
        &self,
        id: &str,
        payload: UpdateUserPayload,
    ) -> Result<UserProfile, AppError> {
        let password_hash = match payload.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let patch = UserPatch {
            name: payload.name,
            email: None,
            password_hash,
            role: payload.role,
            active: payload.active,
        };

        self.store
            .update::<User>(id, patch)
            .await
            .map(|u| UserProfile::from(&u))
            .ok_or(AppError::UserNotFound)
    }

    // Hash em thread separado; o custo vem da configuração
    pub async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.store
            .find_all::<User>()
            .await
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::models::auth::UserRole;
    use std::sync::Arc;

    fn service() -> AuthService {
        let store = RecordStore::new(Arc::new(MemoryStorage::new()));
        AuthService::new(store, "segredo-de-teste".to_string(), 4)
    }

    fn payload(email: &str, role: UserRole) -> CreateUserPayload {
        CreateUserPayload {
            name: "Ana Santos".to_string(),
            email: email.to_string(),
            password: "recepcao123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn login_issues_a_token_that_validates_back_to_the_user() {
        let auth = service();
        let created = auth
            .create_user(payload("ana@clinica.com", UserRole::Receptionist))
            .await
            .unwrap();

        let response = auth.login_user("ana@clinica.com", "recepcao123").await.unwrap();
        assert_eq!(response.user, created);

        let user = auth.validate_token(&response.token).await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.role, UserRole::Receptionist);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_rejected() {
        let auth = service();
        auth.create_user(payload("ana@clinica.com", UserRole::Receptionist))
            .await
            .unwrap();

        assert!(matches!(
            auth.login_user("ana@clinica.com", "errada").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login_user("ninguem@clinica.com", "recepcao123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let auth = service();
        auth.create_user(payload("ana@clinica.com", UserRole::Receptionist))
            .await
            .unwrap();

        let err = auth
            .create_user(payload("ANA@clinica.com", UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn deactivated_users_lose_access() {
        let auth = service();
        let created = auth
            .create_user(payload("ana@clinica.com", UserRole::Receptionist))
            .await
            .unwrap();
        let token = auth
            .login_user("ana@clinica.com", "recepcao123")
            .await
            .unwrap()
            .token;

        auth.update_user(
            &created.id,
            UpdateUserPayload {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(matches!(auth.validate_token(&token).await, Err(AppError::InvalidToken)));
        assert!(matches!(
            auth.login_user("ana@clinica.com", "recepcao123").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(auth.list_users().await.is_empty());
    }

    #[tokio::test]
    async fn garbage_tokens_are_invalid() {
        let auth = service();
        assert!(matches!(auth.validate_token("abc.def.ghi").await, Err(AppError::InvalidToken)));
    }
}
