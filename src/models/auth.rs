// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::db::{Collection, Patchable, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Esthetician,
    Receptionist,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Admin => "ADMIN",
            UserRole::Esthetician => "ESTHETICIAN",
            UserRole::Receptionist => "RECEPTIONIST",
        };
        f.write_str(s)
    }
}

// Usuário como fica guardado na coleção (com o hash da senha)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String, // hash bcrypt
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
    type Draft = NewUser;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewUser) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            password: draft.password_hash,
            role: draft.role,
            active: draft.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Patchable for User {
    type Patch = UserPatch;

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(hash) = patch.password_hash {
            self.password = hash;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

// Visão pública do usuário: é o que vai nas relações e nas respostas.
// Nunca expõe o hash da senha.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            active: user.active,
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // ID do usuário
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

// Criação de usuário (somente ADMIN)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
    // Redefinição de senha
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}
