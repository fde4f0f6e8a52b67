// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::{
    db::ImportError,
    middleware::i18n::Locale,
    models::operations::AppointmentStatus,
};

// Taxonomia de erros da aplicação.
// "Não encontrado" nunca sai do store como erro: os services convertem o
// `None`/`false` do store nas variantes *NotFound abaixo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Paciente não encontrado")]
    PatientNotFound,

    #[error("Procedimento não encontrado")]
    ProcedureNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Agendamento não encontrado")]
    AppointmentNotFound,

    #[error("Tratamento não encontrado")]
    TreatmentNotFound,

    #[error("Lançamento financeiro não encontrado")]
    FinancialRecordNotFound,

    #[error("Procedimento duplicado: {0}")]
    DuplicateProcedureName(String),

    #[error("Estoque insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientStock { available: Decimal, requested: Decimal },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Importação inválida: {0}")]
    InvalidImport(#[from] ImportError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Corpo de erro devolvido ao cliente, já traduzido.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InsufficientStock { .. }
            | AppError::InvalidImport(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::DuplicateProcedureName(_)
            | AppError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::PatientNotFound
            | AppError::ProcedureNotFound
            | AppError::ProductNotFound
            | AppError::AppointmentNotFound
            | AppError::TreatmentNotFound
            | AppError::FinancialRecordNotFound => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::BcryptError(_) | AppError::JwtError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte o erro em uma resposta no idioma pedido pelo cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        let status = self.status();

        let error = match self {
            AppError::ValidationError(_) => pick(en, "Um ou mais campos são inválidos.", "One or more fields are invalid."),
            AppError::EmailAlreadyExists => pick(en, "Este e-mail já está em uso.", "This e-mail is already in use."),
            AppError::InvalidCredentials => pick(en, "E-mail ou senha inválidos.", "Invalid e-mail or password."),
            AppError::InvalidToken => pick(en, "Não autorizado.", "Unauthorized."),
            AppError::Forbidden => pick(en, "Acesso negado.", "Access denied."),
            AppError::UserNotFound => pick(en, "Usuário não encontrado.", "User not found."),
            AppError::PatientNotFound => pick(en, "Paciente não encontrado.", "Patient not found."),
            AppError::ProcedureNotFound => pick(en, "Procedimento não encontrado.", "Procedure not found."),
            AppError::ProductNotFound => pick(en, "Produto não encontrado.", "Product not found."),
            AppError::AppointmentNotFound => pick(en, "Agendamento não encontrado.", "Appointment not found."),
            AppError::TreatmentNotFound => pick(en, "Tratamento não encontrado.", "Treatment not found."),
            AppError::FinancialRecordNotFound => pick(en, "Lançamento financeiro não encontrado.", "Financial record not found."),
            AppError::DuplicateProcedureName(name) => if en {
                format!("A procedure named '{}' already exists.", name)
            } else {
                format!("Já existe um procedimento com o nome '{}'.", name)
            },
            AppError::InsufficientStock { available, requested } => if en {
                format!("Insufficient stock: {} available, {} requested.", available, requested)
            } else {
                format!("Quantidade insuficiente em estoque: {} disponível, {} solicitado.", available, requested)
            },
            AppError::InvalidStatusTransition { from, to } => if en {
                format!("An appointment cannot go from {} to {}.", from, to)
            } else {
                format!("Um agendamento não pode passar de {} para {}.", from, to)
            },
            AppError::InvalidImport(e) => if en {
                format!("Invalid backup file: {}", e)
            } else {
                format!("Arquivo de backup inválido: {}", e)
            },
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                pick(en, "Ocorreu um erro inesperado.", "An unexpected error occurred.")
            }
        };

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

fn pick(en: bool, pt: &str, english: &str) -> String {
    if en { english.to_string() } else { pt.to_string() }
}

// Retorna todos os detalhes da validação, campo a campo.
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    json!(details)
}
