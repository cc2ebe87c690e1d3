// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Registro pedido por ID que não existe
    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // Violação de UNIQUE / FOREIGN KEY / RESTRICT vinda do banco
    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Traduz violações de integridade do Postgres em `ConstraintViolation`.
    /// Qualquer outro erro segue como `DatabaseError`, sem retry.
    pub fn from_db(e: sqlx::Error, message: impl FnOnce(&str) -> String) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                let constraint = db_err.constraint().unwrap_or_default();
                return AppError::ConstraintViolation(message(constraint));
            }
        }
        e.into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
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
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", entity)),
            AppError::ConstraintViolation(message) => (StatusCode::CONFLICT, message),

            // DatabaseError e InternalServerError viram 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
