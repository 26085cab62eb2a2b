use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio, com `thiserror` para melhor ergonomia.
// A mensagem do `#[error]` é o texto de log; o texto que vai para o cliente
// sai do I18nStore via `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo multipart/JSON que nem chegou a virar payload
    #[error("Formulário ilegível: {0}")]
    InvalidForm(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Sessão válida, mas o usuário não é membro do workspace do recurso
    #[error("Não é membro do workspace")]
    Unauthorized,

    #[error("Registro não encontrado")]
    NotFound,

    #[error("Código de convite inválido")]
    InvalidInviteCode,

    #[error("Usuário já é membro do workspace")]
    AlreadyMember,

    #[error("Workspace ficaria sem membros")]
    LastMember,

    #[error("Erro no serviço de armazenamento: {0}")]
    StorageError(#[from] reqwest::Error),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// `RowNotFound` é um 404 de domínio, não um erro de infraestrutura.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::DatabaseError(other),
        }
    }
}

impl AppError {
    // Traduz o erro de domínio para o envelope de resposta, já no idioma do
    // cliente. Os erros 5xx são logados aqui, uma única vez.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: store.message(locale, "errors.validation"),
                    details: Some(details),
                };
            }
            AppError::InvalidForm(reason) => {
                tracing::debug!("Formulário rejeitado: {}", reason);
                (StatusCode::BAD_REQUEST, "errors.invalid_form")
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "errors.email_in_use"),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "errors.invalid_credentials")
            }
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "errors.invalid_token"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "errors.unauthorized"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "errors.not_found"),
            AppError::InvalidInviteCode => (StatusCode::BAD_REQUEST, "errors.invalid_invite_code"),
            AppError::AlreadyMember => (StatusCode::BAD_REQUEST, "errors.already_member"),
            AppError::LastMember => (StatusCode::BAD_REQUEST, "errors.last_member"),
            AppError::StorageError(e) => {
                tracing::error!("Erro no serviço de armazenamento: {}", e);
                (StatusCode::BAD_GATEWAY, "errors.storage")
            }
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal")
            }
        };

        ApiError {
            status,
            error: store.message(locale, key),
            details: None,
        }
    }
}

// Erro já localizado, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({ "error": self.error, "details": details })),
            None => Json(json!({ "error": self.error })),
        };
        (self.status, body).into_response()
    }
}

// Caminhos que não passam pelo extrator de Locale (middleware de auth,
// rejeições de extratores) respondem no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::new())
            .into_response()
    }
}
