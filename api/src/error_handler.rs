use ai_llm_service::AiLlmError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use context_window::ContextError;
use hint_protocol::OutputBody;
use request_log::RequestLogError;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::app_config::ConfigError;

/// Public application error type.
///
/// The `Display` text of request-level variants is exactly what the
/// extension shows to the student; the underlying cause is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize {what}: {detail}")]
    Init { what: &'static str, detail: String },

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request checks ---
    #[error("Please update your extension to the latest version [here]({update_url}).")]
    VersionRejected { update_url: String },

    #[error("Invalid key.")]
    InvalidKey,

    // --- Request processing ---
    #[error("An error occurred; the HW or question number could not be determined.")]
    UnresolvableUnit(#[source] ContextError),

    #[error("An error occurred.")]
    Provider(#[source] AiLlmError),

    /// Plain-text failure for feedback and lookup routes.
    #[error("An error occurred")]
    Internal(#[source] RequestLogError),

    #[error("File not found")]
    NotFound,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::VersionRejected { .. } | AppError::InvalidKey => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Init { .. }
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::UnresolvableUnit(_)
            | AppError::Provider(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Init { .. } => "INIT_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::VersionRejected { .. } => "VERSION_REJECTED",
            AppError::InvalidKey => "AUTH_REJECTED",
            AppError::UnresolvableUnit(_) => "UNRESOLVABLE_UNIT",
            AppError::Provider(_) => "PROVIDER_FAILURE",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::NotFound => "NOT_FOUND",
        }
    }

    /// Whether the body is `{ "output": ... }` JSON rather than plain text.
    fn is_json_body(&self) -> bool {
        matches!(
            self,
            AppError::VersionRejected { .. }
                | AppError::InvalidKey
                | AppError::UnresolvableUnit(_)
                | AppError::Provider(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let cause = std::error::Error::source(&self).map(ToString::to_string);

        if status.is_server_error() {
            error!(code, cause = cause.as_deref().unwrap_or("-"), "request failed");
        } else {
            warn!(code, "request rejected");
        }

        if self.is_json_body() {
            (status, Json(OutputBody::new(self.to_string()))).into_response()
        } else {
            (status, self.to_string()).into_response()
        }
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<RequestLogError> for AppError {
    fn from(err: RequestLogError) -> Self {
        AppError::Internal(err)
    }
}
