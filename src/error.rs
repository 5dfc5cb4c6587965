use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message shown when the language model account has run out of credit
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "Insufficient language model API balance. Please top up to use this feature.";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    /// Upstream rejected the call for billing or quota reasons (HTTP 402)
    #[error("{0}")]
    QuotaExceeded(String),

    /// Model output was not the structured object we asked for
    #[error("Failed to parse upstream response: {0}")]
    UpstreamParse(String),

    #[error("Failed to generate music recommendations")]
    GenerationFailed,

    #[error("Failed to search music tracks")]
    SearchFailed,

    #[error("Failed to get track details")]
    DetailsFailed,

    #[error("Failed to get related tracks")]
    RelatedFailed,

    /// Public failure for an endpoint, with an optional user-actionable detail
    #[error("{message}")]
    Pipeline {
        message: String,
        detail: Option<String>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Collapses an internal failure into the endpoint's public message.
    ///
    /// Only quota failures keep their text, as `detail`, so the client can
    /// show something actionable.
    pub fn into_public(self, message: &str) -> AppError {
        let detail = match self {
            AppError::QuotaExceeded(msg) => Some(msg),
            _ => None,
        };

        AppError::Pipeline {
            message: message.to_string(),
            detail,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Pipeline { message, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, detail)
            }
            AppError::QuotaExceeded(msg) => (StatusCode::PAYMENT_REQUIRED, msg, None),
            AppError::ExternalApi(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string(), None)
            }
            AppError::UpstreamParse(_)
            | AppError::GenerationFailed
            | AppError::SearchFailed
            | AppError::DetailsFailed
            | AppError::RelatedFailed
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None),
        };

        let body = match detail {
            Some(detail) => Json(json!({ "error": message, "detail": detail })),
            None => Json(json!({ "error": message })),
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
