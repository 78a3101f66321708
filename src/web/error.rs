use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{LedgerError, SETUP_HINT};

#[derive(Error, Debug)]
pub enum ApiError {
    /// A ledger call failed; `context` is the message shown to the client
    /// for query failures.
    #[error("{context}: {source}")]
    Ledger {
        context: &'static str,
        source: LedgerError,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("{0}")]
    BadRequest(String),

    /// A request body, query or path that could not be decoded.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

/// Attaches a client-facing message to a failed ledger call.
pub trait LedgerContext<T> {
    fn context(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> LedgerContext<T> for Result<T, LedgerError> {
    fn context(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::Ledger { context, source })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Ledger { context, source } => match source {
                LedgerError::NotConfigured(reason) => {
                    tracing::error!(%reason, "{context}: backing store not configured");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": SETUP_HINT, "configError": true }),
                    )
                }
                LedgerError::Query(detail) => {
                    tracing::error!(%detail, "{context}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": context, "configError": false }),
                    )
                }
                LedgerError::NotFound(what) => (
                    StatusCode::NOT_FOUND,
                    json!({ "error": format!("Not found: {what}") }),
                ),
                LedgerError::Validation(message) => {
                    (StatusCode::BAD_REQUEST, json!({ "error": message }))
                }
            },
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            ApiError::InvalidPassword => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid password" }),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Rejected { status, message } => (status, json!({ "error": message })),
        };

        (status, Json(body)).into_response()
    }
}
