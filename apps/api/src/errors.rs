use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// An unrecovered pipeline failure. `message` is the only text shown to
    /// callers unless `details` were attached for a development deployment.
    #[error("{message}: {source}")]
    Generation {
        message: &'static str,
        source: PipelineError,
        details: Option<String>,
    },
}

impl AppError {
    /// Maps a pipeline failure onto the HTTP taxonomy: caller input problems
    /// are 400, everything else (a missing record included) is 500 under the
    /// route's generic message. Diagnostic details are attached only when
    /// `expose_details` is set.
    pub fn from_pipeline(err: PipelineError, message: &'static str, expose_details: bool) -> Self {
        match err {
            PipelineError::InvalidInput(msg) => AppError::Validation(msg),
            source => {
                let details = expose_details.then(|| match &source {
                    PipelineError::MalformedModelOutput { raw, .. } => {
                        format!("{source}. Raw model output: {raw}")
                    }
                    other => other.to_string(),
                });
                AppError::Generation {
                    message,
                    source,
                    details,
                }
            }
        }
    }
}

/// An unreadable or mistyped request body is caller input, not a server fault.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::Generation {
                message,
                source,
                details,
            } => {
                let code = match &source {
                    PipelineError::ModelUnavailable { status, .. } => {
                        tracing::error!("{message} (provider status {status:?}): {source}");
                        "MODEL_UNAVAILABLE"
                    }
                    PipelineError::ModelRefused { .. } => {
                        tracing::error!("{message}: {source}");
                        "MODEL_REFUSED"
                    }
                    PipelineError::MalformedModelOutput { .. } => {
                        tracing::error!("{message}: {source}");
                        "MALFORMED_MODEL_OUTPUT"
                    }
                    _ => {
                        tracing::error!("{message}: {source}");
                        "INTERNAL_ERROR"
                    }
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    message.to_string(),
                    details,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
