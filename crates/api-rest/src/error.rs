//! Mapping core errors onto HTTP responses.
//!
//! Denials carry structured reason text; storage failures return a generic
//! message while the detail goes to the log. Responses never include stack
//! traces or patient field values.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pdg_core::DisclosureError;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON error body returned for every failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP-facing error wrapper.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<DisclosureError> for ApiError {
    fn from(error: DisclosureError) -> Self {
        match &error {
            DisclosureError::AuthorizationDenied { .. } => {
                Self::forbidden("Your role does not permit access for this purpose")
            }
            DisclosureError::ConsentDenied(reason) => {
                Self::forbidden(format!("Consent verification failed: {reason}"))
            }
            DisclosureError::PatientNotFound => Self::not_found("Patient not found"),
            DisclosureError::ConsentNotFound => Self::not_found("Consent record not found"),
            DisclosureError::Storage(_) | DisclosureError::AuditUnrecorded(_) => {
                tracing::error!(%error, "storage failure while serving request");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
