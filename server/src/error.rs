//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": "..."}` with a status picked
//! from the error kind: client faults are 400 (413 for an oversized upload),
//! configuration faults are 500, internal faults follow [`InternalErrorStatus`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use leaf_disease::api::ErrorResponse;
use leaf_disease::config::InternalErrorStatus;
use leaf_disease::{DiagnosisError, ErrorKind};

#[derive(Debug, Clone)]
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

    /// Map a library error using the configured internal-error policy
    pub fn from_diagnosis(err: &DiagnosisError, policy: InternalErrorStatus) -> Self {
        let status = match err.kind() {
            ErrorKind::Client if matches!(err, DiagnosisError::UploadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ErrorKind::Client => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal => match policy {
                InternalErrorStatus::BadRequest => StatusCode::BAD_REQUEST,
                InternalErrorStatus::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        if status.is_server_error() || err.kind() == ErrorKind::Internal {
            tracing::error!("Prediction failed ({:?}): {}", err.kind(), err);
        } else {
            tracing::warn!("Rejected request: {}", err);
        }

        Self::new(status, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
