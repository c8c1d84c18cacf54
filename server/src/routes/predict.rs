//! Prediction endpoint

use std::time::Instant;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use leaf_disease::api::{PredictionResponse, IMAGE_FIELD, MISSING_IMAGE_MESSAGE};
use leaf_disease::DiagnosisError;

use crate::error::ApiError;
use crate::state::SharedState;

/// POST /predict/disease - Diagnose one uploaded leaf image
///
/// Expects a multipart body with an `image` field. A request that is not
/// multipart at all is treated like one without the field.
pub async fn predict_disease(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let policy = state.config.errors.internal_status;

    async move {
        let start = Instant::now();

        let Ok(multipart) = multipart else {
            let err = DiagnosisError::MissingField(MISSING_IMAGE_MESSAGE.to_string());
            return Err(ApiError::from_diagnosis(&err, policy));
        };

        let limit = state.config.server.max_upload_bytes;
        let bytes = read_image_field(multipart, limit)
            .await
            .map_err(|e| ApiError::from_diagnosis(&e, policy))?;

        let result = state
            .predictor
            .predict_bytes(bytes)
            .await
            .map_err(|e| ApiError::from_diagnosis(&e, policy))?;

        info!(
            label = %result.label,
            confidence = result.confidence,
            inference_ms = result.inference_time_ms,
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Prediction served"
        );

        Ok(Json(PredictionResponse::from(result)))
    }
    .instrument(info_span!("predict", %request_id))
    .await
}

/// Pull the bytes of the image file field out of the multipart stream
///
/// A plain text field named `image` does not count as an upload.
async fn read_image_field(
    mut multipart: Multipart,
    limit: usize,
) -> Result<Vec<u8>, DiagnosisError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| stream_error(e, limit))?
    {
        if field.name() == Some(IMAGE_FIELD) && field.file_name().is_some() {
            let bytes = field.bytes().await.map_err(|e| stream_error(e, limit))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(DiagnosisError::MissingField(MISSING_IMAGE_MESSAGE.to_string()))
}

fn stream_error(err: MultipartError, limit: usize) -> DiagnosisError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DiagnosisError::UploadTooLarge { limit }
    } else {
        DiagnosisError::InvalidRequest(err.body_text())
    }
}
