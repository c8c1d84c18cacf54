//! Wire types of the prediction HTTP API
//!
//! Field names are part of the public contract and stay in Indonesian.

use serde::{Deserialize, Serialize};

use crate::inference::PredictionResult;

/// Route of the prediction endpoint
pub const PREDICT_PATH: &str = "/predict/disease";

/// Multipart field carrying the image bytes
pub const IMAGE_FIELD: &str = "image";

/// Message returned with every successful prediction
pub const SUCCESS_MESSAGE: &str = "Prediksi penyakit tanaman berhasil.";

/// Error returned when the multipart body has no image field
pub const MISSING_IMAGE_MESSAGE: &str = "Data gambar tidak ditemukan";

/// Successful prediction body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub message: String,
    pub data: PredictionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionData {
    /// Predicted disease label
    pub hasil: String,

    /// Confidence percentage in [0, 100]
    #[serde(rename = "skorKepercayaan")]
    pub skor_kepercayaan: f64,

    #[serde(rename = "isAboveThreshold", default, skip_serializing_if = "Option::is_none")]
    pub is_above_threshold: Option<bool>,

    #[serde(rename = "Deskripsi")]
    pub deskripsi: String,

    #[serde(rename = "Penanganan")]
    pub penanganan: String,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            data: PredictionData {
                hasil: result.label,
                skor_kepercayaan: result.confidence,
                is_above_threshold: result.above_threshold,
                deskripsi: result.description,
                penanganan: result.treatment,
            },
        }
    }
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One entry of the disease listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEntry {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub treatment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(above_threshold: Option<bool>) -> PredictionResult {
        PredictionResult {
            class_index: 10,
            label: "RUST".to_string(),
            confidence: 91.5,
            description: "desc".to_string(),
            treatment: "treat".to_string(),
            above_threshold,
            inference_time_ms: 4.0,
        }
    }

    #[test]
    fn test_response_field_names() {
        let response = PredictionResponse::from(result(None));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["data"]["hasil"], "RUST");
        assert_eq!(json["data"]["skorKepercayaan"], 91.5);
        assert_eq!(json["data"]["Deskripsi"], "desc");
        assert_eq!(json["data"]["Penanganan"], "treat");
        assert!(json["data"].get("isAboveThreshold").is_none());
    }

    #[test]
    fn test_threshold_flag_serialized_when_present() {
        let json = serde_json::to_value(PredictionResponse::from(result(Some(true)))).unwrap();
        assert_eq!(json["data"]["isAboveThreshold"], true);
    }
}
