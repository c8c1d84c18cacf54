//! Prediction HTTP Client
//!
//! Client side of the front-end: uploads an image to the prediction endpoint
//! and hands back the parsed result, or the server's error text verbatim.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::api::{ErrorResponse, PredictionData, PredictionResponse, IMAGE_FIELD};
use crate::config::ClientSettings;
use crate::utils::error::{DiagnosisError, Result};

/// Prediction API client
#[derive(Debug, Clone)]
pub struct DiagnosisClient {
    endpoint: String,
    client: reqwest::Client,
}

impl DiagnosisClient {
    /// Create a client from settings
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client for a custom endpoint URL with default settings
    pub fn with_url(endpoint: &str) -> Result<Self> {
        Self::new(&ClientSettings {
            endpoint: endpoint.to_string(),
            ..ClientSettings::default()
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload an image file
    pub async fn predict_file(&self, path: &Path) -> Result<PredictionResponse> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        self.predict_bytes(bytes, &file_name).await
    }

    /// Upload raw image bytes
    pub async fn predict_bytes(&self, bytes: Vec<u8>, file_name: &str) -> Result<PredictionResponse> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DiagnosisError::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DiagnosisError::Http(format!("Invalid response: {}", e)))?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        Err(DiagnosisError::ServerRejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Render a prediction the way the interactive page shows it
pub fn render_prediction(data: &PredictionData) -> String {
    let mut output = String::new();

    output.push_str(&format!("Penyakit Terdeteksi: {}\n", data.hasil));
    output.push_str(&format!("Akurasi Keyakinan: {:.2}%\n", data.skor_kepercayaan));
    if let Some(above) = data.is_above_threshold {
        output.push_str(&format!(
            "Di atas ambang batas: {}\n",
            if above { "ya" } else { "tidak" }
        ));
    }
    output.push_str(&format!("Deskripsi: {}\n", data.deskripsi));
    output.push_str(&format!("Cara Penanganan: {}\n", data.penanganan));

    output
}
