//! Error Handling Module
//!
//! Defines the error type shared by the catalog, preprocessing, classifier and
//! client layers. Every variant belongs to exactly one [`ErrorKind`], which the
//! HTTP layer maps onto a status code.

use std::path::PathBuf;

use thiserror::Error;

/// Who is at fault for an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing request data, corrupt images
    Client,
    /// Missing or inconsistent deployment artifacts (model file, catalog)
    Configuration,
    /// Anything else that goes wrong while serving a request
    Internal,
}

/// Main error type for plant disease diagnosis
#[derive(Error, Debug)]
pub enum DiagnosisError {
    /// A required multipart field was not present in the request
    #[error("{0}")]
    MissingField(String),

    /// Uploaded bytes could not be decoded as an image
    #[error("Gagal membaca gambar: {0}")]
    InvalidImage(String),

    /// Request could not be parsed (e.g. broken multipart body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upload exceeded the configured body limit
    #[error("Ukuran gambar melebihi batas {limit} byte")]
    UploadTooLarge { limit: usize },

    /// Model artifact does not exist at the configured path
    #[error("File model penyakit tidak ditemukan di {}", .0.display())]
    ModelNotFound(PathBuf),

    /// Model artifact exists but could not be deserialized
    #[error("Failed to load model from '{}': {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// Classifier output width does not match the class index
    #[error("Classifier has {actual} output classes but the class index lists {expected}")]
    ClassCountMismatch { expected: usize, actual: usize },

    /// A label has no catalog entry
    #[error("Unknown disease label: {0}")]
    UnknownLabel(String),

    /// Catalog or class index failed validation
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error with inference
    #[error("Inference error: {0}")]
    Inference(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport failure talking to the prediction service
    #[error("HTTP error: {0}")]
    Http(String),

    /// Prediction service answered with a non-success status
    #[error("Error: {message}")]
    ServerRejected { status: u16, message: String },
}

impl DiagnosisError {
    /// Classify the error for status-code mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiagnosisError::MissingField(_)
            | DiagnosisError::InvalidImage(_)
            | DiagnosisError::InvalidRequest(_)
            | DiagnosisError::UploadTooLarge { .. } => ErrorKind::Client,

            DiagnosisError::ModelNotFound(_)
            | DiagnosisError::ModelLoad { .. }
            | DiagnosisError::ClassCountMismatch { .. }
            | DiagnosisError::UnknownLabel(_)
            | DiagnosisError::Catalog(_)
            | DiagnosisError::Config(_) => ErrorKind::Configuration,

            DiagnosisError::Inference(_)
            | DiagnosisError::Io(_)
            | DiagnosisError::Serialization(_)
            | DiagnosisError::Http(_)
            | DiagnosisError::ServerRejected { .. } => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for DiagnosisError {
    fn from(e: serde_json::Error) -> Self {
        DiagnosisError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for DiagnosisError {
    fn from(e: reqwest::Error) -> Self {
        DiagnosisError::Http(e.to_string())
    }
}

/// Convenience Result type for diagnosis operations
pub type Result<T> = std::result::Result<T, DiagnosisError>;
