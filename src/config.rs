//! Application configuration
//!
//! One JSON-serializable document shared by the server and the CLI client.
//! Every field has a default, so a config file only needs the keys it changes.
//! Command-line flags are applied on top by the binaries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::PREDICT_PATH;
use crate::catalog::{ClassIndex, DiseaseCatalog};
use crate::inference::{PreprocessConfig, ThresholdConfig};
use crate::model::{ModelConfig, MODEL_FILE_EXTENSION};
use crate::utils::error::{DiagnosisError, Result};

/// Default location of the serialized classifier
pub const DEFAULT_MODEL_PATH: &str = "model/model_penyakit.mpk";

/// Default port of the prediction service
pub const DEFAULT_PORT: u16 = 8000;

/// Model artifact settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Path to the `CompactRecorder` record file
    pub path: PathBuf,
    /// Load the model at startup instead of on first request
    pub preload: bool,
    pub architecture: ModelConfig,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            preload: false,
            architecture: ModelConfig::default(),
        }
    }
}

/// HTTP status used for internal (non-client, non-configuration) failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalErrorStatus {
    /// 400, the historical behavior of the endpoint
    ///
    /// Covers inference failures only. Model load problems
    /// (`ModelNotFound`, `ModelLoad`, `ClassCountMismatch`) are configuration
    /// faults and answer 500 under either policy.
    #[default]
    BadRequest,
    /// 500
    InternalServerError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPolicy {
    pub internal_status: InternalErrorStatus,
}

/// Prediction server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Full URL of the prediction endpoint
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: format!("http://localhost:{}{}", DEFAULT_PORT, PREDICT_PATH),
            timeout_secs: 30,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelSettings,
    pub preprocessing: PreprocessConfig,
    pub threshold: ThresholdConfig,
    pub errors: ErrorPolicy,
    pub server: ServerSettings,
    pub client: ClientSettings,
    /// JSON catalog replacing the built-in disease table
    pub catalog_path: Option<PathBuf>,
    /// Pin CPU math kernels to one thread for reproducible results
    pub disable_cpu_math_optimizations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            preprocessing: PreprocessConfig::default(),
            threshold: ThresholdConfig::default(),
            errors: ErrorPolicy::default(),
            server: ServerSettings::default(),
            client: ClientSettings::default(),
            catalog_path: None,
            disable_cpu_math_optimizations: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load the catalog and class index the config points at
    pub fn load_catalog(&self) -> Result<(DiseaseCatalog, ClassIndex)> {
        match &self.catalog_path {
            Some(path) => DiseaseCatalog::from_json_file(path),
            None => Ok((DiseaseCatalog::builtin(), ClassIndex::builtin())),
        }
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<()> {
        let arch = &self.model.architecture;
        arch.validate().map_err(DiagnosisError::Config)?;

        if self.preprocessing.image_size != arch.input_size {
            return Err(DiagnosisError::Config(format!(
                "preprocessing.image_size ({}) must equal model input_size ({})",
                self.preprocessing.image_size, arch.input_size
            )));
        }

        if !(0.0..=1.0).contains(&self.threshold.cutoff) {
            return Err(DiagnosisError::Config(format!(
                "threshold.cutoff must be in [0, 1], got {}",
                self.threshold.cutoff
            )));
        }

        if self.model.path.extension().and_then(|e| e.to_str()) != Some(MODEL_FILE_EXTENSION) {
            return Err(DiagnosisError::Config(format!(
                "model path {} must point at a .{} record",
                self.model.path.display(),
                MODEL_FILE_EXTENSION
            )));
        }

        if self.server.port == 0 {
            return Err(DiagnosisError::Config("server.port must be non-zero".to_string()));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(DiagnosisError::Config(
                "server.max_upload_bytes must be non-zero".to_string(),
            ));
        }

        let (_, index) = self.load_catalog()?;
        if index.len() != arch.num_classes {
            return Err(DiagnosisError::ClassCountMismatch {
                expected: index.len(),
                actual: arch.num_classes,
            });
        }

        Ok(())
    }
}
