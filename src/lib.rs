//! # Leaf Disease
//!
//! Plant disease diagnosis from leaf images, served over HTTP.
//!
//! ## Modules
//!
//! - `catalog`: the 15 disease labels, their class order and static descriptions
//! - `inference`: preprocessing, the lazily loaded classifier and the predictor
//! - `model`: MobileNet architecture the trained Burn record is loaded into
//! - `api`: JSON wire types of the prediction endpoint
//! - `client`: HTTP client used by the front-end
//! - `config`: JSON configuration shared by server and client
//! - `utils`: logging and error handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use leaf_disease::inference::{BurnModelLoader, ClassifierHandle, DiseasePredictor, Preprocessor};
//!
//! let config = leaf_disease::AppConfig::default();
//! let (catalog, index) = config.load_catalog()?;
//! let loader = Arc::new(BurnModelLoader::new(config.model.architecture.clone()));
//! let handle = ClassifierHandle::new(&config.model.path, index.len(), loader);
//! let predictor = DiseasePredictor::new(
//!     Preprocessor::new(config.preprocessing.clone()),
//!     handle,
//!     catalog,
//!     index,
//!     config.threshold,
//! )?;
//! let result = predictor.predict_bytes(std::fs::read("leaf.jpg")?).await?;
//! ```

pub mod api;
pub mod backend;
pub mod catalog;
pub mod client;
pub mod config;
pub mod inference;
pub mod model;
pub mod utils;

// Re-export commonly used items for convenience
pub use api::{PredictionData, PredictionResponse};
pub use catalog::{ClassIndex, DiseaseCatalog, DiseaseRecord};
pub use client::DiagnosisClient;
pub use config::AppConfig;
pub use inference::{DiseasePredictor, PredictionResult, Preprocessor};
pub use utils::error::{DiagnosisError, ErrorKind, Result};

/// Side length of the classifier input image
pub const IMAGE_SIZE: usize = 224;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
