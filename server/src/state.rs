//! Application state for the prediction server
//!
//! Holds the configuration and the predictor, whose classifier handle is the
//! only shared mutable resource of the service.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use leaf_disease::inference::{ClassifierHandle, DiseasePredictor, ModelLoader, Preprocessor};
use leaf_disease::{AppConfig, Result};

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: AppConfig,
    pub predictor: DiseasePredictor,
    /// Server start time
    pub started_at: Instant,
    pub started_at_utc: DateTime<Utc>,
}

impl AppState {
    /// Build the state, validating the catalog against the class index
    ///
    /// The model itself is not loaded here; `loader` runs on first use.
    pub fn new(config: AppConfig, loader: Arc<dyn ModelLoader>) -> Result<Self> {
        let (catalog, index) = config.load_catalog()?;
        let handle = ClassifierHandle::new(&config.model.path, index.len(), loader);

        let predictor = DiseasePredictor::new(
            Preprocessor::new(config.preprocessing.clone()),
            handle,
            catalog,
            index,
            config.threshold,
        )?;

        Ok(Self {
            config,
            predictor,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        })
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
