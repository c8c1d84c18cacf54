//! Inference Predictor Module
//!
//! Orchestrates one diagnosis: decode and preprocess the upload, fetch the
//! (lazily loaded) classifier, run a single forward pass, then map the argmax
//! onto the class index and the disease catalog.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::classifier::ClassifierHandle;
use super::preprocess::Preprocessor;
use crate::catalog::{ClassIndex, DiseaseCatalog};
use crate::utils::error::{DiagnosisError, Result};

/// Optional low-confidence flagging
///
/// Disabled by default: low-confidence predictions are returned as-is.
/// When enabled the result only carries a flag, nothing is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub enabled: bool,
    /// Probability cutoff in [0, 1]
    pub cutoff: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cutoff: 0.5,
        }
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class index
    pub class_index: usize,

    /// Predicted disease label
    pub label: String,

    /// Top probability as a percentage in [0, 100]
    pub confidence: f64,

    pub description: String,

    pub treatment: String,

    /// Set only when the threshold is enabled
    pub above_threshold: Option<bool>,

    /// Inference time in milliseconds
    pub inference_time_ms: f64,
}

/// Index and probability of the top class
///
/// Ties resolve to the lowest index. Empty or non-finite output is an
/// inference error.
pub fn top_class(probabilities: &[f32]) -> Result<(usize, f32)> {
    if let Some(bad) = probabilities.iter().find(|p| !p.is_finite()) {
        return Err(DiagnosisError::Inference(format!(
            "classifier produced a non-finite probability ({})",
            bad
        )));
    }

    probabilities
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
            Some((_, top)) if top >= p => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| DiagnosisError::Inference("classifier produced no output".to_string()))
}

/// End-to-end disease predictor
pub struct DiseasePredictor {
    preprocessor: Preprocessor,
    classifier: ClassifierHandle,
    catalog: Arc<DiseaseCatalog>,
    index: Arc<ClassIndex>,
    threshold: ThresholdConfig,
}

impl DiseasePredictor {
    /// Create a predictor, failing fast if catalog and class index disagree
    pub fn new(
        preprocessor: Preprocessor,
        classifier: ClassifierHandle,
        catalog: DiseaseCatalog,
        index: ClassIndex,
        threshold: ThresholdConfig,
    ) -> Result<Self> {
        catalog.validate(&index)?;

        Ok(Self {
            preprocessor,
            classifier,
            catalog: Arc::new(catalog),
            index: Arc::new(index),
            threshold,
        })
    }

    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.catalog
    }

    pub fn class_index(&self) -> &ClassIndex {
        &self.index
    }

    pub fn classifier(&self) -> &ClassifierHandle {
        &self.classifier
    }

    /// Diagnose one uploaded image
    ///
    /// The image is decoded before the model is touched, so corrupt uploads
    /// never trigger a model load.
    pub async fn predict_bytes(&self, bytes: Vec<u8>) -> Result<PredictionResult> {
        let preprocessor = self.preprocessor.clone();
        let tensor = tokio::task::spawn_blocking(move || preprocessor.preprocess_bytes(&bytes))
            .await
            .map_err(|e| DiagnosisError::Inference(format!("preprocessing task failed: {}", e)))??;

        let classifier = self.classifier.get().await?;

        let start = Instant::now();
        let probabilities = tokio::task::spawn_blocking(move || classifier.predict(&tensor))
            .await
            .map_err(|e| DiagnosisError::Inference(format!("inference task failed: {}", e)))??;

        self.interpret(&probabilities, start.elapsed())
    }

    /// Turn a probability vector into a catalog-backed result
    pub fn interpret(&self, probabilities: &[f32], elapsed: Duration) -> Result<PredictionResult> {
        if probabilities.len() != self.index.len() {
            return Err(DiagnosisError::ClassCountMismatch {
                expected: self.index.len(),
                actual: probabilities.len(),
            });
        }

        let (class_index, probability) = top_class(probabilities)?;
        let label = self
            .index
            .label(class_index)
            .ok_or_else(|| DiagnosisError::UnknownLabel(format!("class {}", class_index)))?;
        let record = self.catalog.lookup(label)?;

        let above_threshold = self
            .threshold
            .enabled
            .then(|| probability > self.threshold.cutoff);

        Ok(PredictionResult {
            class_index,
            label: record.name.clone(),
            confidence: (f64::from(probability) * 100.0).clamp(0.0, 100.0),
            description: record.description.clone(),
            treatment: record.treatment.clone(),
            above_threshold,
            inference_time_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use std::sync::atomic::Ordering;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use crate::inference::classifier::tests::CountingLoader;
    use crate::utils::error::ErrorKind;

    const RUST: usize = 10;

    fn rust_probabilities() -> Vec<f32> {
        let mut probs = vec![0.01; 15];
        probs[RUST] = 0.86;
        probs
    }

    fn predictor(
        model_path: &std::path::Path,
        loader: Arc<CountingLoader>,
        threshold: ThresholdConfig,
    ) -> DiseasePredictor {
        DiseasePredictor::new(
            Preprocessor::default(),
            ClassifierHandle::new(model_path, 15, loader),
            DiseaseCatalog::builtin(),
            ClassIndex::builtin(),
            threshold,
        )
        .unwrap()
    }

    fn leaf_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(120, 80, Rgb([150, 90, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_top_class() {
        assert_eq!(top_class(&[0.1, 0.7, 0.2]).unwrap(), (1, 0.7));
        assert_eq!(top_class(&[0.5, 0.5]).unwrap().0, 0);
        assert!(top_class(&[]).is_err());
        assert!(top_class(&[0.2, f32::NAN]).is_err());
    }

    #[tokio::test]
    async fn test_predict_rust() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let predictor = predictor(file.path(), loader, ThresholdConfig::default());

        let result = predictor.predict_bytes(leaf_png()).await.unwrap();
        let rust = DiseaseCatalog::builtin().lookup("RUST").unwrap().clone();

        assert_eq!(result.label, "RUST");
        assert_eq!(result.class_index, RUST);
        assert!((result.confidence - 86.0).abs() < 1e-3);
        assert_eq!(result.description, rust.description);
        assert_eq!(result.treatment, rust.treatment);
        assert_eq!(result.above_threshold, None);
    }

    #[tokio::test]
    async fn test_corrupt_image_skips_model_load() {
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let predictor = predictor(
            std::path::Path::new("/nonexistent/model.mpk"),
            loader.clone(),
            ThresholdConfig::default(),
        );

        let err = predictor.predict_bytes(b"GIF89a garbage".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
        assert!(!predictor.classifier().is_ready());
    }

    #[tokio::test]
    async fn test_missing_model_is_configuration_error() {
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let predictor = predictor(
            std::path::Path::new("/nonexistent/model.mpk"),
            loader,
            ThresholdConfig::default(),
        );

        let err = predictor.predict_bytes(leaf_png()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("/nonexistent/model.mpk"));
    }

    #[test]
    fn test_threshold_flag() {
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let enabled = ThresholdConfig {
            enabled: true,
            cutoff: 0.9,
        };
        let predictor = predictor(std::path::Path::new("unused.mpk"), loader, enabled);

        let low = predictor
            .interpret(&rust_probabilities(), Duration::ZERO)
            .unwrap();
        assert_eq!(low.label, "RUST");
        assert_eq!(low.above_threshold, Some(false));

        let mut confident = vec![0.0; 15];
        confident[3] = 0.95;
        let high = predictor.interpret(&confident, Duration::ZERO).unwrap();
        assert_eq!(high.label, "CITRUS GREENING");
        assert_eq!(high.above_threshold, Some(true));
    }

    #[test]
    fn test_every_class_maps_to_catalog() {
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let predictor = predictor(
            std::path::Path::new("unused.mpk"),
            loader,
            ThresholdConfig::default(),
        );

        for i in 0..15 {
            let mut probs = vec![0.0; 15];
            probs[i] = 1.0;
            let result = predictor.interpret(&probs, Duration::ZERO).unwrap();
            assert_eq!(predictor.class_index().label(i), Some(result.label.as_str()));
            assert!((0.0..=100.0).contains(&result.confidence));
            assert!(!result.description.is_empty());
            assert!(!result.treatment.is_empty());
        }
    }

    #[test]
    fn test_wrong_output_width() {
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let predictor = predictor(
            std::path::Path::new("unused.mpk"),
            loader,
            ThresholdConfig::default(),
        );
        assert!(predictor.interpret(&[1.0; 3], Duration::ZERO).is_err());
    }

    #[test]
    fn test_inconsistent_catalog_fails_fast() {
        let loader = Arc::new(CountingLoader::new(rust_probabilities()));
        let index = ClassIndex::new(vec!["RUST".into(), "HEALTHY".into()]).unwrap();
        let result = DiseasePredictor::new(
            Preprocessor::default(),
            ClassifierHandle::new("unused.mpk", 2, loader),
            DiseaseCatalog::builtin(),
            index,
            ThresholdConfig::default(),
        );
        assert!(result.is_err());
    }
}
