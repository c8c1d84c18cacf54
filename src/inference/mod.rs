//! Inference module for disease prediction
//!
//! This module provides:
//! - Image decoding and normalization into the classifier input tensor
//! - The classifier seam and its lazily loaded, shared handle
//! - The predictor that joins classifier output with the disease catalog

pub mod classifier;
pub mod predictor;
pub mod preprocess;

// Re-export main types for convenience
pub use classifier::{
    BurnClassifier, BurnModelLoader, Classifier, ClassifierHandle, ClassifierStatus, ModelLoader,
};
pub use predictor::{top_class, DiseasePredictor, PredictionResult, ThresholdConfig};
pub use preprocess::{ImageTensor, Normalization, PreprocessConfig, Preprocessor, ResizeFilter};
