//! Model Configuration Module
//!
//! Architecture hyperparameters needed to rebuild the classifier before its
//! trained weights are loaded into it.

use serde::{Deserialize, Serialize};

use crate::catalog::NUM_CLASSES;
use crate::IMAGE_SIZE;

/// Configuration for the MobileNet classifier architecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of output classes (15 for the bundled catalog)
    pub num_classes: usize,

    /// Input image size (width and height, assumed square)
    pub input_size: usize,

    /// Number of input channels (3 for RGB)
    pub input_channels: usize,

    /// MobileNet width multiplier (alpha)
    pub width_multiplier: f64,

    /// Dropout rate before the classifier head
    pub dropout_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_classes: NUM_CLASSES,
            input_size: IMAGE_SIZE,
            input_channels: 3,
            width_multiplier: 1.0,
            dropout_rate: 1e-3,
        }
    }
}

impl ModelConfig {
    pub fn new(num_classes: usize, input_size: usize) -> Self {
        Self {
            num_classes,
            input_size,
            ..Default::default()
        }
    }

    pub fn with_width_multiplier(mut self, alpha: f64) -> Self {
        self.width_multiplier = alpha;
        self
    }

    /// Scale a reference channel count by the width multiplier
    pub fn channels(&self, base: usize) -> usize {
        ((base as f64 * self.width_multiplier) as usize).max(1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.num_classes == 0 {
            return Err("num_classes must be greater than 0".to_string());
        }

        // Five stride-2 stages
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err("input_size must be a positive multiple of 32".to_string());
        }

        if self.input_channels == 0 {
            return Err("input_channels must be greater than 0".to_string());
        }

        if !(self.width_multiplier > 0.0 && self.width_multiplier <= 1.0) {
            return Err("width_multiplier must be in range (0.0, 1.0]".to_string());
        }

        if self.dropout_rate < 0.0 || self.dropout_rate >= 1.0 {
            return Err("dropout_rate must be in range [0.0, 1.0)".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.num_classes, 15);
        assert_eq!(config.input_size, 224);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_channels_scale_with_alpha() {
        let config = ModelConfig::default().with_width_multiplier(0.25);
        assert_eq!(config.channels(32), 8);
        assert_eq!(config.channels(1024), 256);
        assert_eq!(ModelConfig::default().channels(64), 64);
    }

    #[test]
    fn test_validation_errors() {
        assert!(ModelConfig::new(0, 224).validate().is_err());
        assert!(ModelConfig::new(15, 100).validate().is_err());
        assert!(ModelConfig::default()
            .with_width_multiplier(1.5)
            .validate()
            .is_err());
    }
}
