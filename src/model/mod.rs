//! Model module for the classifier architecture using the Burn framework
//!
//! This module provides:
//! - The MobileNet v1 architecture the disease weights are loaded into
//! - Model configuration and validation
//!
//! Training is out of scope. The weights are an external artifact saved with
//! Burn's `CompactRecorder`.

pub mod config;
pub mod mobilenet;

// Re-export main types for convenience
pub use config::ModelConfig;
pub use mobilenet::MobileNet;

/// File extension of Burn `CompactRecorder` records
pub const MODEL_FILE_EXTENSION: &str = "mpk";
