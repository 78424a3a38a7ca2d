//! Core plumbing: configuration and error handling.

pub mod config;
pub mod errors;

pub use config::{ColorFamilyConfig, OcrConsensusConfig, PipelineConfig};
pub use errors::{ProcessingStage, VisionError};
