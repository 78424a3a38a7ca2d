//! Error types for the target recognition pipeline.
//!
//! This module defines the error taxonomy used across the pipeline: fatal
//! per-image errors (unreadable input, malformed buffers), recoverable
//! per-candidate errors that map to well-defined fallbacks, and
//! configuration errors raised at build time.

use thiserror::Error;

/// Enum representing different stages of processing in the recognition pipeline.
///
/// This enum is used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while suppressing color families.
    ColorSuppression,
    /// Error occurred while extracting candidate regions.
    BlobExtraction,
    /// Error occurred during color quantization.
    Segmentation,
    /// Error occurred during edge or line detection.
    LineDetection,
    /// Error occurred during character recognition.
    Recognition,
    /// Error occurred during shape analysis.
    ShapeAnalysis,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::ColorSuppression => write!(f, "color suppression"),
            ProcessingStage::BlobExtraction => write!(f, "blob extraction"),
            ProcessingStage::Segmentation => write!(f, "segmentation"),
            ProcessingStage::LineDetection => write!(f, "line detection"),
            ProcessingStage::Recognition => write!(f, "recognition"),
            ProcessingStage::ShapeAnalysis => write!(f, "shape analysis"),
        }
    }
}

/// Enum representing the errors that can occur in the recognition pipeline.
#[derive(Error, Debug)]
pub enum VisionError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during a processing stage.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the OCR engine.
    #[error("ocr engine")]
    Ocr(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl VisionError {
    /// Creates a VisionError for a failed processing stage.
    pub fn processing<E>(stage: ProcessingStage, context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        VisionError::Processing {
            stage,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a VisionError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        VisionError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a VisionError for a configuration problem.
    pub fn config(message: impl Into<String>) -> Self {
        VisionError::Config {
            message: message.into(),
        }
    }

    /// Creates a VisionError wrapping an OCR engine failure.
    pub fn ocr<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        VisionError::Ocr(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_error_display() {
        let err = VisionError::processing(
            ProcessingStage::LineDetection,
            "vote threshold exhausted",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert_eq!(
            err.to_string(),
            "line detection failed: vote threshold exhausted"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = VisionError::config("min_area must be positive");
        assert_eq!(err.to_string(), "configuration: min_area must be positive");
    }
}
