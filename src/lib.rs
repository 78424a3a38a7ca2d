//! # aerospot
//!
//! Extracts candidate objects from aerial-style photographs and classifies
//! each by shape, two dominant colors, and an embedded alphanumeric
//! character read via OCR.
//!
//! ## Pipeline
//!
//! 1. **Color suppression** - enabled background families (foliage, soil,
//!    pavement) are blacked out of the image.
//! 2. **Candidate extraction** - blob detection over the resulting binary
//!    mask proposes square crops from the original image.
//! 3. **Color segmentation** - each crop is quantized into ranked
//!    single-color masks.
//! 4. **OCR consensus** - every mask is searched across estimated stroke
//!    orientations for the most confident plausible letter.
//! 5. **Color voting and shape classification** - the suppressed crop
//!    yields the target's two dominant color names and its polygon shape.
//!
//! Candidates whose masks all fail OCR are discarded; everything else
//! becomes a [`ClassificationRecord`].
//!
//! ## Modules
//!
//! * [`core`] - configuration and error handling
//! * [`domain`] - candidate regions, outcomes and records
//! * [`processors`] - the image-processing stages
//! * [`ocr`] - the recognition seam and the orientation-search consensus
//! * [`pipeline`] - batch orchestration and statistics
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use aerospot::{PipelineConfig, TargetPipeline, TessCharRecognizer};
//!
//! # fn main() -> Result<(), aerospot::VisionError> {
//! let pipeline = TargetPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .recognizer_factory(TessCharRecognizer::factory(None, "eng".to_string()))
//!     .build()?;
//!
//! let images: Vec<image::RgbImage> = Vec::new();
//! for report in pipeline.process_batch(&images) {
//!     for record in &report.records {
//!         println!("{} {} at ({}, {})", record.shape, record.letter, record.x, record.y);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod ocr;
pub mod pipeline;
pub mod processors;

pub use crate::core::config::{ColorFamilyConfig, OcrConsensusConfig, PipelineConfig};
pub use crate::core::errors::{ProcessingStage, VisionError};
pub use crate::domain::{
    BoundingBox, CandidateRegion, ClassificationRecord, ImageAnalysis, ImageReport, OcrAttempt,
    OcrOutcome, Shape,
};
pub use crate::ocr::recognizer::{CharRecognizer, RecognizerFactory, TessCharRecognizer};
pub use crate::pipeline::{PipelineStats, TargetPipeline, TargetPipelineBuilder};
