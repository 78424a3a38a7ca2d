//! Pipeline orchestration.
//!
//! Wires the processing stages together: suppress background color
//! families, extract candidate regions, and classify each candidate by
//! letter, colors and shape. Images and candidates are independent, so
//! both levels fan out on the rayon worker pool; results are reassembled
//! by their original index so output order never depends on scheduling.

pub mod stats;

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::config::PipelineConfig;
use crate::core::errors::VisionError;
use crate::domain::{CandidateRegion, ClassificationRecord, ImageAnalysis, ImageReport, OcrOutcome};
use crate::ocr::consensus::identify_character;
use crate::ocr::recognizer::{CharRecognizer, RecognizerFactory};
use crate::processors::blob::{binarize_nonblack, extract_candidates, BlobColor};
use crate::processors::color_vote::{dominant_color, nearest_color_name, secondary_color};
use crate::processors::segment::segment_colors;
use crate::processors::shape::classify_shape;
use crate::processors::suppression::suppress_color_families;

pub use stats::PipelineStats;

/// The target recognition pipeline.
///
/// Holds the run configuration and a factory for per-worker OCR engines.
/// All methods take `&self`; the pipeline shares no mutable state between
/// images or candidates.
pub struct TargetPipeline {
    config: PipelineConfig,
    recognizer_factory: RecognizerFactory,
}

/// Builder for [`TargetPipeline`].
#[derive(Default)]
pub struct TargetPipelineBuilder {
    config: PipelineConfig,
    recognizer_factory: Option<RecognizerFactory>,
}

impl TargetPipelineBuilder {
    /// Sets the run configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the factory used to construct one OCR engine per worker.
    pub fn recognizer_factory(mut self, factory: RecognizerFactory) -> Self {
        self.recognizer_factory = Some(factory);
        self
    }

    /// Validates the configuration and builds the pipeline.
    pub fn build(self) -> Result<TargetPipeline, VisionError> {
        self.config.validate()?;
        let recognizer_factory = self
            .recognizer_factory
            .ok_or_else(|| VisionError::config("a recognizer factory is required"))?;
        Ok(TargetPipeline {
            config: self.config,
            recognizer_factory,
        })
    }
}

impl TargetPipeline {
    /// Returns a builder with default configuration.
    pub fn builder() -> TargetPipelineBuilder {
        TargetPipelineBuilder::default()
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes a batch of decoded images.
    ///
    /// Images fan out over the worker pool; the returned reports are
    /// ordered by input index regardless of completion order. An image
    /// that fails outright is reported with its diagnostic instead of
    /// aborting the batch.
    pub fn process_batch(&self, images: &[RgbImage]) -> Vec<ImageReport> {
        let mut reports: Vec<ImageReport> = images
            .par_iter()
            .enumerate()
            .map(|(index, image)| match self.process_image(image) {
                Ok(analysis) => ImageReport {
                    index,
                    candidates: analysis.candidates,
                    records: analysis.records,
                    error: None,
                },
                Err(err) => {
                    warn!(image = index, error = %err, "skipping image");
                    ImageReport {
                        index,
                        candidates: 0,
                        records: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            })
            .collect();
        reports.sort_by_key(|report| report.index);
        reports
    }

    /// Processes one image: suppression, candidate extraction, and
    /// per-candidate classification.
    ///
    /// Candidates are classified concurrently, each worker holding its own
    /// OCR engine, and records are restored to candidate order before
    /// returning.
    pub fn process_image(&self, image: &RgbImage) -> Result<ImageAnalysis, VisionError> {
        let suppressed = suppress_color_families(image, &self.config.color_families)?;
        let mask = binarize_nonblack(&suppressed);
        let candidates = extract_candidates(
            image,
            &mask,
            self.config.min_area,
            self.config.max_area,
            BlobColor::White,
        );
        debug!(candidates = candidates.len(), "candidate regions extracted");

        let mut classified: Vec<(usize, Option<ClassificationRecord>)> = candidates
            .par_iter()
            .enumerate()
            .map_init(
                || {
                    (self.recognizer_factory)()
                        .map_err(|err| {
                            warn!(error = %err, "failed to construct a recognizer");
                            err
                        })
                        .ok()
                },
                |recognizer, (index, candidate)| {
                    let record = match recognizer {
                        Some(engine) => self.classify_candidate(engine.as_mut(), candidate),
                        None => None,
                    };
                    (index, record)
                },
            )
            .collect();
        classified.sort_by_key(|(index, _)| *index);

        Ok(ImageAnalysis {
            candidates: candidates.len(),
            records: classified
                .into_iter()
                .filter_map(|(_, record)| record)
                .collect(),
        })
    }

    /// Classifies one candidate region.
    ///
    /// The crop is quantized into ranked color masks and each mask is
    /// offered to the OCR consensus; the highest-confidence accepted letter
    /// wins, with ties going to the earlier mask. A candidate whose masks
    /// all reject is discarded. Shape and the two dominant colors are read
    /// from the suppressed crop.
    fn classify_candidate(
        &self,
        recognizer: &mut dyn CharRecognizer,
        candidate: &CandidateRegion,
    ) -> Option<ClassificationRecord> {
        let masks = segment_colors(
            &candidate.crop,
            self.config.cluster_count,
            self.config.kmeans_seed,
        );

        let mut best: Option<(char, f32)> = None;
        for mask in &masks {
            if let OcrOutcome::Accepted { letter, confidence } =
                identify_character(mask, recognizer, &self.config.ocr)
            {
                if best.map_or(true, |(_, c)| confidence > c) {
                    best = Some((letter, confidence));
                }
            }
        }
        let Some((letter, confidence)) = best else {
            debug!(
                x = candidate.center.0,
                y = candidate.center.1,
                "no color segment produced a letter, discarding candidate"
            );
            return None;
        };

        let cleared = match suppress_color_families(&candidate.crop, &self.config.color_families) {
            Ok(cleared) => cleared,
            Err(err) => {
                debug!(error = %err, "suppression failed on candidate crop, discarding");
                return None;
            }
        };
        let silhouette = binarize_nonblack(&cleared);
        let shape = classify_shape(&silhouette);

        let primary = dominant_color(&cleared);
        let shape_color = primary.map_or("black", |c| nearest_color_name(c.0));
        let letter_color = primary
            .and_then(|c| secondary_color(&cleared, c))
            .map_or("black", |c| nearest_color_name(c.0));

        Some(ClassificationRecord {
            letter: letter.to_ascii_lowercase(),
            letter_color: letter_color.to_string(),
            shape,
            shape_color: shape_color.to_string(),
            x: candidate.center.0,
            y: candidate.center.1,
            confidence,
            segments: masks.len(),
        })
    }
}
