//! Configuration for the target recognition pipeline.
//!
//! All thresholds are fixed heuristics tuned for a specific camera and
//! altitude setup; they are treated as configuration constants, not learned
//! values. Every structure derives serde so a run can be configured from a
//! JSON document, and every field has a default matching the tuned setup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::VisionError;

/// Which background color families are suppressed before candidate extraction.
///
/// Each family names a fixed HSV range (foliage, soil, pavement). Enabled
/// families are whited out of consideration; the flags are immutable for a
/// processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorFamilyConfig {
    /// Suppress the green (foliage) hue band.
    #[serde(default = "default_true")]
    pub green: bool,
    /// Suppress the brown (soil) hue band.
    #[serde(default = "default_true")]
    pub brown: bool,
    /// Suppress the low-saturation gray (pavement) band.
    #[serde(default = "default_true")]
    pub gray: bool,
}

impl Default for ColorFamilyConfig {
    fn default() -> Self {
        Self {
            green: true,
            brown: true,
            gray: true,
        }
    }
}

impl ColorFamilyConfig {
    /// Returns true if no family is enabled (suppression is a no-op).
    pub fn is_empty(&self) -> bool {
        !self.green && !self.brown && !self.gray
    }
}

/// Tuning for the orientation-search OCR consensus procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConsensusConfig {
    /// Minimum confidence, in [0, 100], for an accepted letter.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Half-width, in degrees, of the rolling-average window that merges
    /// detected line angles into clusters.
    #[serde(default = "default_angle_tolerance")]
    pub angle_tolerance: f64,
    /// Recognized strings rejected outright (the engine's false-positive
    /// class concentrates on "I").
    #[serde(default = "default_reject_letters")]
    pub reject_letters: HashSet<String>,
    /// Starting Hough vote threshold; decremented once per attempt until
    /// enough angle clusters appear or the search is exhausted.
    #[serde(default = "default_vote_threshold")]
    pub initial_vote_threshold: u32,
    /// Minimum number of angle clusters required before rotations are tried.
    #[serde(default = "default_min_angle_clusters")]
    pub min_angle_clusters: usize,
}

impl Default for OcrConsensusConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            angle_tolerance: default_angle_tolerance(),
            reject_letters: default_reject_letters(),
            initial_vote_threshold: default_vote_threshold(),
            min_angle_clusters: default_min_angle_clusters(),
        }
    }
}

/// Top-level configuration for a recognition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Background color families to suppress.
    #[serde(default)]
    pub color_families: ColorFamilyConfig,
    /// Minimum blob area, in pixels, for a candidate region.
    #[serde(default = "default_min_area")]
    pub min_area: f64,
    /// Maximum blob area, in pixels, for a candidate region.
    #[serde(default = "default_max_area")]
    pub max_area: f64,
    /// Number of clusters for color quantization.
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,
    /// Seed for the quantizer's random restarts; fixed so runs reproduce.
    #[serde(default = "default_kmeans_seed")]
    pub kmeans_seed: u64,
    /// OCR consensus tuning.
    #[serde(default)]
    pub ocr: OcrConsensusConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            color_families: ColorFamilyConfig::default(),
            min_area: default_min_area(),
            max_area: default_max_area(),
            cluster_count: default_cluster_count(),
            kmeans_seed: default_kmeans_seed(),
            ocr: OcrConsensusConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validates the configuration.
    ///
    /// Invalid values surface here, at pipeline build time, rather than as
    /// per-candidate failures later.
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.min_area <= 0.0 {
            return Err(VisionError::config("min_area must be positive"));
        }
        if self.max_area < self.min_area {
            return Err(VisionError::config(
                "max_area must be greater than or equal to min_area",
            ));
        }
        if self.cluster_count == 0 {
            return Err(VisionError::config("cluster_count must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.ocr.confidence_threshold) {
            return Err(VisionError::config(
                "ocr.confidence_threshold must be in [0, 100]",
            ));
        }
        if self.ocr.angle_tolerance <= 0.0 {
            return Err(VisionError::config("ocr.angle_tolerance must be positive"));
        }
        if self.ocr.initial_vote_threshold == 0 {
            return Err(VisionError::config(
                "ocr.initial_vote_threshold must be at least 1",
            ));
        }
        if self.ocr.min_angle_clusters == 0 {
            return Err(VisionError::config(
                "ocr.min_angle_clusters must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_confidence_threshold() -> f32 {
    71.0
}

fn default_angle_tolerance() -> f64 {
    5.0
}

fn default_reject_letters() -> HashSet<String> {
    HashSet::from(["I".to_string()])
}

fn default_vote_threshold() -> u32 {
    40
}

fn default_min_angle_clusters() -> usize {
    3
}

fn default_min_area() -> f64 {
    1000.0
}

fn default_max_area() -> f64 {
    20000.0
}

fn default_cluster_count() -> usize {
    5
}

fn default_kmeans_seed() -> u64 {
    0x5eed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_reject_letters() {
        let config = OcrConsensusConfig::default();
        assert!(config.reject_letters.contains("I"));
        assert_eq!(config.reject_letters.len(), 1);
    }

    #[test]
    fn test_inverted_area_bounds_rejected() {
        let config = PipelineConfig {
            min_area: 500.0,
            max_area: 100.0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cluster_count_rejected() {
        let config = PipelineConfig {
            cluster_count: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.min_area, 1000.0);
        assert_eq!(config.max_area, 20000.0);
        assert_eq!(config.cluster_count, 5);
        assert_eq!(config.ocr.confidence_threshold, 71.0);
        assert!(config.color_families.green);
    }

    #[test]
    fn test_partial_override() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"color_families": {"green": false}, "min_area": 250.0}"#)
                .unwrap();
        assert!(!config.color_families.green);
        assert!(config.color_families.brown);
        assert_eq!(config.min_area, 250.0);
    }
}
