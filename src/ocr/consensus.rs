//! Orientation-search OCR consensus.
//!
//! A color mask carries the candidate character at an arbitrary rotation.
//! The engine estimates the dominant stroke orientations from detected
//! lines, generates rotated variants of the binarized mask for each
//! orientation, runs single-character OCR on every variant and keeps the
//! most confident plausible letter. Anything that goes wrong along the way
//! collapses to [`OcrOutcome::Rejected`]; the consensus never aborts the
//! surrounding pipeline.

use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};
use tracing::debug;

use crate::core::config::OcrConsensusConfig;
use crate::domain::OcrOutcome;
use crate::ocr::recognizer::CharRecognizer;

/// Rotation offsets, in degrees, applied to each estimated orientation.
///
/// The last offset is 260, not 270. The asymmetry affects which
/// orientation wins confidence ties and is kept deliberately; see
/// DESIGN.md before touching it.
const ROTATION_OFFSETS: [f64; 4] = [0.0, 90.0, 180.0, 260.0];

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 200.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Recolors the mask for recognition: the background stays white, any
/// foreground (non-white) pixel becomes black.
fn binarize_foreground(mask: &RgbImage) -> RgbImage {
    let mut out = mask.clone();
    for pixel in out.pixels_mut() {
        if *pixel != WHITE {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    out
}

/// Direction angle, in degrees, of a polar-form line.
fn line_direction_degrees(line: &PolarLine) -> f64 {
    let theta = f64::from(line.angle_in_degrees).to_radians();
    theta.cos().atan2(-theta.sin()).to_degrees()
}

/// Merges sorted angles into clusters with a rolling average.
///
/// An angle within `tolerance` of the running average joins the current
/// cluster and pulls the average toward itself; anything else closes the
/// cluster and starts a new one. A cluster opened by the final angle is
/// dropped, matching the long-standing behavior the rotation search was
/// tuned against.
fn merge_angle_clusters(sorted_angles: &[f64], tolerance: f64) -> Vec<f64> {
    let mut clusters = Vec::new();
    let Some(&first) = sorted_angles.first() else {
        return clusters;
    };
    let mut avg = first;
    for (n, &angle) in sorted_angles.iter().enumerate() {
        if angle < avg + tolerance && angle > avg - tolerance {
            avg = (avg + angle) / 2.0;
            if n + 1 == sorted_angles.len() {
                clusters.push(avg);
            }
        } else {
            clusters.push(avg);
            avg = angle;
        }
    }
    clusters
}

/// Searches for dominant line orientations in the edge image.
///
/// Starts at a high Hough vote threshold and decrements it until enough
/// angle clusters are found. Returns `None` when the threshold is
/// exhausted, which the caller treats as "no lines found".
fn find_angle_clusters(edges: &GrayImage, config: &OcrConsensusConfig) -> Option<Vec<f64>> {
    let mut vote_threshold = config.initial_vote_threshold;
    while vote_threshold > 0 {
        let lines = detect_lines(
            edges,
            LineDetectionOptions {
                vote_threshold,
                suppression_radius: 0,
            },
        );
        vote_threshold -= 1;
        if lines.is_empty() {
            continue;
        }

        let mut angles: Vec<f64> = lines.iter().map(line_direction_degrees).collect();
        angles.sort_by(|a, b| a.total_cmp(b));
        let clusters = merge_angle_clusters(&angles, config.angle_tolerance);
        if clusters.len() >= config.min_angle_clusters {
            return Some(clusters);
        }
    }
    None
}

/// Rotates the image about its center, filling uncovered areas with white.
fn rotate_white(image: &RgbImage, degrees: f64) -> RgbImage {
    rotate_about_center(
        image,
        degrees.to_radians() as f32,
        Interpolation::Bicubic,
        WHITE,
    )
}

/// Runs the consensus procedure on one color mask.
///
/// Returns the best accepted letter with its confidence, or
/// [`OcrOutcome::Rejected`] when no rotation produced a plausible letter
/// above the confidence threshold.
pub fn identify_character(
    mask: &RgbImage,
    recognizer: &mut dyn CharRecognizer,
    config: &OcrConsensusConfig,
) -> OcrOutcome {
    if mask.width() == 0 || mask.height() == 0 {
        return OcrOutcome::Rejected;
    }

    let binary = binarize_foreground(mask);
    let edges = canny(&imageops::grayscale(&binary), CANNY_LOW, CANNY_HIGH);

    let Some(cluster_angles) = find_angle_clusters(&edges, config) else {
        debug!("line search exhausted, rejecting mask");
        return OcrOutcome::Rejected;
    };

    let mut best: Option<(String, f32)> = None;
    for angle in &cluster_angles {
        for offset in ROTATION_OFFSETS {
            let rotated = rotate_white(&binary, angle + offset);
            let attempts = match recognizer.recognize_char(&rotated) {
                Ok(attempts) => attempts,
                Err(err) => {
                    debug!(error = %err, "recognition failed, rejecting mask");
                    return OcrOutcome::Rejected;
                }
            };
            for attempt in attempts {
                if let Some((_, best_conf)) = &best {
                    if attempt.confidence <= *best_conf {
                        continue;
                    }
                }
                let Some(first) = attempt.text.chars().next() else {
                    continue;
                };
                if !first.is_ascii_uppercase() {
                    continue;
                }
                best = Some((attempt.text, attempt.confidence));
            }
        }
    }

    match best {
        Some((text, confidence))
            if confidence >= config.confidence_threshold
                && !config.reject_letters.contains(&text) =>
        {
            let letter = text.chars().next().expect("non-empty accepted text");
            OcrOutcome::Accepted { letter, confidence }
        }
        _ => OcrOutcome::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::VisionError;
    use crate::domain::OcrAttempt;
    use imageproc::drawing::draw_line_segment_mut;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    /// Scripted recognizer: returns the same attempts for every rotation.
    struct ScriptedRecognizer {
        attempts: Vec<OcrAttempt>,
        calls: usize,
    }

    impl ScriptedRecognizer {
        fn returning(text: &str, confidence: f32) -> Self {
            Self {
                attempts: vec![OcrAttempt {
                    text: text.to_string(),
                    confidence,
                }],
                calls: 0,
            }
        }
    }

    impl CharRecognizer for ScriptedRecognizer {
        fn recognize_char(&mut self, _image: &RgbImage) -> Result<Vec<OcrAttempt>, VisionError> {
            self.calls += 1;
            Ok(self.attempts.clone())
        }
    }

    struct FailingRecognizer;

    impl CharRecognizer for FailingRecognizer {
        fn recognize_char(&mut self, _image: &RgbImage) -> Result<Vec<OcrAttempt>, VisionError> {
            Err(VisionError::invalid_input("engine down"))
        }
    }

    /// A mask with strokes in three distinct directions, enough for the
    /// line search to settle on several orientation clusters.
    fn stroked_mask() -> RgbImage {
        let mut mask = RgbImage::from_pixel(120, 120, WHITE);
        for offset in 0..3 {
            let shift = offset as f32 * 2.0;
            draw_line_segment_mut(&mut mask, (10.0, 20.0 + shift), (110.0, 20.0 + shift), BLACK);
            draw_line_segment_mut(&mut mask, (30.0 + shift, 10.0), (30.0 + shift, 110.0), BLACK);
            draw_line_segment_mut(&mut mask, (15.0 + shift, 110.0), (105.0 + shift, 20.0), BLACK);
        }
        mask
    }

    #[test]
    fn test_accepts_confident_uppercase_letter() {
        let mut recognizer = ScriptedRecognizer::returning("A", 93.0);
        let outcome = identify_character(&stroked_mask(), &mut recognizer, &OcrConsensusConfig::default());
        assert_eq!(
            outcome,
            OcrOutcome::Accepted {
                letter: 'A',
                confidence: 93.0
            }
        );
        assert!(recognizer.calls >= 4);
    }

    #[test]
    fn test_rejects_below_confidence_threshold() {
        let mut recognizer = ScriptedRecognizer::returning("B", 70.9);
        let outcome = identify_character(&stroked_mask(), &mut recognizer, &OcrConsensusConfig::default());
        assert_eq!(outcome, OcrOutcome::Rejected);
    }

    #[test]
    fn test_rejects_letter_i_at_full_confidence() {
        let mut recognizer = ScriptedRecognizer::returning("I", 100.0);
        let outcome = identify_character(&stroked_mask(), &mut recognizer, &OcrConsensusConfig::default());
        assert_eq!(outcome, OcrOutcome::Rejected);
    }

    #[test]
    fn test_skips_non_uppercase_results() {
        let mut recognizer = ScriptedRecognizer::returning("x", 99.0);
        let outcome = identify_character(&stroked_mask(), &mut recognizer, &OcrConsensusConfig::default());
        assert_eq!(outcome, OcrOutcome::Rejected);
    }

    #[test]
    fn test_blank_mask_rejected_without_recognition() {
        let mask = RgbImage::from_pixel(60, 60, WHITE);
        let mut recognizer = ScriptedRecognizer::returning("A", 99.0);
        let outcome = identify_character(&mask, &mut recognizer, &OcrConsensusConfig::default());
        assert_eq!(outcome, OcrOutcome::Rejected);
        assert_eq!(recognizer.calls, 0);
    }

    #[test]
    fn test_recognizer_error_rejects_mask() {
        let outcome = identify_character(
            &stroked_mask(),
            &mut FailingRecognizer,
            &OcrConsensusConfig::default(),
        );
        assert_eq!(outcome, OcrOutcome::Rejected);
    }

    #[test]
    fn test_merge_angle_clusters_rolls_average() {
        let clusters = merge_angle_clusters(&[10.0, 11.0, 12.0, 50.0, 52.0], 5.0);
        assert_eq!(clusters.len(), 2);
        // 10 then (10+11)/2 = 10.5 then (10.5+12)/2 = 11.25.
        assert!((clusters[0] - 11.25).abs() < 1e-9);
        assert!((clusters[1] - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_angle_clusters_drops_trailing_singleton() {
        // The final angle opens a new cluster that is never closed.
        let clusters = merge_angle_clusters(&[10.0, 11.0, 90.0], 5.0);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0] - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_merge_angle_clusters_empty() {
        assert!(merge_angle_clusters(&[], 5.0).is_empty());
    }

    #[test]
    fn test_binarize_foreground_recolors_non_white() {
        let mut mask = RgbImage::from_pixel(3, 1, WHITE);
        mask.put_pixel(1, 0, Rgb([200, 30, 30]));
        let binary = binarize_foreground(&mask);
        assert_eq!(*binary.get_pixel(0, 0), WHITE);
        assert_eq!(*binary.get_pixel(1, 0), BLACK);
        assert_eq!(*binary.get_pixel(2, 0), WHITE);
    }
}
