//! Domain types produced and consumed by the recognition pipeline.
//!
//! Candidates and their derived masks live only for the duration of one
//! candidate's classification; the only values that outlive a run are the
//! [`ClassificationRecord`]s collected per image.

use image::RgbImage;
use serde::Serialize;

/// An axis-aligned bounding box in source-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    /// X-coordinate of the top-left corner.
    pub x: u32,
    /// Y-coordinate of the top-left corner.
    pub y: u32,
    /// Box width in pixels.
    pub width: u32,
    /// Box height in pixels.
    pub height: u32,
}

/// A region of the source image proposed as a possible target.
///
/// Created by the extractor and never mutated afterwards. The crop is taken
/// from the original image, not the suppressed one, so downstream consumers
/// see the full color content.
#[derive(Debug, Clone)]
pub struct CandidateRegion {
    /// Bounding box of the crop in source coordinates.
    pub bbox: BoundingBox,
    /// Blob center in source coordinates.
    pub center: (u32, u32),
    /// Cropped sub-image.
    pub crop: RgbImage,
}

/// A single recognition attempt: the raw recognized string and the engine's
/// self-reported confidence in [0, 100].
#[derive(Debug, Clone, PartialEq)]
pub struct OcrAttempt {
    /// Recognized text, trimmed of surrounding whitespace.
    pub text: String,
    /// Confidence score in [0, 100].
    pub confidence: f32,
}

/// Outcome of the OCR consensus procedure for one color mask.
///
/// Rejection is an ordinary value, not an error: every failure inside the
/// consensus procedure collapses to `Rejected` and the pipeline moves on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OcrOutcome {
    /// A letter passed the confidence and plausibility checks.
    Accepted {
        /// The recognized uppercase letter.
        letter: char,
        /// Confidence score in [0, 100].
        confidence: f32,
    },
    /// No acceptable letter was found.
    Rejected,
}

impl OcrOutcome {
    /// Returns true for an accepted letter.
    pub fn is_accepted(&self) -> bool {
        matches!(self, OcrOutcome::Accepted { .. })
    }
}

/// Target shape, classified by polygon vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    /// Three vertices.
    #[serde(rename = "triangle")]
    Triangle,
    /// Four vertices.
    #[serde(rename = "4-gon")]
    Quadrilateral,
    /// Five vertices.
    #[serde(rename = "pentagon")]
    Pentagon,
    /// Six vertices.
    #[serde(rename = "hexagon")]
    Hexagon,
    /// More than six vertices.
    #[serde(rename = "circle")]
    Circle,
    /// No usable contour, or a degenerate polygon.
    #[serde(rename = "UNKNOWN SHAPE")]
    Unknown,
}

impl Shape {
    /// Returns the shape's display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Triangle => "triangle",
            Shape::Quadrilateral => "4-gon",
            Shape::Pentagon => "pentagon",
            Shape::Hexagon => "hexagon",
            Shape::Circle => "circle",
            Shape::Unknown => "UNKNOWN SHAPE",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final classification of one candidate that survived OCR consensus.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRecord {
    /// Recognized letter, lowercased.
    pub letter: char,
    /// Named color of the letter strokes.
    pub letter_color: String,
    /// Classified target shape.
    pub shape: Shape,
    /// Named color of the target background.
    pub shape_color: String,
    /// Blob center x in source coordinates.
    pub x: u32,
    /// Blob center y in source coordinates.
    pub y: u32,
    /// Confidence of the winning OCR attempt.
    pub confidence: f32,
    /// Number of color segments produced for this candidate.
    pub segments: usize,
}

/// Result of processing a single image.
#[derive(Debug, Clone, Default)]
pub struct ImageAnalysis {
    /// Number of candidate regions extracted.
    pub candidates: usize,
    /// Records for candidates that survived classification, in candidate order.
    pub records: Vec<ClassificationRecord>,
}

/// Per-image entry of a batch run, ordered by input index.
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    /// Position of the image in the input sequence.
    pub index: usize,
    /// Number of candidate regions extracted.
    pub candidates: usize,
    /// Records for candidates that survived classification.
    pub records: Vec<ClassificationRecord>,
    /// Diagnostic for an image that was skipped, if any.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_names() {
        assert_eq!(Shape::Quadrilateral.as_str(), "4-gon");
        assert_eq!(Shape::Unknown.as_str(), "UNKNOWN SHAPE");
        assert_eq!(Shape::Circle.to_string(), "circle");
    }

    #[test]
    fn test_shape_serializes_as_name() {
        let json = serde_json::to_string(&Shape::Quadrilateral).unwrap();
        assert_eq!(json, "\"4-gon\"");
    }

    #[test]
    fn test_record_serialization() {
        let record = ClassificationRecord {
            letter: 'a',
            letter_color: "black".to_string(),
            shape: Shape::Quadrilateral,
            shape_color: "red".to_string(),
            x: 120,
            y: 48,
            confidence: 93.0,
            segments: 2,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["letter"], "a");
        assert_eq!(json["shape"], "4-gon");
        assert_eq!(json["x"], 120);
    }
}
