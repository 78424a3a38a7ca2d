//! Candidate region extraction.
//!
//! Detects blob-shaped regions of a target color in a binary mask and crops
//! square bounding boxes around them from the original image. Blobs are
//! filtered by area only; shape, convexity and inertia are deliberately not
//! considered.

use image::{imageops, GrayImage, Luma, Pixel, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use crate::domain::{BoundingBox, CandidateRegion};

/// Foreground color searched for by blob detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobColor {
    /// Detect white (nonzero) blobs.
    White,
    /// Detect black (zero) blobs.
    Black,
}

/// A connected foreground region, characterized by centroid and size.
#[derive(Debug, Clone, Copy)]
pub struct Blob {
    /// Centroid in mask coordinates.
    pub center: (f32, f32),
    /// Equivalent-circle diameter, `2 * sqrt(area / pi)`.
    pub size: f32,
    /// Pixel count of the component.
    pub area: u32,
}

/// Binarizes an image whose background has been zeroed: any pixel with
/// nonzero luma becomes white, the rest black.
pub fn binarize_nonblack(image: &RgbImage) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(mask.pixels_mut()) {
        let Luma([luma]) = src.to_luma();
        *dst = Luma([if luma > 0 { 255 } else { 0 }]);
    }
    mask
}

/// Detects 8-connected blobs of the requested color with
/// `min_area <= area <= max_area`, in first-encounter (raster) order.
pub fn detect_blobs(
    mask: &GrayImage,
    min_area: f64,
    max_area: f64,
    color: BlobColor,
) -> Vec<Blob> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let foreground = match color {
        BlobColor::White => mask.clone(),
        BlobColor::Black => {
            let mut inverted = mask.clone();
            for pixel in inverted.pixels_mut() {
                pixel.0[0] = 255 - pixel.0[0];
            }
            inverted
        }
    };

    let labels = connected_components(&foreground, Connectivity::Eight, Luma([0u8]));

    // Labels are assigned in raster order starting at 1; accumulate
    // per-component area and centroid sums indexed by label.
    let mut stats: Vec<(u64, u64, u64)> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        if stats.len() < label {
            stats.resize(label, (0, 0, 0));
        }
        let entry = &mut stats[label - 1];
        entry.0 += 1;
        entry.1 += u64::from(x);
        entry.2 += u64::from(y);
    }

    stats
        .iter()
        .filter(|(area, _, _)| {
            let area = *area as f64;
            area >= min_area && area <= max_area
        })
        .map(|&(area, sum_x, sum_y)| Blob {
            center: (
                sum_x as f32 / area as f32,
                sum_y as f32 / area as f32,
            ),
            size: 2.0 * (area as f32 / std::f32::consts::PI).sqrt(),
            area: area as u32,
        })
        .collect()
}

/// Computes the square candidate box for a blob: side `4s` around the
/// center, with the top-left corner clamped to be non-negative.
pub fn candidate_box(center: (f32, f32), size: f32) -> BoundingBox {
    let side = (size * 4.0) as u32;
    let x = (center.0 - size * 2.0).max(0.0) as u32;
    let y = (center.1 - size * 2.0).max(0.0) as u32;
    BoundingBox {
        x,
        y,
        width: side,
        height: side,
    }
}

/// Extracts candidate regions for every acceptable blob in the mask.
///
/// Crops are taken from the original, unmasked image. A box that overflows
/// the right or bottom edge cannot be cropped; the blob is skipped and the
/// run continues.
pub fn extract_candidates(
    original: &RgbImage,
    mask: &GrayImage,
    min_area: f64,
    max_area: f64,
    color: BlobColor,
) -> Vec<CandidateRegion> {
    let blobs = detect_blobs(mask, min_area, max_area, color);
    let mut candidates = Vec::with_capacity(blobs.len());

    for blob in &blobs {
        let bbox = candidate_box(blob.center, blob.size);
        if bbox.width == 0
            || bbox.x + bbox.width > original.width()
            || bbox.y + bbox.height > original.height()
        {
            debug!(
                x = blob.center.0,
                y = blob.center.1,
                size = blob.size,
                "candidate box out of bounds, skipping blob"
            );
            continue;
        }

        let crop = imageops::crop_imm(original, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
        candidates.push(CandidateRegion {
            bbox,
            center: (blob.center.0 as u32, blob.center.1 as u32),
            crop,
        });
    }

    candidates
}
