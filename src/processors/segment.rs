//! Color quantization of candidate crops.
//!
//! Runs K-means over pixel color vectors and splits the crop into ranked
//! single-color masks, one per visually distinct cluster center. The masks
//! feed the OCR consensus engine one at a time; whichever mask yields the
//! highest-confidence letter wins.

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Iteration cap for a single K-means run.
const MAX_ITERATIONS: usize = 1000;

/// Number of random restarts; the lowest-cost result is kept.
const RESTARTS: usize = 5;

struct KmeansRun {
    centers: Vec<[f32; 3]>,
    labels: Vec<usize>,
    cost: f64,
}

fn squared_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

fn nearest_center(point: [f32; 3], centers: &[[f32; 3]]) -> (usize, f32) {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, center) in centers.iter().enumerate() {
        let dist = squared_distance(point, *center);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    (best, best_dist)
}

/// K-means++ seeding: the first center is uniform, each further center is
/// drawn with probability proportional to squared distance from the
/// nearest center chosen so far.
fn seed_centers(points: &[[f32; 3]], k: usize, rng: &mut StdRng) -> Vec<[f32; 3]> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.gen_range(0..points.len())]);

    let mut distances: Vec<f32> = points
        .iter()
        .map(|p| squared_distance(*p, centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = distances.iter().map(|d| f64::from(*d)).sum();
        let next = if total <= f64::EPSILON {
            // All remaining mass is on existing centers; fall back to uniform.
            points[rng.gen_range(0..points.len())]
        } else {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = points.len() - 1;
            for (i, d) in distances.iter().enumerate() {
                target -= f64::from(*d);
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            points[chosen]
        };
        centers.push(next);
        for (d, p) in distances.iter_mut().zip(points.iter()) {
            let dist = squared_distance(*p, next);
            if dist < *d {
                *d = dist;
            }
        }
    }
    centers
}

fn lloyd(points: &[[f32; 3]], k: usize, rng: &mut StdRng) -> KmeansRun {
    let mut centers = seed_centers(points, k, rng);
    let mut labels = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(points.iter()) {
            let (nearest, _) = nearest_center(*point, &centers);
            if nearest != *label {
                *label = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (label, point) in labels.iter().zip(points.iter()) {
            counts[*label] += 1;
            for c in 0..3 {
                sums[*label][c] += f64::from(point[c]);
            }
        }
        for (i, center) in centers.iter_mut().enumerate() {
            if counts[i] > 0 {
                for c in 0..3 {
                    center[c] = (sums[i][c] / counts[i] as f64) as f32;
                }
            }
        }
    }

    let cost = points
        .iter()
        .zip(labels.iter())
        .map(|(p, l)| f64::from(squared_distance(*p, centers[*l])))
        .sum();

    KmeansRun {
        centers,
        labels,
        cost,
    }
}

/// Quantizes the crop into at most `cluster_count` ranked single-color masks.
///
/// Pixels assigned to a mask's cluster keep their original color; all other
/// pixels are forced to white. Masks are ordered most-recently-discovered
/// distinct center first, and slots whose center never appears are omitted,
/// so fewer than `cluster_count` masks is a normal result.
pub fn segment_colors(crop: &RgbImage, cluster_count: usize, seed: u64) -> Vec<RgbImage> {
    let points: Vec<[f32; 3]> = crop
        .pixels()
        .map(|p| {
            [
                f32::from(p.0[0]) / 255.0,
                f32::from(p.0[1]) / 255.0,
                f32::from(p.0[2]) / 255.0,
            ]
        })
        .collect();
    if points.is_empty() {
        return Vec::new();
    }

    let k = cluster_count.min(points.len());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut best: Option<KmeansRun> = None;
    for _ in 0..RESTARTS {
        let run = lloyd(&points, k, &mut rng);
        if best.as_ref().map_or(true, |b| run.cost < b.cost) {
            best = Some(run);
        }
    }
    let run = best.expect("at least one restart");

    // Quantize centers to 8-bit so distinctness means "visually distinct".
    let centers_u8: Vec<[u8; 3]> = run
        .centers
        .iter()
        .map(|c| {
            [
                (c[0] * 255.0).round().clamp(0.0, 255.0) as u8,
                (c[1] * 255.0).round().clamp(0.0, 255.0) as u8,
                (c[2] * 255.0).round().clamp(0.0, 255.0) as u8,
            ]
        })
        .collect();

    // Rank up to `cluster_count` distinct centers by first appearance over
    // the pixels in raster order.
    let mut slots: Vec<[u8; 3]> = Vec::with_capacity(cluster_count);
    for label in &run.labels {
        let value = centers_u8[*label];
        if !slots.contains(&value) {
            slots.push(value);
            if slots.len() == cluster_count {
                break;
            }
        }
    }

    // Most-recently-discovered center first.
    slots
        .iter()
        .rev()
        .map(|slot| {
            let mut mask = RgbImage::from_pixel(crop.width(), crop.height(), Rgb([255, 255, 255]));
            for ((dst, src), label) in mask
                .pixels_mut()
                .zip(crop.pixels())
                .zip(run.labels.iter())
            {
                if centers_u8[*label] == *slot {
                    *dst = *src;
                }
            }
            mask
        })
        .collect()
}
