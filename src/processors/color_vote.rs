//! Dominant-color voting and color naming.
//!
//! Finds the most frequent non-black pixel color in a region by exact-match
//! frequency counting and names it via nearest-neighbor lookup in a fixed
//! color table. The pairwise count is quadratic but candidate crops are
//! small enough for it not to matter.

use image::{Rgb, RgbImage};

/// A named anchor color.
#[derive(Debug, Clone, Copy)]
pub struct NamedColor {
    /// Human-readable color name.
    pub name: &'static str,
    /// RGB anchor value.
    pub rgb: [u8; 3],
}

/// Fixed lookup table for color naming.
///
/// Order is significant: ties in Manhattan distance resolve to the lower
/// index. The two "blue" entries anchor different parts of the blue range
/// and must not be collapsed into one.
pub const COLOR_TABLE: [NamedColor; 13] = [
    NamedColor { name: "black", rgb: [0, 0, 0] },
    NamedColor { name: "red", rgb: [255, 51, 51] },
    NamedColor { name: "orange", rgb: [255, 128, 0] },
    NamedColor { name: "yellow", rgb: [255, 255, 51] },
    NamedColor { name: "green", rgb: [0, 255, 0] },
    NamedColor { name: "cyan", rgb: [51, 255, 255] },
    NamedColor { name: "blue", rgb: [51, 153, 255] },
    NamedColor { name: "blue", rgb: [0, 0, 255] },
    NamedColor { name: "purple", rgb: [178, 102, 255] },
    NamedColor { name: "magenta", rgb: [255, 51, 255] },
    NamedColor { name: "pink", rgb: [255, 153, 204] },
    NamedColor { name: "grey", rgb: [160, 160, 160] },
    NamedColor { name: "white", rgb: [255, 255, 255] },
];

/// Manhattan distance threshold below which pixels count as the first
/// dominant color when extracting the second one.
pub const SECONDARY_MASK_DISTANCE: u32 = 80;

fn manhattan(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| u32::from(x.abs_diff(*y)))
        .sum()
}

/// Names an RGB value by the table entry with minimal Manhattan distance.
///
/// Ties resolve to the lower table index.
pub fn nearest_color_name(rgb: [u8; 3]) -> &'static str {
    let mut best = &COLOR_TABLE[0];
    let mut best_dist = u32::MAX;
    for entry in &COLOR_TABLE {
        let dist = manhattan(rgb, entry.rgb);
        if dist < best_dist {
            best_dist = dist;
            best = entry;
        }
    }
    best.name
}

/// Returns the most frequent non-black pixel color, or `None` if every
/// pixel is black.
///
/// Frequencies are exact-match counts; when several colors share the
/// maximal count, the last pixel reaching it wins.
pub fn dominant_color(image: &RgbImage) -> Option<Rgb<u8>> {
    let samples: Vec<Rgb<u8>> = image
        .pixels()
        .filter(|p| p.0 != [0, 0, 0])
        .copied()
        .collect();
    if samples.is_empty() {
        return None;
    }

    let mut max = 0usize;
    for a in &samples {
        let count = samples.iter().filter(|b| b.0 == a.0).count();
        if count > max {
            max = count;
        }
    }

    let mut winner = samples[0];
    for a in &samples {
        let count = samples.iter().filter(|b| b.0 == a.0).count();
        if count == max {
            winner = *a;
        }
    }
    Some(winner)
}

/// Recolors every pixel within `distance` (Manhattan) of `color` to black.
pub fn mask_near_color(image: &RgbImage, color: Rgb<u8>, distance: u32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        if pixel.0 == [0, 0, 0] {
            continue;
        }
        if manhattan(pixel.0, color.0) < distance {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    out
}

/// Returns the most frequent non-black color after the first dominant
/// color has been masked out.
pub fn secondary_color(image: &RgbImage, primary: Rgb<u8>) -> Option<Rgb<u8>> {
    dominant_color(&mask_near_color(image, primary, SECONDARY_MASK_DISTANCE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_color_exact_anchors() {
        assert_eq!(nearest_color_name([0, 0, 0]), "black");
        assert_eq!(nearest_color_name([255, 51, 51]), "red");
        assert_eq!(nearest_color_name([0, 0, 255]), "blue");
        assert_eq!(nearest_color_name([51, 153, 255]), "blue");
        assert_eq!(nearest_color_name([255, 255, 255]), "white");
    }

    #[test]
    fn test_nearest_color_pure_primaries() {
        assert_eq!(nearest_color_name([255, 0, 0]), "red");
        assert_eq!(nearest_color_name([0, 255, 0]), "green");
    }

    #[test]
    fn test_tie_resolves_to_lower_index() {
        // (51, 204, 255) is equidistant (51) from the cyan anchor at index 5
        // and the first blue anchor at index 6, and no other entry is closer;
        // the earlier entry must win.
        let value = [51, 204, 255];
        assert_eq!(manhattan(value, COLOR_TABLE[5].rgb), 51);
        assert_eq!(manhattan(value, COLOR_TABLE[6].rgb), 51);
        let best = COLOR_TABLE
            .iter()
            .map(|e| manhattan(value, e.rgb))
            .min()
            .unwrap();
        assert_eq!(best, 51);
        assert_eq!(nearest_color_name(value), "cyan");
    }

    #[test]
    fn test_blue_anchors_tie_on_their_midline() {
        // (51, 51, 255) is equidistant (102) from both blue anchors; the
        // duplicate entry exists precisely to widen the blue basin, so the
        // lookup must land on "blue" rather than a later neighbor.
        let value = [51, 51, 255];
        assert_eq!(manhattan(value, COLOR_TABLE[6].rgb), 102);
        assert_eq!(manhattan(value, COLOR_TABLE[7].rgb), 102);
        assert_eq!(nearest_color_name(value), "blue");
    }

    #[test]
    fn test_table_preserves_duplicate_blue() {
        let blues: Vec<&NamedColor> = COLOR_TABLE.iter().filter(|e| e.name == "blue").collect();
        assert_eq!(blues.len(), 2);
        assert_ne!(blues[0].rgb, blues[1].rgb);
    }

    #[test]
    fn test_dominant_color_ignores_black() {
        let mut image = RgbImage::new(10, 10); // 100 pixels
        let mut pixels = image.pixels_mut();
        // 50 black (left as-is), 30 red, 20 blue.
        for pixel in pixels.by_ref().take(50) {
            *pixel = Rgb([0, 0, 0]);
        }
        for pixel in pixels.by_ref().take(30) {
            *pixel = Rgb([255, 0, 0]);
        }
        for pixel in pixels {
            *pixel = Rgb([0, 0, 255]);
        }

        let first = dominant_color(&image).unwrap();
        assert_eq!(first, Rgb([255, 0, 0]));
        assert_eq!(nearest_color_name(first.0), "red");

        let second = secondary_color(&image, first).unwrap();
        assert_eq!(second, Rgb([0, 0, 255]));
        assert_eq!(nearest_color_name(second.0), "blue");
    }

    #[test]
    fn test_dominant_color_all_black_is_none() {
        let image = RgbImage::new(4, 4);
        assert!(dominant_color(&image).is_none());
    }

    #[test]
    fn test_mask_near_color_uses_strict_threshold() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([100, 0, 0]));
        image.put_pixel(1, 0, Rgb([180, 0, 0]));
        // Distance from (100,0,0) to (180,0,0) is exactly 80: not masked.
        let out = mask_near_color(&image, Rgb([100, 0, 0]), SECONDARY_MASK_DISTANCE);
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([180, 0, 0]));
    }
}
