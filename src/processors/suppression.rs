//! Color-family suppression.
//!
//! Builds per-family HSV exclusion masks and blacks out matching pixels so
//! that foliage, soil and pavement stop competing with targets downstream.
//! Families are applied cumulatively in declared order, each pass operating
//! on the output of the previous one.

use image::{Rgb, RgbImage};
use palette::{Hsv, IntoColor, Srgb};

use crate::core::config::ColorFamilyConfig;
use crate::core::errors::VisionError;

/// An inclusive HSV range, in OpenCV-style units: hue in [0, 180],
/// saturation and value in [0, 255].
#[derive(Debug, Clone, Copy)]
struct HsvRange {
    h: (f32, f32),
    s: (f32, f32),
    v: (f32, f32),
}

impl HsvRange {
    fn contains(&self, h: f32, s: f32, v: f32) -> bool {
        (self.h.0..=self.h.1).contains(&h)
            && (self.s.0..=self.s.1).contains(&s)
            && (self.v.0..=self.v.1).contains(&v)
    }
}

const GREEN_RANGE: HsvRange = HsvRange {
    h: (27.5, 80.0),
    s: (0.0, 255.0),
    v: (0.0, 255.0),
};

const BROWN_RANGE: HsvRange = HsvRange {
    h: (15.0, 25.0),
    s: (0.0, 255.0),
    v: (0.0, 255.0),
};

const GRAY_RANGE: HsvRange = HsvRange {
    h: (0.0, 180.0),
    s: (0.0, 25.5),
    v: (51.0, 196.35),
};

/// Converts a pixel to HSV in OpenCV-style units.
fn pixel_hsv(pixel: Rgb<u8>) -> (f32, f32, f32) {
    let [r, g, b] = pixel.0;
    let rgb = Srgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    );
    let hsv: Hsv = rgb.into_color();
    (
        hsv.hue.into_positive_degrees() / 2.0,
        hsv.saturation * 255.0,
        hsv.value * 255.0,
    )
}

/// Blacks out every pixel of `image` that falls inside `range`.
fn suppress_range(image: &mut RgbImage, range: &HsvRange) {
    for pixel in image.pixels_mut() {
        let (h, s, v) = pixel_hsv(*pixel);
        if range.contains(h, s, v) {
            *pixel = Rgb([0, 0, 0]);
        }
    }
}

/// Returns `image` with every enabled color family blacked out.
///
/// With no family enabled the input is returned unchanged. A zero-dimension
/// buffer cannot be converted to HSV and is a fatal input error for the
/// image, not a per-pixel skip.
pub fn suppress_color_families(
    image: &RgbImage,
    families: &ColorFamilyConfig,
) -> Result<RgbImage, VisionError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(VisionError::invalid_input(
            "cannot convert a zero-dimension image to HSV",
        ));
    }

    let mut out = image.clone();
    if families.is_empty() {
        return Ok(out);
    }

    if families.green {
        suppress_range(&mut out, &GREEN_RANGE);
    }
    if families.brown {
        suppress_range(&mut out, &BROWN_RANGE);
    }
    if families.gray {
        suppress_range(&mut out, &GRAY_RANGE);
    }
    Ok(out)
}
