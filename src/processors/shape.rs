//! Shape classification by polygon vertex count.
//!
//! Takes the binary silhouette of a candidate, extracts its outermost
//! contour and fits a polygon with the Ramer-Douglas-Peucker algorithm.
//! The vertex count of the fitted polygon names the shape; anything that
//! cannot be fitted is `Shape::Unknown`.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};

use crate::domain::Shape;

/// Polygon fit tolerance as a fraction of the contour perimeter.
const EPSILON_PERIMETER_FRACTION: f64 = 0.02;

/// Classifies a binary silhouette by the vertex count of its fitted polygon.
///
/// Only the first outermost contour in detection order is considered;
/// holes (such as a glyph cut into the silhouette) and any further
/// contours are ignored. A degenerate or missing contour yields
/// [`Shape::Unknown`] rather than an error.
pub fn classify_shape(mask: &GrayImage) -> Shape {
    if mask.width() == 0 || mask.height() == 0 {
        return Shape::Unknown;
    }

    let contours = find_contours::<i32>(mask);
    let Some(outline) = contours
        .iter()
        .find(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    else {
        return Shape::Unknown;
    };
    if outline.points.len() < 3 {
        return Shape::Unknown;
    }

    let perimeter = arc_length(&outline.points, true);
    if perimeter <= 0.0 {
        return Shape::Unknown;
    }

    let polygon = approximate_polygon_dp(
        &outline.points,
        perimeter * EPSILON_PERIMETER_FRACTION,
        true,
    );

    match polygon.len() {
        3 => Shape::Triangle,
        4 => Shape::Quadrilateral,
        5 => Shape::Pentagon,
        6 => Shape::Hexagon,
        n if n > 6 => Shape::Circle,
        _ => Shape::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    const FG: Luma<u8> = Luma([255]);

    fn regular_polygon(sides: u32, cx: f64, cy: f64, radius: f64) -> Vec<Point<i32>> {
        (0..sides)
            .map(|i| {
                let angle = std::f64::consts::TAU * f64::from(i) / f64::from(sides);
                Point::new(
                    (cx + radius * angle.cos()).round() as i32,
                    (cy + radius * angle.sin()).round() as i32,
                )
            })
            .collect()
    }

    #[test]
    fn test_triangle() {
        let mut mask = GrayImage::new(200, 200);
        let points = vec![
            Point::new(100i32, 30i32),
            Point::new(170, 160),
            Point::new(30, 160),
        ];
        draw_polygon_mut(&mut mask, &points, FG);
        assert_eq!(classify_shape(&mask), Shape::Triangle);
    }

    #[test]
    fn test_square_is_4_gon() {
        let mut mask = GrayImage::new(200, 200);
        draw_filled_rect_mut(&mut mask, Rect::at(50, 50).of_size(100, 100), FG);
        assert_eq!(classify_shape(&mask), Shape::Quadrilateral);
    }

    #[test]
    fn test_pentagon() {
        let mut mask = GrayImage::new(300, 300);
        draw_polygon_mut(&mut mask, &regular_polygon(5, 150.0, 150.0, 100.0), FG);
        assert_eq!(classify_shape(&mask), Shape::Pentagon);
    }

    #[test]
    fn test_heptagon_reads_as_circle() {
        let mut mask = GrayImage::new(300, 300);
        draw_polygon_mut(&mut mask, &regular_polygon(7, 150.0, 150.0, 100.0), FG);
        assert_eq!(classify_shape(&mask), Shape::Circle);
    }

    #[test]
    fn test_circle() {
        let mut mask = GrayImage::new(300, 300);
        draw_filled_circle_mut(&mut mask, (150, 150), 100, FG);
        assert_eq!(classify_shape(&mask), Shape::Circle);
    }

    #[test]
    fn test_empty_mask_is_unknown() {
        let mask = GrayImage::new(100, 100);
        assert_eq!(classify_shape(&mask), Shape::Unknown);
    }

    #[test]
    fn test_zero_dimension_mask_is_unknown() {
        let mask = GrayImage::new(0, 0);
        assert_eq!(classify_shape(&mask), Shape::Unknown);
    }

    #[test]
    fn test_glyph_hole_does_not_affect_outline() {
        // A silhouette with a hole cut into it still classifies by its
        // outer contour.
        let mut mask = GrayImage::new(200, 200);
        draw_filled_rect_mut(&mut mask, Rect::at(40, 40).of_size(120, 120), FG);
        draw_filled_rect_mut(&mut mask, Rect::at(80, 80).of_size(40, 40), Luma([0]));
        assert_eq!(classify_shape(&mask), Shape::Quadrilateral);
    }
}
