//! Image-processing stages of the recognition pipeline.
//!
//! Each submodule is one stage: background suppression, candidate
//! extraction, color quantization, dominant-color voting and shape
//! classification. Stages operate on plain in-memory images and share no
//! state.

pub mod blob;
pub mod color_vote;
pub mod segment;
pub mod shape;
pub mod suppression;

pub use blob::{binarize_nonblack, detect_blobs, extract_candidates, Blob, BlobColor};
pub use color_vote::{
    dominant_color, mask_near_color, nearest_color_name, secondary_color, NamedColor, COLOR_TABLE,
};
pub use segment::segment_colors;
pub use shape::classify_shape;
pub use suppression::suppress_color_families;
