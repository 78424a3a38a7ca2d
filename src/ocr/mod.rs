//! Character recognition: the OCR seam and the orientation-search
//! consensus procedure built on top of it.

pub mod consensus;
pub mod recognizer;

pub use consensus::identify_character;
pub use recognizer::{CharRecognizer, RecognizerFactory, TessCharRecognizer};
