//! Single-character recognition seam.
//!
//! The consensus engine only needs one capability: run OCR on an image in
//! single-character mode and report what was seen with a confidence score.
//! That capability is a trait so the Tesseract-backed implementation can be
//! swapped for a scripted one in tests.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbImage};
use leptess::{LepTess, Variable};

use crate::core::errors::VisionError;
use crate::domain::OcrAttempt;

/// Recognizes a single character in an image.
pub trait CharRecognizer {
    /// Runs recognition and returns every attempt the engine produced,
    /// each with its confidence in [0, 100]. An empty vector means the
    /// engine saw nothing.
    fn recognize_char(&mut self, image: &RgbImage) -> Result<Vec<OcrAttempt>, VisionError>;
}

/// Creates a fresh recognizer for a worker thread.
///
/// Tesseract handles cannot be shared across threads, so the pipeline
/// builds one recognizer per worker from this factory.
pub type RecognizerFactory =
    Arc<dyn Fn() -> Result<Box<dyn CharRecognizer>, VisionError> + Send + Sync>;

/// Tesseract-backed recognizer, restricted to single-character page
/// segmentation.
pub struct TessCharRecognizer {
    engine: LepTess,
}

impl TessCharRecognizer {
    /// Initializes Tesseract with the given data path and language and
    /// switches it to single-character mode.
    pub fn new(datapath: Option<&str>, language: &str) -> Result<Self, VisionError> {
        let mut engine = LepTess::new(datapath, language).map_err(VisionError::ocr)?;
        // Page segmentation mode 10: treat the image as a single character.
        engine
            .set_variable(Variable::TesseditPagesegMode, "10")
            .map_err(VisionError::ocr)?;
        Ok(Self { engine })
    }

    /// Returns a factory producing one recognizer per worker thread.
    pub fn factory(datapath: Option<String>, language: String) -> RecognizerFactory {
        Arc::new(move || {
            TessCharRecognizer::new(datapath.as_deref(), &language)
                .map(|r| Box::new(r) as Box<dyn CharRecognizer>)
        })
    }
}

impl CharRecognizer for TessCharRecognizer {
    fn recognize_char(&mut self, image: &RgbImage) -> Result<Vec<OcrAttempt>, VisionError> {
        // Tesseract takes image data in an encoded container format, so the
        // buffer is handed over as an in-memory PNG.
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(VisionError::ImageLoad)?;
        self.engine
            .set_image_from_mem(&png)
            .map_err(VisionError::ocr)?;
        self.engine.set_source_resolution(300);

        let text = self.engine.get_utf8_text().map_err(VisionError::ocr)?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let confidence = self.engine.mean_text_conf() as f32;
        Ok(vec![OcrAttempt { text, confidence }])
    }
}
