//! Built-in OCR implementation: pdfium rasterisation + the ocrs recogniser.
//!
//! ocrs runs entirely on CPU with two rten models selected at construction
//! time (a detection architecture and a recognition architecture). The engine
//! is created once at process start and shared read-only across jobs; its
//! inference methods take `&self`.
//!
//! ocrs reports recognised text line-by-line without block segmentation, so
//! each page is emitted as a single block. The traversal contract of
//! [`OcrDocument`] is unaffected.

use super::models::ModelFiles;
use super::render::rasterize_pdf;
use super::{DocumentOcr, OcrBlock, OcrDocument, OcrLine, OcrPage};
use crate::error::ExtractError;
use image::DynamicImage;
use std::path::Path;
use tracing::{debug, info};

/// Pure-Rust OCR engine over pdfium page rasters.
pub struct OcrsEngine {
    engine: ocrs::OcrEngine,
    dpi: u32,
    max_pixels: u32,
}

impl OcrsEngine {
    /// Load the detection and recognition models and build the engine.
    ///
    /// Fails fast when model files cannot be located or parsed; this runs at
    /// process startup, never per-job.
    pub fn new(
        model_dir: Option<&Path>,
        dpi: u32,
        max_pixels: u32,
    ) -> Result<Self, ExtractError> {
        let files = ModelFiles::locate(model_dir)?;

        let detection_model = rten::Model::load_file(&files.detection).map_err(|e| {
            ExtractError::OcrModelsUnavailable {
                detail: format!("failed to load detection model: {e}"),
            }
        })?;
        let recognition_model = rten::Model::load_file(&files.recognition).map_err(|e| {
            ExtractError::OcrModelsUnavailable {
                detail: format!("failed to load recognition model: {e}"),
            }
        })?;

        let engine = ocrs::OcrEngine::new(ocrs::OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| ExtractError::OcrFailed {
            detail: format!("failed to create OCR engine: {e}"),
        })?;

        info!("OCR engine ready (detection: {:?})", files.detection);

        Ok(Self {
            engine,
            dpi,
            max_pixels,
        })
    }

    /// Recognise one page image into lines of word tokens.
    fn recognize_page(&self, img: &DynamicImage) -> Result<Vec<OcrLine>, ExtractError> {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ocrs::ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|e| {
            ExtractError::OcrFailed {
                detail: format!("failed to convert page image: {e}"),
            }
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| ExtractError::OcrFailed {
                detail: format!("failed to prepare OCR input: {e}"),
            })?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|e| ExtractError::OcrFailed {
                detail: format!("text recognition failed: {e}"),
            })?;

        Ok(text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(OcrLine::from_text)
            .collect())
    }
}

impl DocumentOcr for OcrsEngine {
    fn extract(&self, pdf_bytes: &[u8]) -> Result<OcrDocument, ExtractError> {
        let images = rasterize_pdf(pdf_bytes, self.dpi, self.max_pixels)?;

        let mut pages = Vec::with_capacity(images.len());
        for (idx, img) in images.iter().enumerate() {
            let lines = self.recognize_page(img)?;
            debug!("Page {}: {} lines recognised", idx + 1, lines.len());
            pages.push(OcrPage {
                blocks: vec![OcrBlock { lines }],
            });
        }

        Ok(OcrDocument { pages })
    }
}
