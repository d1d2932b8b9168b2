//! Leptess/Tesseract engine implementation
//!
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically on first use.

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::AppError;
use crate::raster::RasterImage;
use tesseract_static::tesseract::Tesseract;

use super::ensure_model_downloaded;

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_path: String,
    language: String,
}

impl LeptessEngine {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let language = config.language.clone();

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&language)?,
        };

        // Fail at startup rather than on the first page
        let test_tess = Tesseract::new(Some(&tessdata_path), Some(&language)).map_err(|e| {
            AppError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {})",
            tessdata_path,
            language
        );

        Ok(Self {
            tessdata_path,
            language,
        })
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - wide language coverage"
    }

    fn recognize(&self, image: &RasterImage) -> Result<String, AppError> {
        let (width, height) = image.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        image
            .clone()
            .into_dynamic()
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| AppError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Recognizing {}x{} page, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.language))
            .map_err(|e| AppError::ProcessingError(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            AppError::ProcessingError(format!("Failed to set image ({}x{}): {}", width, height, e))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| AppError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| AppError::ProcessingError(format!("Failed to get text: {}", e)))?;

        Ok(text.trim().to_string())
    }

    fn supported_languages(&self) -> Vec<String> {
        vec![self.language.clone()]
    }
}

/// Ensure tessdata for `language` is cached and return its directory
fn ensure_tessdata_available(language: &str) -> Result<String, AppError> {
    // Use tessdata_fast for smaller, faster downloads
    let url = format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    );
    let traineddata = ensure_model_downloaded(&url, &format!("tessdata/{}.traineddata", language))?;

    // Tesseract expects the directory, not the file
    traineddata
        .parent()
        .and_then(|dir| dir.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::InitializationError("Invalid tessdata path".to_string()))
}
