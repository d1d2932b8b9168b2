use crate::error::AppError;
use crate::raster::RasterImage;

/// Trait that all OCR engines must implement
///
/// Engines receive the normalized single-channel page and return its text.
/// An empty string is a valid answer for a page without readable text.
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text of one preprocessed page
    fn recognize(&self, image: &RasterImage) -> Result<String, AppError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}
