//! ocrs engine: pure Rust text detection and recognition.
//!
//! Models are fetched into the cache directory on first start.

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::AppError;
use crate::raster::RasterImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;
use std::fmt::Display;

use super::ensure_model_downloaded;

const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

fn init_error<E: Display>(what: &'static str) -> impl Fn(E) -> AppError {
    move |e| AppError::InitializationError(format!("{}: {}", what, e))
}

fn ocr_error<E: Display>(what: &'static str) -> impl Fn(E) -> AppError {
    move |e| AppError::ProcessingError(format!("{}: {}", what, e))
}

fn load_model(url: &str, file_name: &str) -> Result<Model, AppError> {
    let path = ensure_model_downloaded(url, file_name)?;
    Model::load_file(&path).map_err(init_error("Failed to load ocrs model"))
}

impl OcrsEngine {
    pub fn new(_config: &Config) -> Result<Self, AppError> {
        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(load_model(DETECTION_MODEL_URL, "text-detection.rten")?),
            recognition_model: Some(load_model(RECOGNITION_MODEL_URL, "text-recognition.rten")?),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(init_error("Failed to create ocrs engine"))?;

        tracing::info!("ocrs engine ready");
        Ok(Self { engine })
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(&self, image: &RasterImage) -> Result<String, AppError> {
        // ocrs wants interleaved RGB even for single-channel pages
        let rgb = image.clone().into_dynamic().into_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(ocr_error("Invalid page buffer"))?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(ocr_error("Failed to prepare input"))?;
        let words = self
            .engine
            .detect_words(&input)
            .map_err(ocr_error("Failed to detect words"))?;
        let lines = self.engine.find_text_lines(&input, &words);
        let recognized = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(ocr_error("Failed to recognize text"))?;

        let text = recognized
            .iter()
            .flatten()
            .map(|line| line.words().map(|w| w.to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }

    fn supported_languages(&self) -> Vec<String> {
        // Latin alphabet models only
        vec!["eng".to_string()]
    }
}
