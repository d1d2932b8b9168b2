//! PDF to slide deck conversion: extract, normalize, OCR, assemble.

use crate::batch::{BatchDriver, BatchReport};
use crate::deck::SlideDeck;
use crate::engine::OcrEngine;
use crate::error::AppError;
use crate::pdf;
use crate::preprocessing::Pipeline;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Keep per-page text files here
    pub text_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub images_extracted: usize,
    pub slides: usize,
    pub batch: BatchReport,
    pub processing_time_ms: u64,
}

/// Convert `pdf_path` into a deck at `deck_path`.
///
/// One slide per page image that made it through the pipeline, in file
/// name order. Pages that fail are reported and left out of the deck.
pub fn convert_pdf(
    pdf_path: &Path,
    deck_path: &Path,
    pipeline: &Pipeline,
    engine: &dyn OcrEngine,
    options: &ConvertOptions,
) -> Result<ConversionReport, AppError> {
    let start = Instant::now();
    let (deck, mut report) = build_deck(pdf_path, pipeline, engine, options)?;
    deck.write_to(deck_path)?;
    report.processing_time_ms = start.elapsed().as_millis() as u64;
    Ok(report)
}

/// Same as [`convert_pdf`] but returns the deck in memory
pub fn build_deck(
    pdf_path: &Path,
    pipeline: &Pipeline,
    engine: &dyn OcrEngine,
    options: &ConvertOptions,
) -> Result<(SlideDeck, ConversionReport), AppError> {
    let start = Instant::now();
    let image_dir = tempfile::tempdir()?;

    let images = pdf::extract_images(pdf_path, image_dir.path())?;
    tracing::info!(
        "Extracted {} image(s) from {}",
        images.len(),
        pdf_path.display()
    );

    let mut driver = BatchDriver::new(pipeline, engine);
    if let Some(text_dir) = &options.text_dir {
        driver = driver.with_text_dir(text_dir);
    }
    let batch = driver.run(image_dir.path())?;

    let mut deck = SlideDeck::new();
    for (_, page) in batch.processed() {
        deck.add_slide(page.text.as_str());
    }

    let report = ConversionReport {
        images_extracted: images.len(),
        slides: deck.len(),
        batch,
        processing_time_ms: start.elapsed().as_millis() as u64,
    };
    Ok((deck, report))
}
