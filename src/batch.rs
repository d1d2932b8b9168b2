//! Batch driver: normalize and OCR every image in a directory.
//!
//! Best effort: a file that fails to decode or preprocess is logged and
//! recorded in the report, and the batch moves on. Only an unreadable
//! directory is fatal.

use crate::engine::OcrEngine;
use crate::error::{AppError, PipelineError};
use crate::preprocessing::{Pipeline, SkewAngle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Extensions the batch driver picks up (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    InvalidImage,
    InvalidConfig,
    Io,
}

/// Why a single file was skipped
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<PipelineError> for FileError {
    fn from(err: PipelineError) -> Self {
        let kind = match &err {
            PipelineError::Decode(_) => ErrorKind::Decode,
            PipelineError::InvalidImage { .. } => ErrorKind::InvalidImage,
            PipelineError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Text recognized from one normalized page
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub text: String,
    /// Dimensions of the image handed to the OCR engine
    pub width: u32,
    pub height: u32,
    pub skew: Option<SkewAngle>,
    pub preprocessing_ms: u64,
    pub text_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: Result<PageText, FileError>,
}

/// Per-file results in traversal order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// No candidate images were found
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn processed(&self) -> impl Iterator<Item = (&str, &PageText)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|page| (o.file_name.as_str(), page)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &FileError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (o.file_name.as_str(), err)))
    }

    pub fn processed_count(&self) -> usize {
        self.processed().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

/// Runs the preprocessing chain and OCR over a directory
pub struct BatchDriver<'a> {
    pipeline: &'a Pipeline,
    engine: &'a dyn OcrEngine,
    text_dir: Option<PathBuf>,
}

impl<'a> BatchDriver<'a> {
    pub fn new(pipeline: &'a Pipeline, engine: &'a dyn OcrEngine) -> Self {
        Self {
            pipeline,
            engine,
            text_dir: None,
        }
    }

    /// Write each page's text to `<dir>/<stem>.txt`
    pub fn with_text_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.text_dir = Some(dir.into());
        self
    }

    pub fn run(&self, dir: &Path) -> Result<BatchReport, AppError> {
        let files = list_images(dir)?;
        if let Some(text_dir) = &self.text_dir {
            std::fs::create_dir_all(text_dir)?;
        }

        tracing::info!("Processing {} image(s) from {}", files.len(), dir.display());
        let start = Instant::now();

        let mut report = BatchReport::default();
        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let result = self.process_file(&path, &file_name);
            match &result {
                Ok(page) => tracing::info!(
                    "Processed {} ({} chars of text)",
                    file_name,
                    page.text.chars().count()
                ),
                Err(err) => tracing::warn!(
                    "Skipping {} [{:?}]: {}",
                    file_name,
                    err.kind,
                    err.message
                ),
            }
            report.outcomes.push(FileOutcome { file_name, result });
        }

        tracing::info!(
            "Batch finished in {}ms: {} processed, {} failed",
            start.elapsed().as_millis(),
            report.processed_count(),
            report.failed_count()
        );
        Ok(report)
    }

    fn process_file(&self, path: &Path, file_name: &str) -> Result<PageText, FileError> {
        let preprocessed = self.pipeline.process_file(path)?;
        let (width, height) = preprocessed.image.dimensions();

        // OCR trouble yields an empty page, not a skipped file
        let text = match self.engine.recognize(&preprocessed.image) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("OCR failed for {}: {}", file_name, e);
                String::new()
            }
        };

        let text_file = match &self.text_dir {
            Some(text_dir) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file_name.to_string());
                let text_path = text_dir.join(format!("{}.txt", stem));
                std::fs::write(&text_path, &text).map_err(|e| FileError {
                    kind: ErrorKind::Io,
                    message: format!("Failed to write {}: {}", text_path.display(), e),
                })?;
                Some(text_path)
            }
            None => None,
        };

        Ok(PageText {
            text,
            width,
            height,
            skew: preprocessed.skew,
            preprocessing_ms: preprocessed.total_time_ms,
            text_file,
        })
    }
}

/// Image files directly inside `dir`, sorted by file name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(has_image_extension(Path::new("scan.PNG")));
        assert!(has_image_extension(Path::new("a/b/page.tiff")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("README")));
        assert!(!has_image_extension(Path::new("image.webp")));
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "image0002_001.png",
            "image0010_001.jpg",
            "image0001_002.gif",
            "image0001_001.png",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            [
                "image0001_001.png",
                "image0001_002.gif",
                "image0002_001.png",
                "image0010_001.jpg"
            ]
        );
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        assert!(list_images(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_pipeline_error_kinds() {
        let err: FileError = PipelineError::Decode("bad".to_string()).into();
        assert_eq!(err.kind, ErrorKind::Decode);
        let err: FileError = PipelineError::invalid("resize", "empty").into();
        assert_eq!(err.kind, ErrorKind::InvalidImage);
    }
}
