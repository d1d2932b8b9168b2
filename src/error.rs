use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while normalizing a single image.
///
/// These never abort a batch: the batch driver records them per file.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid image for {stage}: {reason}")]
    InvalidImage { stage: &'static str, reason: String },

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub(crate) fn invalid(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            stage,
            reason: reason.into(),
        }
    }
}

/// Application-level errors (collaborators, CLI and HTTP surface)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("OCR failed: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to write slide deck: {0}")]
    Deck(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InitializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            AppError::ProcessingError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR"),
            AppError::Pipeline(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PIPELINE_ERROR"),
            AppError::Pdf(_) => (StatusCode::BAD_REQUEST, "INVALID_PDF"),
            AppError::Deck(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DECK_ERROR"),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            AppError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
