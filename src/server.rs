use crate::config::Config;
use crate::convert::{build_deck, ConvertOptions};
use crate::deck::PPTX_MIME;
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::AppError;
use crate::preprocessing::{Pipeline, PipelineConfig};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Name the generated deck is downloaded as
pub const DECK_FILE_NAME: &str = "TextPPT.pptx";

/// Room for multipart boundaries and the other form fields above `max_file_size`
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub default_language: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<EngineRegistry>,
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<ServerConfig>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub available_engines: Vec<EngineInfo>,
    pub pipeline: PipelineConfig,
    pub max_file_size_bytes: usize,
    pub default_language: String,
}

/// Run the HTTP server
pub async fn run(config: &Config, server: ServerConfig) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(config)?.with_default(config.engine.as_deref())?;
    let pipeline = Pipeline::new(config.pipeline.clone())?;
    tracing::info!(
        "Available engines: {:?} (default: {})",
        registry.list(),
        registry.default_name()
    );

    let addr = format!("{}:{}", server.host, server.port);
    let state = AppState {
        registry: Arc::new(registry),
        pipeline: Arc::new(pipeline),
        config: Arc::new(server),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size
        .saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/upload", post(handle_upload))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Convert an uploaded PDF into a slide deck download
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut engine_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                file_data = Some(field.bytes().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "engine" => {
                engine_name = Some(field.text().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Invalid engine name: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let data = file_data.ok_or(AppError::MissingFile)?;
    if data.is_empty() {
        return Err(AppError::MissingFile);
    }
    if data.len() > state.config.max_file_size {
        return Err(AppError::FileTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let engine = state.registry.select(engine_name.as_deref())?;

    let mut temp_file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;
    temp_file
        .write_all(&data)
        .map_err(|e| AppError::Internal(format!("Failed to write temp file: {}", e)))?;

    // Preprocessing and OCR are CPU bound
    let pipeline = state.pipeline.clone();
    let (bytes, report) = tokio::task::spawn_blocking(move || {
        let (deck, report) = build_deck(
            temp_file.path(),
            &pipeline,
            engine.as_ref(),
            &ConvertOptions::default(),
        )?;
        Ok::<_, AppError>((deck.to_bytes()?, report))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Conversion task failed: {}", e)))??;

    tracing::info!(
        "Upload converted in {}ms: {} image(s), {} slide(s), {} skipped",
        start.elapsed().as_millis(),
        report.images_extracted,
        report.slides,
        report.batch.failed_count()
    );

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DECK_FILE_NAME),
            ),
        ],
        bytes,
    ))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.registry.default_name().to_string(),
        available_engines: state.registry.info(),
        pipeline: state.pipeline.config().clone(),
        max_file_size_bytes: state.config.max_file_size,
        default_language: state.config.default_language.clone(),
    })
}
