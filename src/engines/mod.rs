//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::AppError;
use serde::Serialize;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supported_languages: Vec<String>,
}

impl EngineInfo {
    pub fn of(engine: &dyn OcrEngine) -> Self {
        Self {
            name: engine.name(),
            description: engine.description(),
            supported_languages: engine.supported_languages(),
        }
    }
}

/// Registry of available OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a new engine registry with all compiled-in engines initialized
    #[allow(unused_variables, unused_mut)]
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
        }

        #[cfg(feature = "engine-leptess")]
        {
            tracing::info!("Initializing leptess engine...");
            engines.push(Arc::new(leptess::LeptessEngine::new(config)?));
        }

        Self::from_engines(engines)
    }

    /// Build a registry from already constructed engines; the first one is the default
    pub fn from_engines(engines: Vec<Arc<dyn OcrEngine>>) -> Result<Self, AppError> {
        let default_engine = engines
            .first()
            .map(|e| e.name().to_string())
            .ok_or_else(|| {
                AppError::InitializationError(
                    "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
                )
            })?;

        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Make `name` the default engine; `None` keeps the current default
    pub fn with_default(mut self, name: Option<&str>) -> Result<Self, AppError> {
        if let Some(name) = name {
            self.default_engine = self.select(Some(name))?.name().to_string();
        }
        Ok(self)
    }

    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default(&self) -> Option<Arc<dyn OcrEngine>> {
        self.get(&self.default_engine)
    }

    /// Resolve an optional engine name, falling back to the default
    pub fn select(&self, name: Option<&str>) -> Result<Arc<dyn OcrEngine>, AppError> {
        match name {
            Some(name) => self.get(name).ok_or_else(|| {
                AppError::InvalidRequest(format!(
                    "Unknown engine '{}', available: {}",
                    name,
                    self.list().join(", ")
                ))
            }),
            None => self
                .default()
                .ok_or_else(|| AppError::Internal("Default engine missing".to_string())),
        }
    }

    /// List all available engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines.iter().map(|e| EngineInfo::of(e.as_ref())).collect()
    }
}

/// Ensure a model file is cached and return its path
#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
fn ensure_model_downloaded(url: &str, relative_path: &str) -> Result<std::path::PathBuf, AppError> {
    let model_path = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("scan2deck")
        .join(relative_path);

    if let Some(dir) = model_path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::InitializationError(format!("Failed to create cache directory: {}", e))
        })?;
    }

    if model_path.exists() {
        tracing::info!("Using cached model from {:?}", model_path);
    } else {
        tracing::info!("Downloading {} (this may take a moment)...", relative_path);
        download_file(url, &model_path)?;
        tracing::info!("Downloaded {} to {:?}", relative_path, model_path);
    }

    Ok(model_path)
}

/// Download a file from URL to path using ureq
#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
fn download_file(url: &str, path: &std::path::Path) -> Result<(), AppError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| AppError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        AppError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    std::fs::write(path, &buffer)
        .map_err(|e| AppError::InitializationError(format!("Failed to write model file: {}", e)))?;

    Ok(())
}
