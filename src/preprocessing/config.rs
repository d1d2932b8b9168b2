use super::kernel::{SharpenKernel, StructuringElement, MAX_ELEMENT_SIDE};
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which samples count as ink when estimating skew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ink {
    /// Foreground is every non-zero sample
    #[default]
    Light,
    /// Foreground is every sample below 255, for dark text on a white page
    Dark,
}

/// Parameters of the fixed preprocessing chain.
///
/// The chain order is not configurable; only the numbers are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Non-local means filter strength
    pub denoise_strength: f32,
    /// Side of the patch compared by non-local means (odd)
    pub denoise_template_window: u32,
    /// Side of the area searched for similar patches (odd)
    pub denoise_search_window: u32,
    pub contrast_alpha: f32,
    pub contrast_beta: f32,
    pub close_kernel: StructuringElement,
    pub shadow_dilate_kernel: StructuringElement,
    /// Median filter aperture used for the background estimate (odd)
    pub shadow_median_size: u32,
    pub target_height: u32,
    /// Adaptive threshold neighbourhood (odd, >= 3)
    pub adaptive_block_size: u32,
    pub adaptive_c: f32,
    pub sharpen_kernel: SharpenKernel,
    /// Skew corrections smaller than this are skipped
    pub min_rotation_degrees: f32,
    pub deskew_ink: Ink,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            denoise_strength: 10.0,
            denoise_template_window: 7,
            denoise_search_window: 21,
            contrast_alpha: 1.5,
            contrast_beta: 0.0,
            close_kernel: StructuringElement::square(2),
            shadow_dilate_kernel: StructuringElement::square(7),
            shadow_median_size: 21,
            target_height: 900,
            adaptive_block_size: 11,
            adaptive_c: 2.0,
            sharpen_kernel: SharpenKernel::default(),
            min_rotation_degrees: 0.1,
            deskew_ink: Ink::Light,
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            PipelineError::InvalidConfig(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        fn odd(name: &str, value: u32, min: u32) -> Result<(), PipelineError> {
            if value < min || value % 2 == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{} must be odd and at least {}, got {}",
                    name, min, value
                )));
            }
            Ok(())
        }

        odd("denoise_template_window", self.denoise_template_window, 1)?;
        odd("denoise_search_window", self.denoise_search_window, 1)?;
        odd("shadow_median_size", self.shadow_median_size, 1)?;
        odd("adaptive_block_size", self.adaptive_block_size, 3)?;

        if !(self.denoise_strength > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "denoise_strength must be positive, got {}",
                self.denoise_strength
            )));
        }
        if self.close_kernel.is_empty() || self.shadow_dilate_kernel.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "structuring elements must be at least 1x1".to_string(),
            ));
        }
        if !self.close_kernel.fits_mask() || !self.shadow_dilate_kernel.fits_mask() {
            return Err(PipelineError::InvalidConfig(format!(
                "structuring elements must be at most {}x{}",
                MAX_ELEMENT_SIDE, MAX_ELEMENT_SIDE
            )));
        }
        if self.target_height == 0 {
            return Err(PipelineError::InvalidConfig(
                "target_height must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
