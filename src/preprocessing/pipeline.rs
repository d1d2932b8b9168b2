use crate::error::PipelineError;
use crate::raster::RasterImage;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::config::PipelineConfig;
use super::steps::{self, deskew::SkewAngle};

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Normalized image (not serialized)
    #[serde(skip)]
    pub image: RasterImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Rotation estimated by the deskew step, if the page had any ink
    pub skew: Option<SkewAngle>,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// The fixed preprocessing chain.
///
/// grayscale → denoise → contrast → binarize → close → remove shadows →
/// resize → adaptive threshold → sharpen → deskew. The order is fixed; only
/// the parameters come from [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode a file and run the chain on it
    pub fn process_file(&self, path: &Path) -> Result<PreprocessingResult, PipelineError> {
        let start = Instant::now();
        let image = RasterImage::open(path)?;
        let decode = StepTiming {
            name: "decode".to_string(),
            time_ms: start.elapsed().as_millis() as u64,
        };

        let mut result = self.process(image)?;
        result.steps.insert(0, decode);
        result.total_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Shorthand for [`Pipeline::process`] when only the image matters
    pub fn preprocess(&self, image: RasterImage) -> Result<RasterImage, PipelineError> {
        Ok(self.process(image)?.image)
    }

    /// Run every step in order on an already decoded image
    pub fn process(&self, image: RasterImage) -> Result<PreprocessingResult, PipelineError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let config = &self.config;

        image.ensure_non_empty("pipeline")?;
        let mut img = image;

        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;

        let nl_means = steps::denoise::NlMeans {
            h: config.denoise_strength,
            template_window: config.denoise_template_window,
            search_window: config.denoise_search_window,
        };
        img = self.run_step("denoise", img, &mut steps_timing, |i| {
            steps::denoise::apply(i, nl_means)
        })?;

        img = self.run_step("contrast", img, &mut steps_timing, |i| {
            steps::contrast::apply(i, config.contrast_alpha, config.contrast_beta)
        })?;

        img = self.run_step("binarize", img, &mut steps_timing, steps::binarize::apply)?;

        img = self.run_step("morphological-close", img, &mut steps_timing, |i| {
            steps::morphology::apply(i, config.close_kernel)
        })?;

        let shadow = steps::shadow::ShadowParams {
            dilate: config.shadow_dilate_kernel,
            median_size: config.shadow_median_size,
        };
        img = self.run_step("remove-shadows", img, &mut steps_timing, |i| {
            steps::shadow::apply(i, shadow)
        })?;

        img = self.run_step("resize", img, &mut steps_timing, |i| {
            steps::resize::apply(i, config.target_height)
        })?;

        img = self.run_step("adaptive-threshold", img, &mut steps_timing, |i| {
            steps::adaptive_threshold::apply(i, config.adaptive_block_size, config.adaptive_c)
        })?;

        img = self.run_step("sharpen", img, &mut steps_timing, |i| {
            steps::sharpen::apply(i, &config.sharpen_kernel)
        })?;

        let mut skew = None;
        img = self.run_step("deskew", img, &mut steps_timing, |i| {
            let (rotated, angle) =
                steps::deskew::apply(i, config.deskew_ink, config.min_rotation_degrees)?;
            skew = angle;
            Ok(rotated)
        })?;

        tracing::debug!(
            "Preprocessed to {}x{} {} image, skew {:?}",
            img.width(),
            img.height(),
            img.depth().as_str(),
            skew.map(|a| a.degrees())
        );

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            skew,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: RasterImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<RasterImage, PipelineError>
    where
        F: FnOnce(RasterImage) -> Result<RasterImage, PipelineError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        tracing::trace!("Step {} produced {}x{}", name, result.width(), result.height());
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}
