//! Image preprocessing for OCR
//!
//! A fixed chain of classical transforms that turns a raw scan into a clean,
//! deskewed binary image of a known height.

pub mod config;
pub mod kernel;
pub mod pipeline;
pub mod steps;

pub use config::{Ink, PipelineConfig};
pub use kernel::{SharpenKernel, StructuringElement};
pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};
pub use steps::deskew::SkewAngle;
