//! Individual preprocessing steps, in pipeline order

pub mod grayscale;
pub mod denoise;
pub mod contrast;
pub mod binarize;
pub mod morphology;
pub mod shadow;
pub mod resize;
pub mod adaptive_threshold;
pub mod sharpen;
pub mod deskew;
