//! Raster images with an explicit, checked color depth.
//!
//! Stages never infer depth from buffer shape: the variant is the tag.

use crate::error::PipelineError;
use image::{DynamicImage, GrayImage, RgbImage};
use serde::Serialize;
use std::path::Path;

/// Color depth tag carried by every [`RasterImage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Grayscale,
    /// Single channel, every sample is 0 or 255
    Binary,
    Color,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Binary => "binary",
            Self::Color => "color",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RasterImage {
    Grayscale(GrayImage),
    Binary(GrayImage),
    Color(RgbImage),
}

impl RasterImage {
    /// Decode an image file. Single-channel files stay grayscale, everything
    /// else is decoded to 8-bit color.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let decoded = image::open(path)
            .map_err(|e| PipelineError::Decode(format!("{}: {}", path.display(), e)))?;
        Self::from_dynamic(decoded)
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, PipelineError> {
        let raster = match image {
            DynamicImage::ImageLuma8(gray) => Self::Grayscale(gray),
            gray @ (DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_)) => {
                Self::Grayscale(gray.to_luma8())
            }
            other => Self::Color(other.to_rgb8()),
        };
        raster.ensure_non_empty("decode")?;
        Ok(raster)
    }

    pub fn depth(&self) -> Depth {
        match self {
            Self::Grayscale(_) => Depth::Grayscale,
            Self::Binary(_) => Depth::Binary,
            Self::Color(_) => Depth::Color,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Grayscale(img) | Self::Binary(img) => img.dimensions(),
            Self::Color(img) => img.dimensions(),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Fail with `InvalidImage` if either dimension is zero
    pub fn ensure_non_empty(&self, stage: &'static str) -> Result<(), PipelineError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::invalid(
                stage,
                format!("empty image ({}x{})", width, height),
            ));
        }
        Ok(())
    }

    /// Borrow the single channel of a grayscale or binary image.
    ///
    /// Color images are rejected: stages that need one channel must be
    /// preceded by an explicit conversion.
    pub fn luma(&self, stage: &'static str) -> Result<&GrayImage, PipelineError> {
        self.ensure_non_empty(stage)?;
        match self {
            Self::Grayscale(img) | Self::Binary(img) => Ok(img),
            Self::Color(_) => Err(PipelineError::invalid(
                stage,
                "expected a single-channel image, got color",
            )),
        }
    }

    /// Consume into a single channel, converting color with the `image`
    /// crate's luma weights.
    pub fn into_luma(self) -> GrayImage {
        match self {
            Self::Grayscale(img) | Self::Binary(img) => img,
            Self::Color(img) => DynamicImage::ImageRgb8(img).to_luma8(),
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Grayscale(img) | Self::Binary(img) => DynamicImage::ImageLuma8(img),
            Self::Color(img) => DynamicImage::ImageRgb8(img),
        }
    }
}

/// True when every sample is 0 or 255
pub fn is_two_valued(img: &GrayImage) -> bool {
    img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
}
