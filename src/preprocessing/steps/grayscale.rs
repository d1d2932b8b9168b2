use crate::error::PipelineError;
use crate::raster::RasterImage;

/// Convert image to grayscale
/// Single-channel images pass through untouched, so a binary input keeps its tag
pub fn apply(image: RasterImage) -> Result<RasterImage, PipelineError> {
    image.ensure_non_empty("grayscale")?;
    match image {
        RasterImage::Color(_) => Ok(RasterImage::Grayscale(image.into_luma())),
        single_channel => Ok(single_channel),
    }
}
