use crate::error::PipelineError;
use crate::raster::RasterImage;
use image::{GrayImage, Luma};

/// Linear contrast adjustment: `out = clamp(alpha * in + beta, 0, 255)`
/// alpha above 1 stretches contrast, beta shifts brightness
pub fn apply(image: RasterImage, alpha: f32, beta: f32) -> Result<RasterImage, PipelineError> {
    let gray = image.luma("contrast")?;
    let adjusted = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0] as f32;
        Luma([(alpha * pixel + beta).round().clamp(0.0, 255.0) as u8])
    });
    Ok(RasterImage::Grayscale(adjusted))
}
