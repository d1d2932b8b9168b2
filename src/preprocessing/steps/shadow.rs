use crate::error::PipelineError;
use crate::preprocessing::kernel::StructuringElement;
use crate::raster::RasterImage;
use image::{GrayImage, Luma};
use imageproc::filter::median_filter;
use imageproc::morphology::grayscale_dilate;

/// Background estimate parameters
#[derive(Debug, Clone, Copy)]
pub struct ShadowParams {
    pub dilate: StructuringElement,
    /// Odd median aperture
    pub median_size: u32,
}

/// Flatten illumination by dividing the image by an estimate of its background
///
/// The background is the median of a dilated copy: dilation wipes out dark
/// strokes, the wide median smooths what is left into the lighting gradient.
/// Color input goes through the same luma conversion as the grayscale stage.
pub fn apply(image: RasterImage, params: ShadowParams) -> Result<RasterImage, PipelineError> {
    image.ensure_non_empty("remove-shadows")?;
    let gray = image.into_luma();

    let radius = params.median_size / 2;
    let dilated = grayscale_dilate(&gray, &params.dilate.mask());
    let background = median_filter(&dilated, radius, radius);

    let flattened = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0];
        let bg = background.get_pixel(x, y).0[0];
        Luma([divide(pixel, bg)])
    });
    Ok(RasterImage::Grayscale(flattened))
}

/// `pixel / background` rescaled to 0..=255, truncated.
/// A zero background leaves ink (0) as ink and saturates anything brighter.
fn divide(pixel: u8, background: u8) -> u8 {
    if background == 0 {
        return if pixel == 0 { 0 } else { 255 };
    }
    (pixel as f32 / background as f32 * 255.0).clamp(0.0, 255.0) as u8
}
