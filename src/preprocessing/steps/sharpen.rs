use crate::error::PipelineError;
use crate::preprocessing::kernel::SharpenKernel;
use crate::raster::{is_two_valued, RasterImage};
use image::GrayImage;
use imageproc::filter::filter3x3;

/// Apply 3x3 high-pass sharpening
/// Crisps character edges before OCR
pub fn apply(image: RasterImage, kernel: &SharpenKernel) -> Result<RasterImage, PipelineError> {
    let was_binary = matches!(image, RasterImage::Binary(_));
    let gray = image.luma("sharpen")?;

    let sharpened: GrayImage = filter3x3(gray, &kernel.0);

    // With the default kernel a two-valued input stays two-valued
    if was_binary && is_two_valued(&sharpened) {
        Ok(RasterImage::Binary(sharpened))
    } else {
        Ok(RasterImage::Grayscale(sharpened))
    }
}
