use crate::error::PipelineError;
use crate::raster::RasterImage;
use image::{GrayImage, Luma};
use imageproc::filter::separable_filter_equal;

/// Gaussian adaptive thresholding
/// Each pixel is compared with the Gaussian-weighted mean of its
/// `block_size` x `block_size` neighbourhood minus `c`
pub fn apply(image: RasterImage, block_size: u32, c: f32) -> Result<RasterImage, PipelineError> {
    let gray = image.luma("adaptive-threshold")?;
    if block_size < 3 || block_size % 2 == 0 {
        return Err(PipelineError::invalid(
            "adaptive-threshold",
            format!("block size must be odd and >= 3, got {}", block_size),
        ));
    }

    let kernel = gaussian_kernel(block_size);
    let local_mean = separable_filter_equal(gray, &kernel);

    let binarized = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0] as f32;
        let threshold = local_mean.get_pixel(x, y).0[0] as f32 - c;
        if pixel > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    Ok(RasterImage::Binary(binarized))
}

/// Normalized 1-D Gaussian with `size` taps.
/// sigma follows the usual rule for a kernel of that size:
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let raw: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}
