use crate::error::PipelineError;
use crate::raster::RasterImage;
use image::imageops::{self, FilterType};

/// Width that keeps the aspect ratio at the given height, never below 1
pub fn target_width(width: u32, height: u32, target_height: u32) -> u32 {
    let scaled = (target_height as f64 * width as f64 / height as f64).round();
    (scaled as u32).max(1)
}

/// Resize to a fixed height, preserving aspect ratio
pub fn apply(image: RasterImage, target_height: u32) -> Result<RasterImage, PipelineError> {
    image.ensure_non_empty("resize")?;
    if target_height == 0 {
        return Err(PipelineError::invalid("resize", "target height must be at least 1"));
    }

    let (width, height) = image.dimensions();
    let new_width = target_width(width, height, target_height);

    // Skip resampling when the size already matches
    if (new_width, target_height) == (width, height) {
        return Ok(image);
    }

    Ok(match image {
        // Interpolation creates intermediate values, so binary becomes grayscale
        RasterImage::Grayscale(img) | RasterImage::Binary(img) => RasterImage::Grayscale(
            imageops::resize(&img, new_width, target_height, FilterType::Triangle),
        ),
        RasterImage::Color(img) => RasterImage::Color(imageops::resize(
            &img,
            new_width,
            target_height,
            FilterType::Triangle,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_resize_upscales_small_image() {
        let img = GrayImage::new(100, 50);
        let result = apply(RasterImage::Grayscale(img), 900).unwrap();
        assert_eq!(result.dimensions(), (1800, 900));
    }

    #[test]
    fn test_resize_downscales_large_image() {
        let img = GrayImage::new(2480, 3508);
        let result = apply(RasterImage::Grayscale(img), 900).unwrap();
        assert_eq!(result.height(), 900);
        assert_eq!(result.width(), 636);
    }

    #[test]
    fn test_resize_keeps_very_tall_image_at_least_one_wide() {
        assert_eq!(target_width(1, 5000, 900), 1);
        let img = GrayImage::new(1, 5000);
        let result = apply(RasterImage::Grayscale(img), 900).unwrap();
        assert_eq!(result.dimensions(), (1, 900));
    }

    #[test]
    fn test_target_width_rounds() {
        // 900 * 3 / 4 = 675 exactly; 900 * 5 / 7 = 642.86
        assert_eq!(target_width(3, 4, 900), 675);
        assert_eq!(target_width(5, 7, 900), 643);
    }
}
