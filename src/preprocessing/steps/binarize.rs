use crate::error::PipelineError;
use crate::raster::RasterImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Global binarization with an Otsu-selected threshold
/// Samples above the level become 255, the rest 0
pub fn apply(image: RasterImage) -> Result<RasterImage, PipelineError> {
    let gray = image.luma("binarize")?;
    let level = otsu_level(gray);
    tracing::trace!("Otsu level {}", level);
    Ok(RasterImage::Binary(threshold(gray, level, ThresholdType::Binary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{is_two_valued, Depth};
    use image::{GrayImage, Luma};

    #[test]
    fn test_binarize_outputs_only_two_values() {
        let img = GrayImage::from_fn(64, 32, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));

        let result = apply(RasterImage::Grayscale(img)).unwrap();
        assert_eq!(result.depth(), Depth::Binary);
        assert!(is_two_valued(&result.into_luma()));
    }

    #[test]
    fn test_binarize_separates_text_from_page() {
        let mut img = GrayImage::from_pixel(40, 20, Luma([210]));
        for x in 5..35 {
            img.put_pixel(x, 10, Luma([30]));
        }

        let result = apply(RasterImage::Grayscale(img)).unwrap().into_luma();

        assert_eq!(result.get_pixel(20, 10).0[0], 0);
        assert_eq!(result.get_pixel(20, 3).0[0], 255);
    }

    #[test]
    fn test_binarize_is_deterministic() {
        let img = GrayImage::from_fn(30, 30, |x, y| Luma([((x * y) % 251) as u8]));
        let first = apply(RasterImage::Grayscale(img.clone())).unwrap();
        let second = apply(RasterImage::Grayscale(img)).unwrap();
        assert_eq!(first, second);
    }
}
