use crate::error::PipelineError;
use crate::preprocessing::kernel::StructuringElement;
use crate::raster::RasterImage;
use imageproc::morphology::grayscale_close;

/// Morphological close: dilation followed by erosion with the same element
/// Fills pinholes and hairline gaps without growing the strokes overall
pub fn apply(image: RasterImage, element: StructuringElement) -> Result<RasterImage, PipelineError> {
    let gray = image.luma("morphological-close")?;
    let closed = grayscale_close(gray, &element.mask());
    Ok(match image {
        // max/min of two-valued samples stay two-valued
        RasterImage::Binary(_) => RasterImage::Binary(closed),
        _ => RasterImage::Grayscale(closed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Depth;
    use image::{GrayImage, Luma};

    #[test]
    fn test_close_fills_single_pixel_gap() {
        // Bright band with a one-pixel dark hole
        let mut img = GrayImage::from_pixel(12, 12, Luma([255]));
        img.put_pixel(6, 6, Luma([0]));

        let result = apply(RasterImage::Binary(img), StructuringElement::square(2)).unwrap();
        assert_eq!(result.depth(), Depth::Binary);
        assert_eq!(result.into_luma().get_pixel(6, 6).0[0], 255);
    }

    #[test]
    fn test_close_does_not_grow_large_regions() {
        // Dark page with a bright 4x4 block: closing keeps the block the same size
        let img = GrayImage::from_fn(12, 12, |x, y| {
            if (4..8).contains(&x) && (4..8).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });

        let result = apply(RasterImage::Binary(img.clone()), StructuringElement::square(3))
            .unwrap()
            .into_luma();
        assert_eq!(result, img);
    }
}
