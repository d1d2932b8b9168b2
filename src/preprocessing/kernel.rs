//! Structuring elements and convolution kernels

use image::{GrayImage, Luma};
use imageproc::morphology::Mask;
use serde::{Deserialize, Serialize};

/// Largest side a [`Mask`] accepts
pub const MAX_ELEMENT_SIDE: u32 = 511;

/// All-ones rectangular structuring element, anchored at `(width / 2, height / 2)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringElement {
    pub width: u32,
    pub height: u32,
}

impl StructuringElement {
    pub const fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_mask(&self) -> bool {
        self.width <= MAX_ELEMENT_SIDE && self.height <= MAX_ELEMENT_SIDE
    }

    /// The element as an imageproc mask.
    ///
    /// Callers go through [`PipelineConfig::validate`](super::PipelineConfig::validate),
    /// which keeps both sides within `1..=MAX_ELEMENT_SIDE`.
    pub fn mask(&self) -> Mask {
        let ones = GrayImage::from_pixel(self.width, self.height, Luma([255]));
        Mask::from_image(&ones, (self.width / 2) as u8, (self.height / 2) as u8)
    }
}

/// 3x3 convolution weights in row-major order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpenKernel(pub [f32; 9]);

impl Default for SharpenKernel {
    /// High-pass kernel: centre 9, ring -1
    fn default() -> Self {
        Self([-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::morphology::{grayscale_dilate, grayscale_erode};

    fn single_bright_pixel() -> GrayImage {
        let mut img = GrayImage::from_pixel(7, 7, Luma([0]));
        img.put_pixel(3, 3, Luma([200]));
        img
    }

    #[test]
    fn test_dilate_spreads_bright_pixel() {
        let mask = StructuringElement::square(3).mask();
        let dilated = grayscale_dilate(&single_bright_pixel(), &mask);

        assert_eq!(dilated.get_pixel(2, 2).0[0], 200);
        assert_eq!(dilated.get_pixel(4, 4).0[0], 200);
        assert_eq!(dilated.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_even_element_anchor_looks_backwards() {
        // 2x2 anchored at (1, 1) covers [x - 1, x] x [y - 1, y], so the
        // bright pixel spreads right and down only
        let mask = StructuringElement::square(2).mask();
        let dilated = grayscale_dilate(&single_bright_pixel(), &mask);

        assert_eq!(dilated.get_pixel(4, 4).0[0], 200);
        assert_eq!(dilated.get_pixel(3, 4).0[0], 200);
        assert_eq!(dilated.get_pixel(2, 2).0[0], 0);
        assert_eq!(dilated.get_pixel(2, 3).0[0], 0);
    }

    #[test]
    fn test_erode_removes_isolated_bright_pixel() {
        let mask = StructuringElement::square(3).mask();
        let eroded = grayscale_erode(&single_bright_pixel(), &mask);

        assert!(eroded.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_rectangular_element_mask() {
        let element = StructuringElement {
            width: 5,
            height: 1,
        };
        assert!(element.fits_mask());
        let dilated = grayscale_dilate(&single_bright_pixel(), &element.mask());

        assert_eq!(dilated.get_pixel(1, 3).0[0], 200);
        assert_eq!(dilated.get_pixel(5, 3).0[0], 200);
        assert_eq!(dilated.get_pixel(3, 2).0[0], 0);
    }

    #[test]
    fn test_oversized_element_does_not_fit() {
        assert!(!StructuringElement::square(MAX_ELEMENT_SIDE + 1).fits_mask());
        assert!(StructuringElement::square(MAX_ELEMENT_SIDE).fits_mask());
    }
}
