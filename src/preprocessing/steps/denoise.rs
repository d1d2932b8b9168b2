use crate::error::PipelineError;
use crate::raster::RasterImage;
use image::{GrayImage, Luma};

/// Non-local means parameters
#[derive(Debug, Clone, Copy)]
pub struct NlMeans {
    /// Filter strength; larger values smooth more
    pub h: f32,
    pub template_window: u32,
    pub search_window: u32,
}

/// Apply non-local means denoising
/// Averages each pixel with pixels whose surrounding patches look alike
pub fn apply(image: RasterImage, params: NlMeans) -> Result<RasterImage, PipelineError> {
    let gray = image.luma("denoise")?;
    Ok(RasterImage::Grayscale(nl_means(gray, params)))
}

/// Weights below this are treated as zero
const MIN_WEIGHT: f32 = 1e-3;

/// For every search offset, patch distances come from an integral image of
/// squared differences, so the cost per offset is linear in the pixel count.
fn nl_means(img: &GrayImage, params: NlMeans) -> GrayImage {
    let (width, height) = img.dimensions();
    let (w, h) = (width as usize, height as usize);
    let template_radius = (params.template_window / 2) as usize;
    let search_radius = (params.search_window / 2) as usize;

    let pad = template_radius + search_radius;
    let padded = replicate_border(img, pad);
    let stride = w + 2 * pad;
    let table = weight_table(params);

    // Squared-difference plane covers the image plus a template-radius margin
    let (pw, ph) = (w + 2 * template_radius, h + 2 * template_radius);
    let mut integral = vec![0u64; (pw + 1) * (ph + 1)];
    let span = 2 * template_radius + 1;

    let mut weighted = vec![0f64; w * h];
    let mut weights = vec![0f64; w * h];

    let radius = search_radius as isize;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let offset = dy * stride as isize + dx;

            for py in 0..ph {
                let row = (py + search_radius) * stride + search_radius;
                let mut row_sum = 0u64;
                for px in 0..pw {
                    let a = padded[row + px] as i32;
                    let b = padded[((row + px) as isize + offset) as usize] as i32;
                    row_sum += ((a - b) * (a - b)) as u64;
                    integral[(py + 1) * (pw + 1) + px + 1] =
                        integral[py * (pw + 1) + px + 1] + row_sum;
                }
            }

            for y in 0..h {
                for x in 0..w {
                    // Patch centred on (x, y) spans [x, x + span) in integral coordinates
                    let (x1, y1) = (x + span, y + span);
                    let ssd = integral[y1 * (pw + 1) + x1] + integral[y * (pw + 1) + x]
                        - integral[y * (pw + 1) + x1]
                        - integral[y1 * (pw + 1) + x];
                    let Some(&weight) = table.get(ssd as usize) else {
                        continue;
                    };

                    let centre = (y + pad) * stride + x + pad;
                    let neighbour = padded[(centre as isize + offset) as usize];
                    let idx = y * w + x;
                    weighted[idx] += weight as f64 * neighbour as f64;
                    weights[idx] += weight as f64;
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let idx = y as usize * w + x as usize;
        // The zero offset always contributes weight 1, so the sum is never zero
        let value = weighted[idx] / weights[idx];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Copy of `img` with `pad` samples of replicated border on every side
fn replicate_border(img: &GrayImage, pad: usize) -> Vec<u8> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let raw = img.as_raw();
    let mut padded = Vec::with_capacity((w + 2 * pad) * (h + 2 * pad));
    for py in 0..h + 2 * pad {
        let y = py.saturating_sub(pad).min(h - 1);
        let row = &raw[y * w..(y + 1) * w];
        padded.extend(std::iter::repeat(row[0]).take(pad));
        padded.extend_from_slice(row);
        padded.extend(std::iter::repeat(row[w - 1]).take(pad));
    }
    padded
}

/// `exp(-ssd / (area * h^2))` for every integer patch SSD whose weight is at
/// least [`MIN_WEIGHT`]. Distances past the end of the table weigh nothing.
fn weight_table(params: NlMeans) -> Vec<f32> {
    let area = (params.template_window * params.template_window) as f64;
    let scale = area * (params.h as f64) * (params.h as f64);
    let max_ssd = area * 255.0 * 255.0;
    let cutoff = (-(MIN_WEIGHT as f64).ln() * scale).min(max_ssd).floor() as usize;
    (0..=cutoff)
        .map(|ssd| (-(ssd as f64) / scale).exp() as f32)
        .collect()
}
