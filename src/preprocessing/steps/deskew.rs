use crate::error::PipelineError;
use crate::preprocessing::config::Ink;
use crate::raster::RasterImage;
use image::{GrayImage, Luma};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use serde::Serialize;

/// Rotation in degrees; positive is counter-clockwise on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkewAngle(pub f32);

impl SkewAngle {
    pub fn degrees(&self) -> f32 {
        self.0
    }
}

/// Deskew image by estimating the text block orientation and rotating it
/// back to horizontal. Blank pages pass through unrotated.
pub fn apply(
    image: RasterImage,
    ink: Ink,
    min_rotation_degrees: f32,
) -> Result<(RasterImage, Option<SkewAngle>), PipelineError> {
    let gray = image.luma("deskew")?;

    let Some(angle) = estimate_skew(gray, ink) else {
        tracing::debug!("No foreground pixels, skipping deskew");
        return Ok((image, None));
    };

    // Skip if angle is negligible
    if angle.degrees().abs() < min_rotation_degrees {
        return Ok((image, Some(angle)));
    }

    let rotated = rotate(gray, angle);
    Ok((RasterImage::Grayscale(rotated), Some(angle)))
}

/// Estimate the rotation that makes text lines horizontal.
///
/// Fits a minimum-area rectangle around the foreground, takes its angle
/// in (-90, 0] and folds it so the long text direction ends up horizontal
/// rather than vertical. `None` when there is no foreground at all.
pub fn estimate_skew(img: &GrayImage, ink: Ink) -> Option<SkewAngle> {
    let points = foreground_extremes(img, ink);
    if points.is_empty() {
        return None;
    }

    let hull = convex_hull(points.as_slice());
    let theta = min_area_rect_angle(&hull);

    let corrected = if theta < -45.0 { -(90.0 + theta) } else { -theta };
    Some(SkewAngle(corrected))
}

fn is_foreground(value: u8, ink: Ink) -> bool {
    match ink {
        Ink::Light => value != 0,
        Ink::Dark => value != 255,
    }
}

/// Leftmost and rightmost foreground pixel of every row.
/// Interior points never lie on the convex hull, so dropping them is exact.
fn foreground_extremes(img: &GrayImage, ink: Ink) -> Vec<Point<i32>> {
    let (width, height) = img.dimensions();
    let mut points = Vec::new();
    for y in 0..height {
        let first = (0..width).find(|&x| is_foreground(img.get_pixel(x, y).0[0], ink));
        if let Some(first) = first {
            let last = (first..width)
                .rev()
                .find(|&x| is_foreground(img.get_pixel(x, y).0[0], ink))
                .unwrap_or(first);
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }
    points
}

/// Angle in (-90, 0] of the minimum-area rectangle enclosing the hull.
///
/// The optimal rectangle has one side collinear with a hull edge, so every
/// edge direction is tried. Angles are measured with y pointing up, which
/// makes a baseline that falls to the right negative.
fn min_area_rect_angle(hull: &[Point<i32>]) -> f32 {
    let mut best: Option<(f64, f64)> = None;

    for (i, a) in hull.iter().enumerate() {
        let b = hull[(i + 1) % hull.len()];
        let (ex, ey) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
        let length = ex.hypot(ey);
        if length == 0.0 {
            continue;
        }
        let (ux, uy) = (ex / length, ey / length);

        let (mut min_u, mut max_u, mut min_v, mut max_v) =
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in hull {
            let (px, py) = (p.x as f64, p.y as f64);
            let u = px * ux + py * uy;
            let v = -px * uy + py * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        let area = (max_u - min_u) * (max_v - min_v);

        // Flip y so the angle reads counter-clockwise
        let angle = (-ey).atan2(ex).to_degrees();
        if best.map_or(true, |(best_area, _)| area < best_area) {
            best = Some((area, angle));
        }
    }

    best.map_or(0.0, |(_, angle)| fold_angle(angle) as f32)
}

/// Rectangle sides repeat every 90 degrees; fold into (-90, 0]
fn fold_angle(mut angle: f64) -> f64 {
    while angle > 0.0 {
        angle -= 90.0;
    }
    while angle <= -90.0 {
        angle += 90.0;
    }
    angle
}

/// Rotate about `(w / 2, h / 2)` keeping the input dimensions.
/// Bicubic sampling with replicated border pixels.
pub fn rotate(img: &GrayImage, angle: SkewAngle) -> GrayImage {
    let (width, height) = img.dimensions();
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let radians = angle.degrees().to_radians();
    let (sin, cos) = radians.sin_cos();

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        // Inverse map: destination pixel back into the source
        let sx = cos * dx - sin * dy + cx;
        let sy = sin * dx + cos * dy + cy;
        Luma([sample_bicubic(img, sx, sy)])
    })
}

fn cubic_weight(t: f32) -> f32 {
    const A: f32 = -0.75;
    let t = t.abs();
    if t <= 1.0 {
        ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        ((A * t - 5.0 * A) * t + 8.0 * A) * t - 4.0 * A
    } else {
        0.0
    }
}

fn sample_bicubic(img: &GrayImage, x: f32, y: f32) -> u8 {
    let (width, height) = img.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let (fx, fy) = (x - x0, y - y0);

    let mut acc = 0.0f32;
    for j in -1..=2i32 {
        let wy = cubic_weight(fy - j as f32);
        let sy = (y0 as i64 + j as i64).clamp(0, height as i64 - 1) as u32;
        for i in -1..=2i32 {
            let wx = cubic_weight(fx - i as f32);
            let sx = (x0 as i64 + i as i64).clamp(0, width as i64 - 1) as u32;
            acc += wx * wy * img.get_pixel(sx, sy).0[0] as f32;
        }
    }
    acc.round().clamp(0.0, 255.0) as u8
}
