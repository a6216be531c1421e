use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

use crate::canvas::types::{Canvas, SourceImage};
use crate::geometry::Placement;

/// Composite a premultiplied RGBA color over one destination pixel
fn blend_over(dst: &mut [u8], src: [f32; 4]) {
    let src_a = src[3];
    if src_a <= 0.0 {
        return;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }

    for c in 0..3 {
        let dst_c = dst[c] as f32 / 255.0;
        let out = (src[c] + dst_c * dst_a * (1.0 - src_a)) / out_a;
        dst[c] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Bilinear sample at continuous source coordinates, premultiplied, 0..1
fn sample_bilinear(image: &RgbaImage, u: f64, v: f64) -> [f32; 4] {
    let max_x = (image.width() - 1) as f64;
    let max_y = (image.height() - 1) as f64;
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = (u - x0 as f64) as f32;
    let fy = (v - y0 as f64) as f32;

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x1, y0, fx * (1.0 - fy)),
        (x0, y1, (1.0 - fx) * fy),
        (x1, y1, fx * fy),
    ];

    let mut out = [0.0f32; 4];
    for (x, y, weight) in taps {
        let p = image.get_pixel(x, y).0;
        let a = p[3] as f32 / 255.0;
        out[0] += p[0] as f32 / 255.0 * a * weight;
        out[1] += p[1] as f32 / 255.0 * a * weight;
        out[2] += p[2] as f32 / 255.0 * a * weight;
        out[3] += a * weight;
    }
    out
}

/// Half-open pixel span whose centers fall inside `[start, start + len)`
fn covered_span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let first = (start - 0.5).ceil().max(0.0);
    let end = (start + len - 0.5).ceil().min(limit as f64);
    if end <= first {
        (0, 0)
    } else {
        (first as u32, end as u32)
    }
}

/// Bilinear taps skip source pixels beyond this shrink factor
const MAX_BILINEAR_SHRINK: f64 = 2.0;

/// Triangle-filter `image` toward the placement size on any axis shrunk past
/// [`MAX_BILINEAR_SHRINK`], so every source pixel contributes
fn prefilter(image: &RgbaImage, placement: &Placement) -> Option<RgbaImage> {
    let reduce = |source: u32, target: f64| {
        if source as f64 / target > MAX_BILINEAR_SHRINK {
            (target.ceil() as u32).clamp(1, source)
        } else {
            source
        }
    };
    let width = reduce(image.width(), placement.width);
    let height = reduce(image.height(), placement.height);
    if (width, height) == image.dimensions() {
        return None;
    }
    Some(imageops::resize(image, width, height, FilterType::Triangle))
}

/// Draw `source` scaled into `placement`
///
/// Only the canvas bounds clip the result. Heavy downscales are prefiltered
/// before sampling. Rows are sampled in parallel.
pub fn draw_scaled(canvas: &mut Canvas, source: &SourceImage, placement: &Placement) {
    let (canvas_w, canvas_h) = (canvas.width(), canvas.height());
    let (x_start, x_end) = covered_span(placement.x, placement.width, canvas_w);
    let (y_start, y_end) = covered_span(placement.y, placement.height, canvas_h);
    if x_start == x_end || y_start == y_end {
        return;
    }

    if source.width() == 0 || source.height() == 0 {
        return;
    }
    let reduced = prefilter(source.as_image(), placement);
    let image = reduced.as_ref().unwrap_or_else(|| source.as_image());
    let scale_x = image.width() as f64 / placement.width;
    let scale_y = image.height() as f64 / placement.height;
    let stride = canvas_w as usize * 4;

    let buffer: &mut [u8] = canvas.as_image_mut();
    buffer
        .par_chunks_mut(stride)
        .enumerate()
        .skip(y_start as usize)
        .take((y_end - y_start) as usize)
        .for_each(|(py, row)| {
            let v = (py as f64 + 0.5 - placement.y) * scale_y - 0.5;
            for px in x_start..x_end {
                let u = (px as f64 + 0.5 - placement.x) * scale_x - 0.5;
                let offset = px as usize * 4;
                blend_over(&mut row[offset..offset + 4], sample_bilinear(image, u, v));
            }
        });
}

/// Draw `source` at native size with its top-left corner at `(x, y)`
pub fn draw_native(canvas: &mut Canvas, source: &SourceImage, x: i64, y: i64) {
    let image = source.as_image();
    let target = canvas.as_image_mut();

    for (sx, sy, pixel) in image.enumerate_pixels() {
        let tx = x + sx as i64;
        let ty = y + sy as i64;
        if tx < 0 || ty < 0 || tx >= target.width() as i64 || ty >= target.height() as i64 {
            continue;
        }

        let a = pixel[3] as f32 / 255.0;
        let src = [
            pixel[0] as f32 / 255.0 * a,
            pixel[1] as f32 / 255.0 * a,
            pixel[2] as f32 / 255.0 * a,
            a,
        ];
        blend_over(&mut target.get_pixel_mut(tx as u32, ty as u32).0, src);
    }
}

/// Paint `color` through a coverage mask whose top-left sits at `(x, y)`
///
/// The effective alpha is `color alpha * opacity * coverage`.
pub fn draw_mask(canvas: &mut Canvas, mask: &GrayImage, x: i64, y: i64, color: [u8; 4], opacity: f32) {
    let target = canvas.as_image_mut();
    let base_alpha = color[3] as f32 / 255.0 * opacity;

    for (mx, my, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let tx = x + mx as i64;
        let ty = y + my as i64;
        if tx < 0 || ty < 0 || tx >= target.width() as i64 || ty >= target.height() as i64 {
            continue;
        }

        let a = base_alpha * coverage[0] as f32 / 255.0;
        let src = [
            color[0] as f32 / 255.0 * a,
            color[1] as f32 / 255.0 * a,
            color[2] as f32 / 255.0 * a,
            a,
        ];
        blend_over(&mut target.get_pixel_mut(tx as u32, ty as u32).0, src);
    }
}
