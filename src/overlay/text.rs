use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{draw_mask, Canvas};
use crate::error::{OverlayError, Result};
use crate::overlay::color::Color;

/// Outline width of the stroke pass, in pixels
pub const STROKE_WIDTH: f32 = 3.0;

/// Drop shadow blur radius; the Gaussian sigma is half of it
pub const SHADOW_BLUR: f32 = 10.0;

/// Drop shadow offset in pixels
pub const SHADOW_OFFSET: (i64, i64) = (2, 2);

/// Drop shadow opacity
pub const SHADOW_OPACITY: f32 = 0.5;

/// Text drawn over a composed thumbnail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    #[serde(default)]
    pub content: String,

    /// Font family name, resolved by the glyph rasterizer
    #[serde(default = "default_font")]
    pub font: String,

    /// Pixel size of the em box
    #[serde(default = "default_size")]
    pub size: f32,

    #[serde(default = "default_color")]
    pub color: String,

    /// Horizontal anchor as a percentage of canvas width
    #[serde(default = "default_position")]
    pub pos_x: f64,

    /// Vertical anchor as a percentage of canvas height
    #[serde(default = "default_position")]
    pub pos_y: f64,

    #[serde(default)]
    pub stroke: bool,

    #[serde(default)]
    pub shadow: bool,
}

fn default_font() -> String {
    "Arial".to_string()
}

fn default_size() -> f32 {
    48.0
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_position() -> f64 {
    50.0
}

impl TextSpec {
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            font: default_font(),
            size: default_size(),
            color: default_color(),
            pos_x: default_position(),
            pos_y: default_position(),
            stroke: false,
            shadow: false,
        }
    }

    pub fn at(mut self, pos_x: f64, pos_y: f64) -> Self {
        self.pos_x = pos_x;
        self.pos_y = pos_y;
        self
    }

    pub fn with_stroke(mut self, stroke: bool) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_shadow(mut self, shadow: bool) -> Self {
        self.shadow = shadow;
        self
    }
}

/// One drawing pass of the text overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPass {
    /// Black outline
    Stroke,
    /// Colored glyphs, optionally over a drop shadow
    Fill { shadow: bool },
}

/// Where the text goes and which passes draw it, in order
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlan {
    /// Canvas point the text's center is anchored on
    pub anchor: (f64, f64),
    pub passes: Vec<TextPass>,
}

impl TextPlan {
    /// Plan `spec` on a canvas, or `None` when there is nothing to draw
    pub fn new(canvas_width: u32, canvas_height: u32, spec: &TextSpec) -> Option<Self> {
        if spec.content.is_empty() {
            return None;
        }

        let anchor = (
            canvas_width as f64 * spec.pos_x / 100.0,
            canvas_height as f64 * spec.pos_y / 100.0,
        );

        let mut passes = Vec::with_capacity(2);
        if spec.stroke {
            passes.push(TextPass::Stroke);
        }
        passes.push(TextPass::Fill { shadow: spec.shadow });

        Some(Self { anchor, passes })
    }
}

/// Coverage mask of rendered text
#[derive(Debug, Clone)]
pub struct TextMask {
    pub coverage: GrayImage,
    /// Point inside the mask that lands on the plan's anchor
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Turns a string into a coverage mask
///
/// Implementations decide how font families are resolved.
pub trait GlyphRasterizer: Send + Sync {
    fn rasterize(&self, family: &str, size: f32, text: &str) -> Result<TextMask>;
}

/// Grow a mask outward by `radius`; returns the new mask and its margin
fn dilate(mask: &GrayImage, radius: f32) -> (GrayImage, i64) {
    let margin = radius.ceil() as i64;
    let reach = margin as i32;
    let offsets: Vec<(i32, i32)> = (-reach..=reach)
        .flat_map(|dy| (-reach..=reach).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| ((dx * dx + dy * dy) as f32) <= radius * radius)
        .collect();

    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let m = margin as i32;
    let out = GrayImage::from_fn((w + 2 * m) as u32, (h + 2 * m) as u32, |x, y| {
        let value = offsets
            .iter()
            .filter_map(|&(dx, dy)| {
                let sx = x as i32 - m + dx;
                let sy = y as i32 - m + dy;
                (sx >= 0 && sy >= 0 && sx < w && sy < h).then(|| mask.get_pixel(sx as u32, sy as u32)[0])
            })
            .max()
            .unwrap_or(0);
        Luma([value])
    });

    (out, margin)
}

/// Blurred copy of the mask with room for the blur to spread
fn shadow_mask(mask: &GrayImage) -> (GrayImage, i64) {
    let sigma = SHADOW_BLUR / 2.0;
    let margin = (sigma * 3.0).ceil() as u32;

    let mut expanded = GrayImage::new(mask.width() + 2 * margin, mask.height() + 2 * margin);
    for (x, y, pixel) in mask.enumerate_pixels() {
        expanded.put_pixel(x + margin, y + margin, *pixel);
    }

    (image::imageops::blur(&expanded, sigma), margin as i64)
}

/// Draw `spec` onto the canvas
pub fn render_text(canvas: &mut Canvas, spec: &TextSpec, glyphs: &dyn GlyphRasterizer) -> Result<()> {
    let Some(plan) = TextPlan::new(canvas.width(), canvas.height(), spec) else {
        return Ok(());
    };

    if !spec.size.is_finite() || spec.size <= 0.0 {
        return Err(OverlayError::InvalidTextSize { size: spec.size }.into());
    }

    let color: Color = spec.color.parse()?;
    let mask = glyphs.rasterize(&spec.font, spec.size, &spec.content)?;

    let origin_x = (plan.anchor.0 - mask.anchor_x).round() as i64;
    let origin_y = (plan.anchor.1 - mask.anchor_y).round() as i64;

    debug!(
        "Text '{}' anchored at ({:.1}, {:.1}), passes {:?}",
        spec.content, plan.anchor.0, plan.anchor.1, plan.passes
    );

    for pass in &plan.passes {
        match pass {
            TextPass::Stroke => {
                let (outline, margin) = dilate(&mask.coverage, STROKE_WIDTH / 2.0);
                draw_mask(canvas, &outline, origin_x - margin, origin_y - margin, Color::BLACK.rgba(), 1.0);
            }
            TextPass::Fill { shadow } => {
                if *shadow {
                    let (blurred, margin) = shadow_mask(&mask.coverage);
                    let opacity = SHADOW_OPACITY * color.rgba()[3] as f32 / 255.0;
                    draw_mask(
                        canvas,
                        &blurred,
                        origin_x - margin + SHADOW_OFFSET.0,
                        origin_y - margin + SHADOW_OFFSET.1,
                        Color::BLACK.rgba(),
                        opacity,
                    );
                }
                draw_mask(canvas, &mask.coverage, origin_x, origin_y, color.rgba(), 1.0);
            }
        }
    }

    Ok(())
}
