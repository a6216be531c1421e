//! # Geometry Resolver
//!
//! Maps a source image into a destination region under zoom and pan.
//! Everything here is pure arithmetic; nothing touches pixels.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

/// Pan value that keeps the image centered on an axis
pub const PAN_CENTER: f64 = 50.0;

/// Zoom and pan applied to one frame
///
/// `zoom` of 1.0 is a contain fit; larger values crop in. `pan_h` and `pan_v`
/// run from 0 (show the left/top edge) to 100 (show the right/bottom edge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomPanParams {
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    #[serde(default = "default_pan")]
    pub pan_h: f64,

    #[serde(default = "default_pan")]
    pub pan_v: f64,
}

fn default_zoom() -> f64 {
    1.0
}

fn default_pan() -> f64 {
    PAN_CENTER
}

impl Default for ZoomPanParams {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            pan_h: PAN_CENTER,
            pan_v: PAN_CENTER,
        }
    }
}

impl ZoomPanParams {
    pub fn new(zoom: f64, pan_h: f64, pan_v: f64) -> Result<Self> {
        let params = Self { zoom, pan_h, pan_v };
        params.validate()?;
        Ok(params)
    }

    /// Check `zoom > 0` and both pans within [0, 100]
    pub fn validate(&self) -> Result<()> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(GeometryError::InvalidZoomPan {
                details: format!("zoom must be positive, got {}", self.zoom),
            }
            .into());
        }

        for (name, value) in [("pan_h", self.pan_h), ("pan_v", self.pan_v)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(GeometryError::InvalidZoomPan {
                    details: format!("{} must be within 0-100, got {}", name, value),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Destination rectangle inside a canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Region covering a whole canvas
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// Resolved position and size of an image, in canvas coordinates
///
/// May extend past its region or the canvas; clipping happens when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn check_dimensions(what: &'static str, width: f64, height: f64) -> Result<()> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimension { what, width, height }.into())
    }
}

/// Resolve where a `source_width` x `source_height` image lands in `region`
///
/// Contain-fit first, then scale by zoom, then shift by the pan offset.
pub fn resolve(
    source_width: f64,
    source_height: f64,
    region: &Region,
    params: &ZoomPanParams,
) -> Result<Placement> {
    check_dimensions("source", source_width, source_height)?;
    check_dimensions("region", region.width, region.height)?;
    params.validate()?;

    let image_aspect = source_width / source_height;

    let (base_width, base_height) = if image_aspect > region.aspect() {
        // Wider than the region: fit to width, letterbox top/bottom
        (region.width, region.width / image_aspect)
    } else {
        (region.height * image_aspect, region.height)
    };

    let width = base_width * params.zoom;
    let height = base_height * params.zoom;

    let max_offset_x = ((width - region.width) / 2.0).max(0.0);
    let max_offset_y = ((height - region.height) / 2.0).max(0.0);

    let user_offset_x = max_offset_x * (PAN_CENTER - params.pan_h) / PAN_CENTER;
    let user_offset_y = max_offset_y * (PAN_CENTER - params.pan_v) / PAN_CENTER;

    Ok(Placement {
        x: region.x + (region.width - width) / 2.0 + user_offset_x,
        y: region.y + (region.height - height) / 2.0 + user_offset_y,
        width,
        height,
    })
}
