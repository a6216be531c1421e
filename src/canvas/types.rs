use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{CanvasError, CompositorError, Result, SourceError};
use crate::geometry::ZoomPanParams;

/// Opaque black, the background of every fresh canvas
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// A decoded input image
///
/// Read-only once constructed; composers only ever borrow it.
#[derive(Clone, Debug)]
pub struct SourceImage {
    buffer: RgbaImage,
}

impl SourceImage {
    /// Wrap an already decoded RGBA buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create an image filled with a single color
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba(color)),
        }
    }

    /// Create an image from raw RGBA bytes
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Decode PNG, JPEG, GIF, WebP or BMP bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_named(bytes, "<memory>")
    }

    /// Decode bytes, naming `origin` in any error
    pub fn decode_named(bytes: &[u8], origin: &str) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| SourceError::DecodeFailed {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(image.to_rgba8()))
    }

    /// Read and decode an image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SourceError::DecodeFailed {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::decode_named(&bytes, &path.display().to_string())
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }
}

/// The raster every composition draws into
#[derive(Clone, Debug)]
pub struct Canvas {
    buffer: RgbaImage,
}

impl Canvas {
    /// Allocate a canvas of the given size filled with opaque black
    pub fn new(spec: CanvasSpec) -> Self {
        Self::new_filled(spec.width, spec.height, BACKGROUND)
    }

    /// Allocate a canvas filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba(color)),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }
}

/// Canvas dimensions, parsed from strings like `"1280x720"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
}

impl CanvasSpec {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSizeFormat {
                input: format!("{}x{}", width, height),
            }
            .into());
        }
        Ok(Self { width, height })
    }
}

impl FromStr for CanvasSpec {
    type Err = CompositorError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CanvasError::InvalidSizeFormat { input: s.to_string() };

        let (w, h) = s.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;

        if width == 0 || height == 0 {
            return Err(invalid().into());
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for CanvasSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One input frame: an image plus how to frame it
#[derive(Clone, Debug)]
pub struct Frame {
    pub image: SourceImage,
    pub params: ZoomPanParams,
}

impl Frame {
    pub fn new(image: SourceImage, params: ZoomPanParams) -> Self {
        Self { image, params }
    }

    /// Frame at zoom 1.0, centered
    pub fn fitted(image: SourceImage) -> Self {
        Self::new(image, ZoomPanParams::default())
    }
}
