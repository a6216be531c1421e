use std::str::FromStr;

use crate::error::{CompositorError, OverlayError, Result};

/// Straight-alpha RGBA color parsed from a CSS-style string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    pub fn rgba(&self) -> [u8; 4] {
        self.0
    }
}

fn named(name: &str) -> Option<[u8; 4]> {
    let rgb = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}

impl FromStr for Color {
    type Err = CompositorError;

    /// Accepts `#RGB`, `#RRGGBB`, `#RRGGBBAA` and a handful of color names
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        let invalid = || OverlayError::InvalidColor { value: s.to_string() };

        if let Some(rgba) = named(&value) {
            return Ok(Color(rgba));
        }

        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid().into());
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());

        let rgba = match hex.len() {
            3 => {
                let mut out = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    out[i] = v * 17;
                }
                out
            }
            6 => [channel(0..2)?, channel(2..4)?, channel(4..6)?, 255],
            8 => [channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?],
            _ => return Err(invalid().into()),
        };

        Ok(Color(rgba))
    }
}
