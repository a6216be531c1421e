//! # Overlay Renderer
//!
//! Text and logo overlays drawn on top of a composed canvas. Positions are
//! given as percentages of the canvas (text) or anchored to the bottom-right
//! corner (logo).

pub mod color;
pub mod font;
pub mod logo;
pub mod text;

pub use color::Color;
pub use font::FontLibrary;
pub use logo::{logo_position, render_logo, LOGO_MARGIN};
pub use text::{render_text, GlyphRasterizer, TextMask, TextPass, TextPlan, TextSpec};
