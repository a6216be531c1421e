//! # Canvas
//!
//! Raster types shared by every stage: decoded source images, the canvas
//! being composed, canvas sizes, and the low-level drawing primitives.

pub mod draw;
pub mod types;

pub use draw::{draw_mask, draw_native, draw_scaled};
pub use types::{Canvas, CanvasSpec, Frame, SourceImage, BACKGROUND};
