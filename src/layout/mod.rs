//! # Layout Engine
//!
//! Partitions a canvas into regions for a [`LayoutMode`] and resolves a
//! placement for each frame. Pure geometry; drawing is left to the composers.
//!
//! ## Layouts
//!
//! - **single**: one frame, whole canvas
//! - **split**: two equal columns
//! - **triple**: three equal columns
//! - **quad**: 2x2 grid

pub mod engine;
pub mod mode;

pub use engine::{layout, LayoutSlot};
pub use mode::LayoutMode;
