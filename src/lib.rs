//! # Thumbnail-Compositor
//!
//! Compose still and animated thumbnails from video frames: zoom and pan each
//! frame inside a layout, add text and a logo, and write PNG or looping GIF.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thumbnail_compositor::{
//!     composition::{CompositionEngine, FrameRequest, StillRequest},
//!     config::Config,
//!     overlay::TextSpec,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = CompositionEngine::from_config(Config::default())?;
//!
//! let report = engine
//!     .create_still(StillRequest {
//!         frames: vec![FrameRequest::video("talk.mp4", 42.0)],
//!         layout: Some("single".to_string()),
//!         size: Some("1280x720".to_string()),
//!         text: Some(TextSpec::new("Episode 12").at(50.0, 85.0).with_stroke(true)),
//!         ..Default::default()
//!     })
//!     .await;
//!
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`geometry`] - Zoom/pan resolution of an image into a region
//! - [`layout`] - Canvas partitioning for single, split, triple and quad layouts
//! - [`canvas`] - Raster types and drawing primitives
//! - [`overlay`] - Text and logo overlays
//! - [`encode`] - PNG and animated GIF encoding
//! - [`source`] - Video probing and frame capture
//! - [`composition`] - Still and animated composers and the request engine
//! - [`config`] - Configuration management
//!
//! ## Custom backends
//!
//! Text rendering and frame capture sit behind traits, so the engine can run
//! without system fonts or ffmpeg:
//!
//! ```rust,no_run
//! use std::path::Path;
//! use thumbnail_compositor::{canvas::SourceImage, source::{FrameSource, VideoInfo}, Result};
//!
//! struct StaticFrames;
//!
//! impl FrameSource for StaticFrames {
//!     fn probe(&self, _video: &Path) -> Result<VideoInfo> {
//!         Ok(VideoInfo {
//!             duration: 1.0,
//!             width: 640,
//!             height: 360,
//!             codec: "raw".to_string(),
//!             bitrate: None,
//!             format: "none".to_string(),
//!         })
//!     }
//!
//!     fn capture_frame(&self, _video: &Path, _timestamp: f64) -> Result<SourceImage> {
//!         Ok(SourceImage::new_filled(640, 360, [40, 40, 40, 255]))
//!     }
//! }
//! ```

pub mod canvas;
pub mod composition;
pub mod config;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod overlay;
pub mod source;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{CompositionEngine, CompositionReport},
    config::Config,
    error::{CompositorError, Result},
    geometry::ZoomPanParams,
    layout::LayoutMode,
};
