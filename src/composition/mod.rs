//! # Composition
//!
//! Still and animated thumbnail composers, plus the engine that turns
//! requests into files on disk.

pub mod engine;
pub mod output;
pub mod request;
pub mod sequence;
pub mod still;

pub use engine::CompositionEngine;
pub use output::OutputWriter;
pub use request::{AnimationRequest, CompositionReport, FrameRequest, StillRequest};
pub use sequence::{FrameSequence, SequenceComposer};
pub use still::StillComposer;
