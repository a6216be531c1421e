//! # Encoders
//!
//! Turns composed canvases into bytes: PNG for stills, and an
//! [`AnimationEncoder`] stream for animated thumbnails.

pub mod animated;
pub mod still;

pub use animated::GifAnimationEncoder;
pub use still::encode_png;

use crate::canvas::Canvas;
use crate::error::{EncodeError, Result};

/// Default NeuQuant sampling factor (1 = best, 30 = fastest)
pub const DEFAULT_QUALITY: u8 = 10;

/// How many times an animation plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCount {
    Infinite,
    Times(u16),
}

/// Encoder configuration shared by every frame of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSettings {
    pub repeat: LoopCount,
    /// Delay between frames in milliseconds
    pub delay_ms: u32,
    pub quality: u8,
}

impl AnimationSettings {
    /// Infinite loop with a uniform delay
    pub fn looping(delay_ms: u32, quality: u8) -> Self {
        Self {
            repeat: LoopCount::Infinite,
            delay_ms,
            quality,
        }
    }
}

/// Streaming sink for animation frames
///
/// Frames are appended in playback order between `begin` and `finish`.
pub trait AnimationEncoder {
    /// Largest width or height the format can store
    fn max_dimension(&self) -> u32 {
        u32::MAX
    }

    fn begin(&mut self, width: u32, height: u32, settings: &AnimationSettings) -> Result<()>;

    fn add_frame(&mut self, canvas: &Canvas) -> Result<()>;

    /// Close the stream and return the encoded bytes
    fn finish(&mut self) -> Result<Vec<u8>>;
}

/// Reject canvas sizes `encoder` cannot store, before any frame is composed
pub fn check_dimensions(encoder: &dyn AnimationEncoder, width: u32, height: u32) -> Result<()> {
    let max = encoder.max_dimension();
    if width > max || height > max {
        return Err(EncodeError::FrameTooLarge { width, height }.into());
    }
    Ok(())
}
