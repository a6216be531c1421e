use tracing::debug;

use crate::canvas::Canvas;
use crate::encode::{AnimationEncoder, AnimationSettings, LoopCount};
use crate::error::{EncodeError, Result};

/// Animated GIF encoder writing into memory
///
/// Quality maps onto the NeuQuant sampling speed of `gif::Frame::from_rgba_speed`.
pub struct GifAnimationEncoder {
    encoder: Option<gif::Encoder<Vec<u8>>>,
    width: u16,
    height: u16,
    delay_centis: u16,
    speed: i32,
    frame_count: usize,
}

impl GifAnimationEncoder {
    pub fn new() -> Self {
        Self {
            encoder: None,
            width: 0,
            height: 0,
            delay_centis: 0,
            speed: super::DEFAULT_QUALITY as i32,
            frame_count: 0,
        }
    }

    /// Frames written since `begin`
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// GIF delays are stored in hundredths of a second
    fn delay_to_centis(delay_ms: u32) -> u16 {
        ((delay_ms + 5) / 10).min(u16::MAX as u32) as u16
    }

    fn failed<E: std::fmt::Display>(e: E) -> EncodeError {
        EncodeError::AnimationFailed { reason: e.to_string() }
    }
}

impl Default for GifAnimationEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEncoder for GifAnimationEncoder {
    fn max_dimension(&self) -> u32 {
        u16::MAX as u32
    }

    fn begin(&mut self, width: u32, height: u32, settings: &AnimationSettings) -> Result<()> {
        let too_large = || EncodeError::FrameTooLarge { width, height };
        let w = u16::try_from(width).map_err(|_| too_large())?;
        let h = u16::try_from(height).map_err(|_| too_large())?;

        let mut encoder = gif::Encoder::new(Vec::new(), w, h, &[]).map_err(Self::failed)?;
        let repeat = match settings.repeat {
            LoopCount::Infinite => gif::Repeat::Infinite,
            LoopCount::Times(n) => gif::Repeat::Finite(n),
        };
        encoder.set_repeat(repeat).map_err(Self::failed)?;

        self.encoder = Some(encoder);
        self.width = w;
        self.height = h;
        self.delay_centis = Self::delay_to_centis(settings.delay_ms);
        self.speed = settings.quality.clamp(1, 30) as i32;
        self.frame_count = 0;

        debug!(
            "GIF stream started: {}x{}, delay {}cs, speed {}",
            w, h, self.delay_centis, self.speed
        );
        Ok(())
    }

    fn add_frame(&mut self, canvas: &Canvas) -> Result<()> {
        if canvas.width() != self.width as u32 || canvas.height() != self.height as u32 {
            return Err(EncodeError::AnimationFailed {
                reason: format!(
                    "frame is {}x{}, stream is {}x{}",
                    canvas.width(),
                    canvas.height(),
                    self.width,
                    self.height
                ),
            }
            .into());
        }

        let encoder = self.encoder.as_mut().ok_or_else(|| EncodeError::AnimationFailed {
            reason: "frame added before begin".to_string(),
        })?;

        let mut pixels = canvas.as_image().as_raw().clone();
        let mut frame = gif::Frame::from_rgba_speed(self.width, self.height, &mut pixels, self.speed);
        frame.delay = self.delay_centis;

        encoder.write_frame(&frame).map_err(Self::failed)?;
        self.frame_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let encoder = self.encoder.take().ok_or_else(|| EncodeError::AnimationFailed {
            reason: "finish called before begin".to_string(),
        })?;

        let bytes = encoder.into_inner().map_err(Self::failed)?;
        debug!("GIF stream finished: {} frames, {} bytes", self.frame_count, bytes.len());
        Ok(bytes)
    }
}
