use tracing::{debug, info};

use crate::canvas::{draw_scaled, Canvas, CanvasSpec, Frame};
use crate::encode::{check_dimensions, AnimationEncoder, AnimationSettings, DEFAULT_QUALITY};
use crate::error::{CompositionError, Result};
use crate::layout::{layout, LayoutMode};

/// Ordered frames of an animated thumbnail
///
/// The order of `frames` is the playback order.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    pub frames: Vec<Frame>,
    /// Delay between frames in milliseconds
    pub delay_ms: u32,
    pub canvas: CanvasSpec,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>, delay_ms: u32, canvas: CanvasSpec) -> Self {
        Self { frames, delay_ms, canvas }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Builds animated thumbnails, one single-layout canvas per frame
pub struct SequenceComposer {
    quality: u8,
}

impl SequenceComposer {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// Draw every frame onto its own black canvas, in input order
    pub fn compose_frames(&self, sequence: &FrameSequence) -> Result<Vec<Canvas>> {
        if sequence.is_empty() {
            return Err(CompositionError::EmptySequence.into());
        }

        sequence
            .frames
            .iter()
            .enumerate()
            .map(|(index, frame)| {
                let mut canvas = Canvas::new(sequence.canvas);
                for slot in layout(LayoutMode::Single, sequence.canvas, std::slice::from_ref(frame))? {
                    draw_scaled(&mut canvas, &frame.image, &slot.placement);
                }
                debug!("Composed animation frame {}/{}", index + 1, sequence.len());
                Ok(canvas)
            })
            .collect()
    }

    /// Compose every frame, then stream them to `encoder` as a looping animation
    pub fn render(&self, sequence: &FrameSequence, encoder: &mut dyn AnimationEncoder) -> Result<Vec<u8>> {
        check_dimensions(encoder, sequence.canvas.width, sequence.canvas.height)?;
        let canvases = self.compose_frames(sequence)?;

        let settings = AnimationSettings::looping(sequence.delay_ms, self.quality);
        encoder.begin(sequence.canvas.width, sequence.canvas.height, &settings)?;
        for canvas in &canvases {
            encoder.add_frame(canvas)?;
        }
        let bytes = encoder.finish()?;

        info!(
            "Animation encoded: {} frames at {} ({} bytes)",
            canvases.len(),
            sequence.canvas,
            bytes.len()
        );
        Ok(bytes)
    }
}

impl Default for SequenceComposer {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SourceImage;
    use crate::encode::{GifAnimationEncoder, LoopCount};
    use crate::error::{CompositorError, EncodeError};

    /// Encoder that remembers what it was given
    #[derive(Default)]
    struct RecordingEncoder {
        settings: Option<AnimationSettings>,
        centers: Vec<[u8; 4]>,
        finished: bool,
        max_dimension: Option<u32>,
    }

    impl AnimationEncoder for RecordingEncoder {
        fn max_dimension(&self) -> u32 {
            self.max_dimension.unwrap_or(u32::MAX)
        }

        fn begin(&mut self, _width: u32, _height: u32, settings: &AnimationSettings) -> Result<()> {
            self.settings = Some(*settings);
            Ok(())
        }

        fn add_frame(&mut self, canvas: &Canvas) -> Result<()> {
            self.centers.push(canvas.pixel(canvas.width() / 2, canvas.height() / 2));
            Ok(())
        }

        fn finish(&mut self) -> Result<Vec<u8>> {
            self.finished = true;
            Ok(vec![self.centers.len() as u8])
        }
    }

    fn colored(colors: &[[u8; 4]]) -> Vec<Frame> {
        colors
            .iter()
            .map(|&c| Frame::fitted(SourceImage::new_filled(8, 8, c)))
            .collect()
    }

    #[test]
    fn test_frames_kept_in_order() {
        let colors = [
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [255, 0, 0, 255],
            [0, 0, 255, 255],
        ];
        let sequence = FrameSequence::new(colored(&colors), 120, CanvasSpec::new(40, 20).unwrap());

        let mut encoder = RecordingEncoder::default();
        let bytes = SequenceComposer::new(7).render(&sequence, &mut encoder).unwrap();

        assert_eq!(bytes, vec![4]);
        assert!(encoder.finished);
        assert_eq!(encoder.centers, colors.to_vec());

        let settings = encoder.settings.unwrap();
        assert_eq!(settings.repeat, LoopCount::Infinite);
        assert_eq!(settings.delay_ms, 120);
        assert_eq!(settings.quality, 7);
    }

    #[test]
    fn test_each_frame_on_fresh_canvas() {
        let sequence = FrameSequence::new(
            colored(&[[255, 255, 255, 255], [255, 0, 0, 128]]),
            100,
            CanvasSpec::new(20, 10).unwrap(),
        );

        let canvases = SequenceComposer::default().compose_frames(&sequence).unwrap();
        assert_eq!(canvases.len(), 2);
        // half-transparent red over black, not over the previous white frame
        assert_eq!(canvases[1].pixel(10, 5), [128, 0, 0, 255]);
        // letterbox columns stay black
        assert_eq!(canvases[1].pixel(0, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let sequence = FrameSequence::new(Vec::new(), 100, CanvasSpec::new(10, 10).unwrap());
        let mut encoder = RecordingEncoder::default();

        let err = SequenceComposer::default().render(&sequence, &mut encoder).unwrap_err();
        assert!(matches!(err, CompositorError::Composition(CompositionError::EmptySequence)));
        assert!(encoder.settings.is_none());
    }

    #[test]
    fn test_oversized_canvas_rejected_before_composing() {
        let sequence = FrameSequence::new(
            colored(&[[255, 0, 0, 255]]),
            100,
            CanvasSpec::new(40, 20).unwrap(),
        );
        let mut encoder = RecordingEncoder {
            max_dimension: Some(32),
            ..Default::default()
        };

        let err = SequenceComposer::default().render(&sequence, &mut encoder).unwrap_err();
        assert!(matches!(
            err,
            CompositorError::Encode(EncodeError::FrameTooLarge { width: 40, height: 20 })
        ));
        assert!(encoder.settings.is_none());
        assert!(encoder.centers.is_empty());
    }

    #[test]
    fn test_gif_frame_count_matches() {
        let sequence = FrameSequence::new(
            colored(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]),
            500,
            CanvasSpec::new(16, 9).unwrap(),
        );

        let mut encoder = GifAnimationEncoder::new();
        let bytes = SequenceComposer::default().render(&sequence, &mut encoder).unwrap();
        assert_eq!(encoder.frame_count(), 3);

        let mut decoder = gif::DecodeOptions::new().read_info(bytes.as_slice()).unwrap();
        let mut frames = 0;
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            assert_eq!(frame.delay, 50);
            frames += 1;
        }
        assert_eq!(frames, 3);
    }
}
