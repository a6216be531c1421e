use std::sync::Arc;

use tracing::debug;

use crate::canvas::{draw_scaled, Canvas, CanvasSpec, Frame, SourceImage};
use crate::encode::encode_png;
use crate::error::Result;
use crate::layout::{layout, LayoutMode};
use crate::overlay::{render_logo, render_text, GlyphRasterizer, TextSpec};

/// Builds one still thumbnail: frames in a layout, then text, then logo
pub struct StillComposer {
    glyphs: Arc<dyn GlyphRasterizer>,
}

impl StillComposer {
    pub fn new(glyphs: Arc<dyn GlyphRasterizer>) -> Self {
        Self { glyphs }
    }

    /// Compose the layers onto a fresh black canvas
    ///
    /// Frames are drawn in slot order, so later regions overdraw earlier ones
    /// where zoomed placements overlap.
    pub fn compose(
        &self,
        frames: &[Frame],
        mode: LayoutMode,
        canvas_spec: CanvasSpec,
        text: Option<&TextSpec>,
        logo: Option<&SourceImage>,
    ) -> Result<Canvas> {
        let slots = layout(mode, canvas_spec, frames)?;
        let mut canvas = Canvas::new(canvas_spec);

        for slot in &slots {
            let frame = &frames[slot.frame_index];
            draw_scaled(&mut canvas, &frame.image, &slot.placement);
        }
        debug!("Drew {} of {} frames in '{}' layout", slots.len(), frames.len(), mode);

        if let Some(text) = text {
            render_text(&mut canvas, text, self.glyphs.as_ref())?;
        }
        render_logo(&mut canvas, logo);

        Ok(canvas)
    }

    /// Compose and encode as PNG
    pub fn render(
        &self,
        frames: &[Frame],
        mode: LayoutMode,
        canvas_spec: CanvasSpec,
        text: Option<&TextSpec>,
        logo: Option<&SourceImage>,
    ) -> Result<Vec<u8>> {
        let canvas = self.compose(frames, mode, canvas_spec, text, logo)?;
        encode_png(&canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;
    use crate::error::{CompositorError, OverlayError};
    use crate::geometry::ZoomPanParams;
    use crate::overlay::text::tests::BoxRasterizer;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn composer() -> StillComposer {
        StillComposer::new(Arc::new(BoxRasterizer))
    }

    fn solid(width: u32, height: u32, color: [u8; 4]) -> Frame {
        Frame::fitted(SourceImage::new_filled(width, height, color))
    }

    #[test]
    fn test_single_frame_contain_fit() {
        let spec: CanvasSpec = "1280x720".parse().unwrap();
        let canvas = composer()
            .compose(&[solid(100, 100, RED)], LayoutMode::Single, spec, None, None)
            .unwrap();

        assert_eq!((canvas.width(), canvas.height()), (1280, 720));
        // 720x720 centered: columns 280..1000
        assert_eq!(canvas.pixel(279, 360), BACKGROUND);
        assert_eq!(canvas.pixel(280, 360), RED);
        assert_eq!(canvas.pixel(640, 0), RED);
        assert_eq!(canvas.pixel(999, 719), RED);
        assert_eq!(canvas.pixel(1000, 360), BACKGROUND);
    }

    #[test]
    fn test_triple_regions_resolved_independently() {
        let spec: CanvasSpec = "900x300".parse().unwrap();
        let frames = [solid(300, 150, RED), solid(150, 300, GREEN), solid(40, 40, BLUE)];
        let canvas = composer()
            .compose(&frames, LayoutMode::Triple, spec, None, None)
            .unwrap();

        // wide frame: full width, rows 75..225 of the first column
        assert_eq!(canvas.pixel(150, 74), BACKGROUND);
        assert_eq!(canvas.pixel(0, 150), RED);
        assert_eq!(canvas.pixel(299, 224), RED);
        // tall frame: columns 375..525
        assert_eq!(canvas.pixel(374, 150), BACKGROUND);
        assert_eq!(canvas.pixel(375, 0), GREEN);
        assert_eq!(canvas.pixel(524, 299), GREEN);
        assert_eq!(canvas.pixel(525, 150), BACKGROUND);
        // square frame fills the last region
        assert_eq!(canvas.pixel(600, 0), BLUE);
        assert_eq!(canvas.pixel(899, 299), BLUE);
    }

    #[test]
    fn test_missing_frames_leave_background() {
        let spec = CanvasSpec::new(200, 200).unwrap();
        let canvas = composer()
            .compose(&[solid(10, 10, RED)], LayoutMode::Quad, spec, None, None)
            .unwrap();

        assert_eq!(canvas.pixel(50, 50), RED);
        assert_eq!(canvas.pixel(150, 50), BACKGROUND);
        assert_eq!(canvas.pixel(50, 150), BACKGROUND);
        assert_eq!(canvas.pixel(150, 150), BACKGROUND);
    }

    #[test]
    fn test_zoomed_frame_overdraws_neighbour() {
        let spec = CanvasSpec::new(200, 100).unwrap();
        let zoomed = Frame::new(
            SourceImage::new_filled(10, 10, RED),
            ZoomPanParams::new(2.0, 50.0, 50.0).unwrap(),
        );
        let canvas = composer()
            .compose(&[zoomed, solid(10, 10, BLUE)], LayoutMode::Split, spec, None, None)
            .unwrap();

        // the first frame spills left of the canvas and into the second region,
        // which is drawn afterwards and wins
        assert_eq!(canvas.pixel(0, 50), RED);
        assert_eq!(canvas.pixel(120, 50), BLUE);
    }

    #[test]
    fn test_text_then_logo() {
        let spec = CanvasSpec::new(100, 100).unwrap();
        let text = TextSpec::new("SALE").at(50.0, 50.0);
        let logo = SourceImage::new_filled(10, 10, GREEN);
        let canvas = composer()
            .compose(&[], LayoutMode::Single, spec, Some(&text), Some(&logo))
            .unwrap();

        // box mask centered on (50, 50)
        assert_eq!(canvas.pixel(50, 50), [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(10, 10), BACKGROUND);
        // logo at (70, 70)
        assert_eq!(canvas.pixel(70, 70), GREEN);
        assert_eq!(canvas.pixel(79, 79), GREEN);
        assert_eq!(canvas.pixel(80, 80), BACKGROUND);
    }

    #[test]
    fn test_invalid_color_aborts() {
        let spec = CanvasSpec::new(50, 50).unwrap();
        let mut text = TextSpec::new("x");
        text.color = "#GGHHII".to_string();

        let err = composer()
            .compose(&[], LayoutMode::Single, spec, Some(&text), None)
            .unwrap_err();
        assert!(matches!(err, CompositorError::Overlay(OverlayError::InvalidColor { .. })));
    }

    #[test]
    fn test_render_produces_png() {
        let spec = CanvasSpec::new(32, 16).unwrap();
        let bytes = composer()
            .render(&[solid(4, 4, RED)], LayoutMode::Single, spec, None, None)
            .unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert_eq!(decoded.get_pixel(16, 8).0, RED);
    }
}
