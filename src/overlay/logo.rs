use tracing::debug;

use crate::canvas::{draw_native, Canvas, SourceImage};

/// Gap between the logo and the canvas' right and bottom edges
pub const LOGO_MARGIN: i64 = 20;

/// Top-left corner of a logo anchored bottom-right
///
/// Not clamped: a logo larger than the canvas gets a negative position and is
/// clipped when drawn.
pub fn logo_position(canvas_width: u32, canvas_height: u32, logo_width: u32, logo_height: u32) -> (i64, i64) {
    (
        canvas_width as i64 - logo_width as i64 - LOGO_MARGIN,
        canvas_height as i64 - logo_height as i64 - LOGO_MARGIN,
    )
}

/// Draw the logo at native size in the bottom-right corner
pub fn render_logo(canvas: &mut Canvas, logo: Option<&SourceImage>) {
    let Some(logo) = logo else {
        return;
    };

    let (x, y) = logo_position(canvas.width(), canvas.height(), logo.width(), logo.height());
    debug!("Logo {}x{} at ({}, {})", logo.width(), logo.height(), x, y);
    draw_native(canvas, logo, x, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;

    #[test]
    fn test_position_bottom_right() {
        assert_eq!(logo_position(1280, 720, 100, 50), (1160, 650));
    }

    #[test]
    fn test_oversized_logo_goes_negative() {
        assert_eq!(logo_position(100, 100, 150, 90), (-70, -10));
    }

    #[test]
    fn test_render_logo() {
        let mut canvas = Canvas::new_filled(100, 100, BACKGROUND);
        let logo = SourceImage::new_filled(10, 10, [0, 255, 0, 255]);

        render_logo(&mut canvas, Some(&logo));

        assert_eq!(canvas.pixel(70, 70), [0, 255, 0, 255]);
        assert_eq!(canvas.pixel(79, 79), [0, 255, 0, 255]);
        assert_eq!(canvas.pixel(80, 80), BACKGROUND);
        assert_eq!(canvas.pixel(69, 70), BACKGROUND);
    }

    #[test]
    fn test_absent_logo_is_noop() {
        let mut canvas = Canvas::new_filled(10, 10, BACKGROUND);
        render_logo(&mut canvas, None);
        assert!(canvas.as_image().pixels().all(|p| p.0 == BACKGROUND));
    }
}
