use crate::canvas::Canvas;
use crate::error::{EncodeError, Result};

/// Encode a canvas as an 8-bit RGBA PNG
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>> {
    let failed = |e: png::EncodingError| EncodeError::PngFailed { reason: e.to_string() };

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(failed)?;
        writer.write_image_data(canvas.as_image().as_raw()).map_err(failed)?;
        writer.finish().map_err(failed)?;
    }

    Ok(bytes)
}
