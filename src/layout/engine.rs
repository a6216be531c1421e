use tracing::debug;

use crate::canvas::{CanvasSpec, Frame};
use crate::error::Result;
use crate::geometry::{self, Placement, Region};
use crate::layout::LayoutMode;

/// One frame's slot in a layout: which frame, which region, where it lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    pub frame_index: usize,
    pub region: Region,
    pub placement: Placement,
}

/// Partition `canvas` for `mode` and resolve a placement for each frame
///
/// Frames beyond the mode's capacity are ignored; regions without a frame
/// produce no slot.
pub fn layout(mode: LayoutMode, canvas: CanvasSpec, frames: &[Frame]) -> Result<Vec<LayoutSlot>> {
    let regions = mode.regions(canvas);

    if frames.len() > regions.len() {
        debug!(
            "Layout '{}' holds {} frames, ignoring {} extra",
            mode,
            regions.len(),
            frames.len() - regions.len()
        );
    }

    regions
        .into_iter()
        .zip(frames.iter())
        .enumerate()
        .map(|(frame_index, (region, frame))| {
            let placement = geometry::resolve(
                frame.image.width() as f64,
                frame.image.height() as f64,
                &region,
                &frame.params,
            )?;

            debug!(
                "Slot {}: region {:.1},{:.1} {:.1}x{:.1} -> placement {:.1},{:.1} {:.1}x{:.1}",
                frame_index,
                region.x,
                region.y,
                region.width,
                region.height,
                placement.x,
                placement.y,
                placement.width,
                placement.height
            );

            Ok(LayoutSlot {
                frame_index,
                region,
                placement,
            })
        })
        .collect()
}
