use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasSpec;
use crate::error::{CanvasError, CompositorError, Result};
use crate::geometry::Region;

/// How a canvas is partitioned among frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// One frame covering the whole canvas
    Single,
    /// Two equal columns
    Split,
    /// Three equal columns
    Triple,
    /// 2x2 grid
    Quad,
}

impl LayoutMode {
    /// Every supported mode, in display order
    pub const ALL: [LayoutMode; 4] = [Self::Single, Self::Split, Self::Triple, Self::Quad];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Split => "split",
            Self::Triple => "triple",
            Self::Quad => "quad",
        }
    }

    /// Number of regions this mode provides
    pub fn capacity(&self) -> usize {
        match self {
            Self::Single => 1,
            Self::Split => 2,
            Self::Triple => 3,
            Self::Quad => 4,
        }
    }

    /// Partition a canvas into this mode's regions, in frame order
    pub fn regions(&self, canvas: CanvasSpec) -> Vec<Region> {
        let width = canvas.width as f64;
        let height = canvas.height as f64;

        match self {
            Self::Single => vec![Region::full(canvas.width, canvas.height)],
            Self::Split => columns(2, width, height),
            Self::Triple => columns(3, width, height),
            Self::Quad => {
                let (w, h) = (width / 2.0, height / 2.0);
                vec![
                    Region::new(0.0, 0.0, w, h),
                    Region::new(w, 0.0, w, h),
                    Region::new(0.0, h, w, h),
                    Region::new(w, h, w, h),
                ]
            }
        }
    }
}

fn columns(count: usize, width: f64, height: f64) -> Vec<Region> {
    let column_width = width / count as f64;
    (0..count)
        .map(|i| Region::new(i as f64 * column_width, 0.0, column_width, height))
        .collect()
}

impl Default for LayoutMode {
    fn default() -> Self {
        Self::Single
    }
}

impl FromStr for LayoutMode {
    type Err = CompositorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "split" | "double" => Ok(Self::Split),
            "triple" => Ok(Self::Triple),
            "quad" | "grid" => Ok(Self::Quad),
            _ => Err(CanvasError::UnknownLayout { name: s.to_string() }.into()),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("single".parse::<LayoutMode>().unwrap(), LayoutMode::Single);
        assert_eq!("Triple".parse::<LayoutMode>().unwrap(), LayoutMode::Triple);
        assert_eq!("grid".parse::<LayoutMode>().unwrap(), LayoutMode::Quad);
        assert!("mosaic".parse::<LayoutMode>().is_err());

        for mode in LayoutMode::ALL {
            assert_eq!(mode.name().parse::<LayoutMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_triple_partition() {
        let canvas = CanvasSpec::new(1000, 300).unwrap();
        let regions = LayoutMode::Triple.regions(canvas);

        assert_eq!(regions.len(), 3);
        let third = 1000.0 / 3.0;
        assert!((regions[0].x - 0.0).abs() < 1e-9);
        assert!((regions[1].x - third).abs() < 1e-9);
        assert!((regions[2].x - 2.0 * third).abs() < 1e-9);

        let total: f64 = regions.iter().map(|r| r.width).sum();
        assert!((total - 1000.0).abs() < 1e-6);
        assert!(regions.iter().all(|r| r.height == 300.0 && r.y == 0.0));
    }

    #[test]
    fn test_regions_match_capacity() {
        let canvas = CanvasSpec::new(640, 480).unwrap();
        for mode in LayoutMode::ALL {
            assert_eq!(mode.regions(canvas).len(), mode.capacity());
        }
    }

    #[test]
    fn test_quad_covers_canvas_without_overlap() {
        let canvas = CanvasSpec::new(800, 600).unwrap();
        let regions = LayoutMode::Quad.regions(canvas);

        let area: f64 = regions.iter().map(|r| r.width * r.height).sum();
        assert!((area - 800.0 * 600.0).abs() < 1e-6);
        assert_eq!(regions[3].x, 400.0);
        assert_eq!(regions[3].y, 300.0);
    }
}
