//! # Frame Sources
//!
//! Where source frames come from when they are not plain image files:
//! probing a video and grabbing a single frame at a timestamp.

mod ffmpeg;

pub use ffmpeg::FfmpegFrameSource;

use std::path::Path;

use serde::Serialize;

use crate::canvas::SourceImage;
use crate::error::Result;

/// Basic facts about a video file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    /// Overall bitrate in bits per second, if reported
    pub bitrate: Option<u64>,
    /// Container format name
    pub format: String,
}

/// Service that probes videos and captures decoded frames from them
pub trait FrameSource: Send + Sync {
    fn probe(&self, video: &Path) -> Result<VideoInfo>;

    /// Decode the frame shown at `timestamp` seconds
    fn capture_frame(&self, video: &Path, timestamp: f64) -> Result<SourceImage>;
}

/// Whether a path names a still image rather than a video
pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert!(is_image_file("frame.PNG"));
        assert!(is_image_file("/tmp/a.jpeg"));
        assert!(!is_image_file("clip.mp4"));
        assert!(!is_image_file("no_extension"));
    }
}
