use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CompositionError, CompositorError, Result};
use crate::geometry::ZoomPanParams;
use crate::overlay::TextSpec;

/// One input frame of a request
///
/// A frame with a `timestamp` is captured from the video at `path`;
/// otherwise `path` is decoded as an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRequest {
    pub path: PathBuf,

    /// Seconds into the video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    #[serde(flatten)]
    pub params: ZoomPanParams,
}

impl FrameRequest {
    /// Centered, unzoomed image frame
    pub fn image<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            timestamp: None,
            params: ZoomPanParams::default(),
        }
    }

    /// Centered, unzoomed frame captured from a video
    pub fn video<P: Into<PathBuf>>(path: P, timestamp: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::image(path)
        }
    }

    pub fn with_params(mut self, params: ZoomPanParams) -> Self {
        self.params = params;
        self
    }
}

/// A still thumbnail to compose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StillRequest {
    #[serde(default)]
    pub frames: Vec<FrameRequest>,

    /// Layout name; the configured default when absent
    #[serde(default)]
    pub layout: Option<String>,

    /// Canvas size as `"WxH"`; the configured default when absent
    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub text: Option<TextSpec>,

    #[serde(default)]
    pub logo: Option<PathBuf>,

    /// Output file name inside the output directory
    #[serde(default)]
    pub output: Option<String>,
}

impl StillRequest {
    /// Load a request from a `.json` or `.toml` file
    ///
    /// Relative input paths are taken relative to the request file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut request: Self = load_document(path)?;
        if let Some(base) = path.parent() {
            rebase_frames(&mut request.frames, base);
            if let Some(logo) = request.logo.as_mut() {
                rebase(logo, base);
            }
        }
        Ok(request)
    }
}

/// An animated thumbnail to compose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    /// Frames in playback order
    #[serde(default)]
    pub frames: Vec<FrameRequest>,

    #[serde(default)]
    pub size: Option<String>,

    /// Delay between frames; the configured default when absent
    #[serde(default)]
    pub delay_ms: Option<u32>,

    #[serde(default)]
    pub output: Option<String>,
}

impl AnimationRequest {
    /// Load a request from a `.json` or `.toml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut request: Self = load_document(path)?;
        if let Some(base) = path.parent() {
            rebase_frames(&mut request.frames, base);
        }
        Ok(request)
    }
}

/// Outcome of a request, as handed back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionReport {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompositionReport {
    pub fn succeeded<S: Into<String>>(output_path: PathBuf, message: S) -> Self {
        Self {
            success: true,
            output_path: Some(output_path),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: &CompositorError) -> Self {
        Self {
            success: false,
            output_path: None,
            message: None,
            error: Some(error.user_message()),
        }
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let invalid = |reason: String| CompositionError::InvalidRequest {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    let document = if is_json {
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
    } else {
        toml::from_str(&content).map_err(|e| invalid(e.to_string()))?
    };
    Ok(document)
}

fn rebase(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

fn rebase_frames(frames: &mut [FrameRequest], base: &Path) {
    for frame in frames {
        rebase(&mut frame.path, base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_toml_still_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("still.toml");
        std::fs::write(
            &path,
            r#"
layout = "triple"
size = "900x300"
logo = "/brand/logo.png"
output = "cover.png"

[[frames]]
path = "a.png"

[[frames]]
path = "clip.mp4"
timestamp = 12.5
zoom = 2.0
pan_h = 0

[text]
content = "SALE"
pos_y = 90
stroke = true
"#,
        )
        .unwrap();

        let request = StillRequest::from_file(&path).unwrap();
        assert_eq!(request.layout.as_deref(), Some("triple"));
        assert_eq!(request.frames.len(), 2);
        assert_eq!(request.frames[0].path, dir.path().join("a.png"));
        assert_eq!(request.frames[0].params, ZoomPanParams::default());
        assert_eq!(request.frames[1].timestamp, Some(12.5));
        assert_eq!(request.frames[1].params.zoom, 2.0);
        assert_eq!(request.frames[1].params.pan_h, 0.0);
        assert_eq!(request.frames[1].params.pan_v, 50.0);
        assert_eq!(request.logo, Some(PathBuf::from("/brand/logo.png")));

        let text = request.text.unwrap();
        assert_eq!(text.content, "SALE");
        assert_eq!(text.pos_x, 50.0);
        assert_eq!(text.pos_y, 90.0);
        assert!(text.stroke);
        assert!(!text.shadow);
    }

    #[test]
    fn test_json_animation_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anim.json");
        std::fs::write(
            &path,
            r#"{"size": "320x180", "delay_ms": 250,
                "frames": [{"path": "/v.mp4", "timestamp": 1}, {"path": "/v.mp4", "timestamp": 2}]}"#,
        )
        .unwrap();

        let request = AnimationRequest::from_file(&path).unwrap();
        assert_eq!(request.delay_ms, Some(250));
        assert_eq!(request.frames[1], FrameRequest::video("/v.mp4", 2.0));
        assert_eq!(request.output, None);
    }

    #[test]
    fn test_malformed_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "frames = 3").unwrap();

        let err = StillRequest::from_file(&path).unwrap_err();
        assert!(matches!(err, CompositorError::Composition(CompositionError::InvalidRequest { .. })));
        assert!(StillRequest::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_report_serialization() {
        let ok = CompositionReport::succeeded(PathBuf::from("out/a.png"), "done");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["output_path"], "out/a.png");
        assert!(json.get("error").is_none());

        let err: CompositorError = CompositionError::EmptySequence.into();
        let json = serde_json::to_value(CompositionReport::failed(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("output_path").is_none());
        assert!(json["error"].as_str().unwrap().contains("Frame sequence is empty"));
    }
}
