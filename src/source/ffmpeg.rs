use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::canvas::SourceImage;
use crate::config::SourceConfig;
use crate::error::{Result, SourceError};
use crate::source::{FrameSource, VideoInfo};

/// Frame source driving the `ffmpeg` and `ffprobe` command line tools
pub struct FfmpegFrameSource {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    scratch_dir: PathBuf,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
    format_name: Option<String>,
}

impl FfmpegFrameSource {
    pub fn new(config: &SourceConfig) -> Self {
        let scratch_dir = config
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
            .join("thumbnail-frames");

        Self {
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
            scratch_dir,
        }
    }

    fn run(tool: &Path, command: &mut Command) -> Result<std::process::Output> {
        command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::ToolUnavailable {
                    tool: tool.display().to_string(),
                }
                .into()
            } else {
                e.into()
            }
        })
    }

    fn parse_probe(json: &[u8]) -> Result<VideoInfo> {
        let output: ProbeOutput = serde_json::from_slice(json).map_err(|e| SourceError::ProbeFailed {
            reason: format!("invalid ffprobe output: {}", e),
        })?;

        let video = output
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"));
        let format = output.format.as_ref();

        Ok(VideoInfo {
            duration: format
                .and_then(|f| f.duration.as_deref())
                .and_then(|d| d.parse().ok())
                .unwrap_or(0.0),
            width: video.and_then(|s| s.width).unwrap_or(0),
            height: video.and_then(|s| s.height).unwrap_or(0),
            codec: video
                .and_then(|s| s.codec_name.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            bitrate: format.and_then(|f| f.bit_rate.as_deref()).and_then(|b| b.parse().ok()),
            format: format
                .and_then(|f| f.format_name.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    fn scratch_file(&self) -> PathBuf {
        let stamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.scratch_dir
            .join(format!("frame_{}_{}.png", std::process::id(), stamp))
    }
}

impl FrameSource for FfmpegFrameSource {
    fn probe(&self, video: &Path) -> Result<VideoInfo> {
        let mut command = Command::new(&self.ffprobe);
        command.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"]);
        command.arg(video);

        let output = Self::run(&self.ffprobe, &mut command)?;
        if !output.status.success() {
            return Err(SourceError::ProbeFailed {
                reason: format!("ffprobe exited with {} for {}", output.status, video.display()),
            }
            .into());
        }

        let info = Self::parse_probe(&output.stdout)?;
        info!(
            "Video {}: {}x{} {} {:.1}s",
            video.display(),
            info.width,
            info.height,
            info.codec,
            info.duration
        );
        Ok(info)
    }

    fn capture_frame(&self, video: &Path, timestamp: f64) -> Result<SourceImage> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(SourceError::CaptureFailed {
                reason: format!("invalid timestamp {}", timestamp),
            }
            .into());
        }

        std::fs::create_dir_all(&self.scratch_dir)?;
        let frame_path = self.scratch_file();

        let mut command = Command::new(&self.ffmpeg);
        let seek = format!("{:.3}", timestamp);
        command.args(["-v", "error", "-ss", seek.as_str(), "-i"]);
        command.arg(video);
        command.args(["-frames:v", "1", "-y"]);
        command.arg(&frame_path);

        debug!("Capturing {} at {:.3}s into {:?}", video.display(), timestamp, frame_path);
        let output = Self::run(&self.ffmpeg, &mut command)?;

        if !output.status.success() || !frame_path.exists() {
            let _ = std::fs::remove_file(&frame_path);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::CaptureFailed {
                reason: format!("ffmpeg failed at {:.3}s: {}", timestamp, stderr.trim()),
            }
            .into());
        }

        let frame = SourceImage::open(&frame_path);
        if let Err(e) = std::fs::remove_file(&frame_path) {
            warn!("Failed to remove captured frame {:?}: {}", frame_path, e);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositorError;

    const PROBE_JSON: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "audio", "codec_name": "aac"},
            {"index": 1, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080}
        ],
        "format": {"format_name": "mov,mp4,m4a", "duration": "12.480000", "bit_rate": "4500000"}
    }"#;

    #[test]
    fn test_parse_probe_picks_video_stream() {
        let info = FfmpegFrameSource::parse_probe(PROBE_JSON.as_bytes()).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert_eq!(info.codec, "h264");
        assert_eq!(info.bitrate, Some(4_500_000));
        assert_eq!(info.format, "mov,mp4,m4a");
        assert!((info.duration - 12.48).abs() < 1e-9);
    }

    #[test]
    fn test_parse_probe_defaults() {
        let info = FfmpegFrameSource::parse_probe(br#"{"streams": []}"#).unwrap();
        assert_eq!(info.width, 0);
        assert_eq!(info.codec, "unknown");
        assert_eq!(info.duration, 0.0);
        assert_eq!(info.bitrate, None);
    }

    #[test]
    fn test_parse_probe_garbage() {
        assert!(FfmpegFrameSource::parse_probe(b"<html>").is_err());
    }

    #[test]
    fn test_missing_tool_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let config = SourceConfig {
            ffmpeg: PathBuf::from("/definitely/not/ffmpeg"),
            ffprobe: PathBuf::from("/definitely/not/ffprobe"),
            temp_dir: Some(scratch.path().to_path_buf()),
        };
        let source = FfmpegFrameSource::new(&config);

        let err = source.probe(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, CompositorError::Source(SourceError::ToolUnavailable { .. })));

        let err = source.capture_frame(Path::new("clip.mp4"), 1.0).unwrap_err();
        assert!(matches!(err, CompositorError::Source(SourceError::ToolUnavailable { .. })));
    }

    #[test]
    fn test_negative_timestamp_rejected() {
        let source = FfmpegFrameSource::new(&SourceConfig::default());
        assert!(source.capture_frame(Path::new("clip.mp4"), -1.0).is_err());
    }
}
