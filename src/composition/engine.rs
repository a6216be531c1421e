use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    canvas::{CanvasSpec, Frame, SourceImage},
    composition::{
        output::OutputWriter,
        request::{AnimationRequest, CompositionReport, FrameRequest, StillRequest},
        sequence::{FrameSequence, SequenceComposer},
        still::StillComposer,
    },
    config::Config,
    encode::{check_dimensions, GifAnimationEncoder},
    error::{CompositionError, CompositorError, Result},
    layout::LayoutMode,
    overlay::{FontLibrary, GlyphRasterizer},
    source::{is_image_file, FfmpegFrameSource, FrameSource, VideoInfo},
};

/// Request boundary for thumbnail composition
///
/// Each request runs as a fixed pipeline:
/// 1. Parse the canvas size and layout, before anything is loaded
/// 2. Load frames (decoded images, or captures from video) and the logo
/// 3. Compose on a blocking worker inside the render pool
/// 4. Write the encoded file into the output directory
///
/// Failures never escape; they come back as an unsuccessful report.
pub struct CompositionEngine {
    config: Config,
    glyphs: Arc<dyn GlyphRasterizer>,
    source: Arc<dyn FrameSource>,
    pool: Arc<rayon::ThreadPool>,
    writer: OutputWriter,
}

impl CompositionEngine {
    /// Create an engine with explicit text and frame backends
    pub fn new(config: Config, glyphs: Arc<dyn GlyphRasterizer>, source: Arc<dyn FrameSource>) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.render.threads)
            .thread_name(|i| format!("compose-{}", i))
            .build()
            .map_err(|e| CompositorError::generic(format!("Failed to start render pool: {}", e)))?;

        let writer = OutputWriter::new(&config.output);

        Ok(Self {
            config,
            glyphs,
            source,
            pool: Arc::new(pool),
            writer,
        })
    }

    /// Create an engine using the configured fonts and the ffmpeg tools
    pub fn from_config(config: Config) -> Result<Self> {
        let fonts = FontLibrary::from_config(&config.text)?;
        let source = FfmpegFrameSource::new(&config.source);
        Self::new(config, Arc::new(fonts), Arc::new(source))
    }

    /// Write results somewhere other than the configured directory
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.writer = self.writer.with_directory(directory);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compose a still thumbnail and write it as PNG
    pub async fn create_still(&self, request: StillRequest) -> CompositionReport {
        match self.compose_still(request).await {
            Ok((path, message)) => {
                info!("{}: {:?}", message, path);
                CompositionReport::succeeded(path, message)
            }
            Err(e) => {
                warn!("Still thumbnail failed: {}", e);
                CompositionReport::failed(&e)
            }
        }
    }

    /// Compose an animated thumbnail and write it as GIF
    pub async fn create_animation(&self, request: AnimationRequest) -> CompositionReport {
        match self.compose_animation(request).await {
            Ok((path, message)) => {
                info!("{}: {:?}", message, path);
                CompositionReport::succeeded(path, message)
            }
            Err(e) => {
                warn!("Animated thumbnail failed: {}", e);
                CompositionReport::failed(&e)
            }
        }
    }

    /// Describe a video through the frame source
    pub async fn probe(&self, video: &Path) -> Result<VideoInfo> {
        let source = Arc::clone(&self.source);
        let video = video.to_path_buf();
        run_blocking(move || source.probe(&video)).await
    }

    /// Grab one frame from a video through the frame source
    pub async fn capture(&self, video: &Path, timestamp: f64) -> Result<SourceImage> {
        let source = Arc::clone(&self.source);
        let video = video.to_path_buf();
        run_blocking(move || source.capture_frame(&video, timestamp)).await
    }

    async fn compose_still(&self, request: StillRequest) -> Result<(PathBuf, String)> {
        let canvas_spec = self.canvas_spec(request.size.as_deref())?;
        let mode: LayoutMode = request
            .layout
            .as_deref()
            .unwrap_or(self.config.canvas.default_layout.as_str())
            .parse()?;
        info!("Composing {} '{}' thumbnail from {} frames", canvas_spec, mode, request.frames.len());

        let frames = self.load_frames(request.frames).await?;
        let logo = match request.logo {
            Some(path) => Some(run_blocking(move || SourceImage::open(path)).await?),
            None => None,
        };

        let composer = StillComposer::new(Arc::clone(&self.glyphs));
        let pool = Arc::clone(&self.pool);
        let text = request.text;
        let drawn = frames.len().min(mode.capacity());
        let bytes = run_blocking(move || {
            pool.install(|| composer.render(&frames, mode, canvas_spec, text.as_ref(), logo.as_ref()))
        })
        .await?;

        let path = self.writer.write(request.output.as_deref(), "png", &bytes).await?;
        let message = format!("Thumbnail created: {} {} with {} frames", canvas_spec, mode, drawn);
        Ok((path, message))
    }

    async fn compose_animation(&self, request: AnimationRequest) -> Result<(PathBuf, String)> {
        let canvas_spec = self.canvas_spec(request.size.as_deref())?;
        if request.frames.is_empty() {
            return Err(CompositionError::EmptySequence.into());
        }
        let mut encoder = GifAnimationEncoder::new();
        check_dimensions(&encoder, canvas_spec.width, canvas_spec.height)?;
        let delay_ms = request.delay_ms.unwrap_or(self.config.animation.delay_ms);
        info!(
            "Composing {} animated thumbnail from {} frames, {}ms apart",
            canvas_spec,
            request.frames.len(),
            delay_ms
        );

        let frames = self.load_frames(request.frames).await?;
        let sequence = FrameSequence::new(frames, delay_ms, canvas_spec);

        let composer = SequenceComposer::new(self.config.animation.quality);
        let pool = Arc::clone(&self.pool);
        let count = sequence.len();
        let bytes = run_blocking(move || {
            pool.install(|| composer.render(&sequence, &mut encoder))
        })
        .await?;

        let path = self.writer.write(request.output.as_deref(), "gif", &bytes).await?;
        let message = format!("Animated thumbnail created: {} with {} frames", canvas_spec, count);
        Ok((path, message))
    }

    fn canvas_spec(&self, size: Option<&str>) -> Result<CanvasSpec> {
        size.unwrap_or(self.config.canvas.default_size.as_str()).parse()
    }

    /// Validate every frame's parameters, then load them in order
    async fn load_frames(&self, requests: Vec<FrameRequest>) -> Result<Vec<Frame>> {
        for request in &requests {
            request.params.validate()?;
        }

        let source = Arc::clone(&self.source);
        run_blocking(move || {
            requests
                .into_iter()
                .map(|request| {
                    let image = match request.timestamp {
                        Some(timestamp) => source.capture_frame(&request.path, timestamp)?,
                        None if is_image_file(&request.path) => SourceImage::open(&request.path)?,
                        // videos without a timestamp show their first frame
                        None => source.capture_frame(&request.path, 0.0)?,
                    };
                    debug!(
                        "Loaded {:?}{}: {}x{}",
                        request.path,
                        request.timestamp.map(|t| format!(" @ {:.3}s", t)).unwrap_or_default(),
                        image.width(),
                        image.height()
                    );
                    Ok(Frame::new(image, request.params))
                })
                .collect()
        })
        .await
    }
}

/// Run blocking work off the async runtime
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CompositionError::TaskFailed { reason: e.to_string() })?
}
