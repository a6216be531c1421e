use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    canvas::CanvasSpec,
    encode::DEFAULT_QUALITY,
    error::{ConfigError, Result},
    layout::LayoutMode,
};

/// Main configuration for the Thumbnail-Compositor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas defaults
    pub canvas: CanvasConfig,

    /// Where results are written
    pub output: OutputConfig,

    /// Font registry for text overlays
    pub text: TextConfig,

    /// Animated thumbnail settings
    pub animation: AnimationConfig,

    /// External video tools
    pub source: SourceConfig,

    /// Rasterization settings
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        self.output.validate()?;
        self.animation.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

/// Canvas defaults used when a request leaves them out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size string such as "1280x720"
    pub default_size: String,

    /// Layout name such as "single"
    pub default_layout: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_size: "1280x720".to_string(),
            default_layout: LayoutMode::Single.name().to_string(),
        }
    }
}

impl CanvasConfig {
    fn validate(&self) -> Result<()> {
        if self.default_size.parse::<CanvasSpec>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "canvas.default_size".to_string(),
                value: self.default_size.clone()
            }.into());
        }

        if self.default_layout.parse::<LayoutMode>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "canvas.default_layout".to_string(),
                value: self.default_layout.clone()
            }.into());
        }

        Ok(())
    }
}

/// Output location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving every composed file
    pub directory: PathBuf,

    /// Write to a temporary sibling and rename into place
    pub atomic_write: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("thumbnails"),
            atomic_write: true,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.directory".to_string(),
                value: String::new()
            }.into());
        }
        Ok(())
    }
}

/// Font files available to text overlays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Font used for families without their own entry
    pub default_font: Option<PathBuf>,

    /// Family name to font file
    pub fonts: HashMap<String, PathBuf>,

    /// Look families up among the installed system fonts
    pub system_fonts: bool,

    /// Extra directories scanned for font files
    pub font_dirs: Vec<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_font: None,
            fonts: HashMap::new(),
            system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Animated thumbnail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Delay between frames when a request gives none (ms)
    pub delay_ms: u32,

    /// NeuQuant sampling factor, 1 (best) to 30 (fastest)
    pub quality: u8,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl AnimationConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=30).contains(&self.quality) {
            return Err(ConfigError::InvalidValue {
                key: "animation.quality".to_string(),
                value: self.quality.to_string()
            }.into());
        }
        Ok(())
    }
}

/// Paths to the ffmpeg tools used for frame capture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub ffmpeg: PathBuf,

    pub ffprobe: PathBuf,

    /// Scratch directory for captured frames; the OS temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            temp_dir: None,
        }
    }
}

/// Rasterization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Worker threads used for scaled drawing
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render.threads".to_string(),
                value: self.threads.to_string()
            }.into());
        }
        Ok(())
    }
}
