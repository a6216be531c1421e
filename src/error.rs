use thiserror::Error;

/// Main error type for the Thumbnail-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Frame source error: {0}")]
    Source(#[from] SourceError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Placement arithmetic errors
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Invalid {what} dimensions: {width}x{height}")]
    InvalidDimension {
        what: &'static str,
        width: f64,
        height: f64,
    },

    #[error("Invalid zoom/pan parameters: {details}")]
    InvalidZoomPan { details: String },
}

/// Canvas and layout selection errors
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Invalid size '{input}', expected <width>x<height>")]
    InvalidSizeFormat { input: String },

    #[error("Unknown layout mode: {name}")]
    UnknownLayout { name: String },
}

/// Text and logo overlay errors
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Font family not available: {family}")]
    FontNotFound { family: String },

    #[error("Failed to load font: {path}")]
    FontLoadFailed { path: String },

    #[error("Invalid color: {value}")]
    InvalidColor { value: String },

    #[error("Invalid text size: {size}")]
    InvalidTextSize { size: f32 },
}

/// Input image and video frame errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to decode image {origin}: {reason}")]
    DecodeFailed { origin: String, reason: String },

    #[error("Frame capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("Video probe failed: {reason}")]
    ProbeFailed { reason: String },

    #[error("Tool not found: {tool}")]
    ToolUnavailable { tool: String },
}

/// Still and animation encoding errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("PNG encoding failed: {reason}")]
    PngFailed { reason: String },

    #[error("Animation encoding failed: {reason}")]
    AnimationFailed { reason: String },

    #[error("Frame too large for animation: {width}x{height}")]
    FrameTooLarge { width: u32, height: u32 },
}

/// Request-level composition errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("Frame sequence is empty")]
    EmptySequence,

    #[error("Invalid request {path}: {reason}")]
    InvalidRequest { path: String, reason: String },

    #[error("Invalid output file name: {name}")]
    InvalidFileName { name: String },

    #[error("Failed to write output {path}: {reason}")]
    OutputFailed { path: String, reason: String },

    #[error("Composition task failed: {reason}")]
    TaskFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Coarse classification of failures as reported at the request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDimension,
    InvalidSizeFormat,
    InvalidParameters,
    DecodeFailure,
    EncodeFailure,
    IoFailure,
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Geometry(GeometryError::InvalidDimension { .. }) => ErrorKind::InvalidDimension,
            Self::Canvas(CanvasError::InvalidSizeFormat { .. }) => ErrorKind::InvalidSizeFormat,
            Self::Source(SourceError::DecodeFailed { .. })
            | Self::Source(SourceError::CaptureFailed { .. })
            | Self::Overlay(OverlayError::FontLoadFailed { .. }) => ErrorKind::DecodeFailure,
            Self::Encode(_) => ErrorKind::EncodeFailure,
            Self::Io(_) | Self::Composition(CompositionError::OutputFailed { .. }) => {
                ErrorKind::IoFailure
            }
            _ => ErrorKind::InvalidParameters,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Canvas(CanvasError::InvalidSizeFormat { input }) => {
                format!("Size '{}' is not valid. Use the form 1280x720.", input)
            }
            Self::Canvas(CanvasError::UnknownLayout { name }) => {
                format!("Layout '{}' not found. Available layouts: single, split, triple, quad", name)
            }
            Self::Source(SourceError::DecodeFailed { origin, .. }) => {
                format!("Could not read image '{}'. Please check it is a PNG, JPEG, GIF, WebP or BMP file.", origin)
            }
            Self::Source(SourceError::ToolUnavailable { tool }) => {
                format!("'{}' was not found. Please install FFmpeg to capture video frames.", tool)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: CompositorError = CanvasError::InvalidSizeFormat { input: "abcx720".into() }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidSizeFormat);

        let err: CompositorError = GeometryError::InvalidDimension { what: "source", width: 0.0, height: 10.0 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidDimension);

        let err: CompositorError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(err.kind(), ErrorKind::IoFailure);

        let err: CompositorError = EncodeError::FrameTooLarge { width: 70000, height: 10 }.into();
        assert_eq!(err.kind(), ErrorKind::EncodeFailure);
    }

    #[test]
    fn test_user_message_mentions_input() {
        let err: CompositorError = CanvasError::InvalidSizeFormat { input: "abcx720".into() }.into();
        assert!(err.user_message().contains("abcx720"));
    }
}
