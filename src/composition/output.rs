use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::config::OutputConfig;
use crate::error::{CompositionError, Result};

/// Writes composed files into the output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
    atomic: bool,
}

impl OutputWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            atomic: config.atomic_write,
        }
    }

    /// Replace the configured output directory
    pub fn with_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Timestamped name used when a request names no file
    pub fn default_name(extension: &str) -> String {
        format!("thumbnail_{}.{}", chrono::Local::now().format("%Y%m%d_%H%M%S"), extension)
    }

    /// Final path for `name`, or for a default name with `extension`
    ///
    /// Names must be a single plain file name; anything that could point
    /// outside the output directory is rejected.
    pub fn resolve(&self, name: Option<&str>, extension: &str) -> Result<PathBuf> {
        let name = match name {
            Some(name) => name.to_string(),
            None => Self::default_name(extension),
        };

        let mut components = Path::new(&name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.directory.join(&name)),
            _ => Err(CompositionError::InvalidFileName { name }.into()),
        }
    }

    /// Write `bytes` under `name` and return the final path
    pub async fn write(&self, name: Option<&str>, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(name, extension)?;
        let failed = |e: std::io::Error| CompositionError::OutputFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.directory).await.map_err(failed)?;

        if !self.atomic {
            tokio::fs::write(&path, bytes).await.map_err(failed)?;
            debug!("Wrote {} bytes to {:?}", bytes.len(), path);
            return Ok(path);
        }

        let partial = self.partial_path(&path);
        let written = match tokio::fs::write(&partial, bytes).await {
            Ok(()) => tokio::fs::rename(&partial, &path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial output {:?}: {}", partial, cleanup);
                }
            }
            return Err(failed(e).into());
        }

        debug!("Wrote {} bytes to {:?} via {:?}", bytes.len(), path, partial);
        Ok(path)
    }

    /// Hidden sibling the bytes are staged in before the rename
    fn partial_path(&self, path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.directory.join(format!(".{}.partial", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositorError;
    use tempfile::tempdir;

    fn writer(directory: &Path, atomic: bool) -> OutputWriter {
        OutputWriter::new(&OutputConfig {
            directory: directory.to_path_buf(),
            atomic_write: atomic,
        })
    }

    #[test]
    fn test_default_name_shape() {
        let name = OutputWriter::default_name("png");
        assert!(name.starts_with("thumbnail_"));
        assert!(name.ends_with(".png"));
        // thumbnail_YYYYmmdd_HHMMSS.png
        assert_eq!(name.len(), "thumbnail_".len() + 15 + ".png".len());
    }

    #[test]
    fn test_rejects_paths_outside_directory() {
        let writer = writer(Path::new("out"), true);
        for name in ["../escape.png", "nested/file.png", "/abs.png", "..", ".", ""] {
            let err = writer.resolve(Some(name), "png").unwrap_err();
            assert!(
                matches!(err, CompositorError::Composition(CompositionError::InvalidFileName { .. })),
                "name {:?}",
                name
            );
        }
        assert_eq!(writer.resolve(Some("cover.png"), "png").unwrap(), Path::new("out").join("cover.png"));
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_partial() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("thumbs");
        let writer = writer(&out_dir, true);

        let path = writer.write(Some("cover.png"), "png", b"payload").await.unwrap();
        assert_eq!(path, out_dir.join("cover.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        assert!(!out_dir.join(".cover.png.partial").exists());
    }

    #[tokio::test]
    async fn test_direct_write_and_default_name() {
        let dir = tempdir().unwrap();
        let writer = writer(dir.path(), false);

        let path = writer.write(None, "gif", b"GIF89a").await.unwrap();
        assert!(path.extension().map_or(false, |ext| ext == "gif"));
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up() {
        let dir = tempdir().unwrap();
        // a directory in the way makes the rename fail
        std::fs::create_dir(dir.path().join("taken.png")).unwrap();
        std::fs::write(dir.path().join("taken.png").join("keep"), b"x").unwrap();
        let writer = writer(dir.path(), true);

        let err = writer.write(Some("taken.png"), "png", b"payload").await.unwrap_err();
        assert!(matches!(err, CompositorError::Composition(CompositionError::OutputFailed { .. })));
        assert!(!dir.path().join(".taken.png.partial").exists());
    }
}
