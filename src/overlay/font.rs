use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use fontdb::{Database, Family, Query, ID};
use image::GrayImage;
use rusttype::{point, Font, Scale};
use tracing::{debug, info};

use crate::config::TextConfig;
use crate::error::{OverlayError, Result};
use crate::overlay::text::{GlyphRasterizer, TextMask};

/// TrueType/OpenType fonts indexed by family name
///
/// A family resolves, in order, to an explicitly registered font, an
/// installed font of that family, the configured default font, and finally
/// any installed sans-serif face. Family lookups are case-insensitive.
pub struct FontLibrary {
    families: HashMap<String, Font<'static>>,
    fallback: Option<Font<'static>>,
    system: Database,
    resolved: Mutex<HashMap<String, Font<'static>>>,
}

impl FontLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self {
            families: HashMap::new(),
            fallback: None,
            system: Database::new(),
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Load every font named in the text configuration
    pub fn from_config(config: &TextConfig) -> Result<Self> {
        let mut library = Self::new();

        if config.system_fonts {
            library.system.load_system_fonts();
        }
        for dir in &config.font_dirs {
            library.system.load_fonts_dir(dir);
        }

        for (family, path) in &config.fonts {
            library.register(family, Self::load_file(path)?);
        }

        if let Some(path) = &config.default_font {
            library.set_fallback(Self::load_file(path)?);
        }

        info!(
            "Font library ready: {} families, {} installed faces, fallback {}",
            library.families.len(),
            library.system.len(),
            if library.fallback.is_some() { "set" } else { "none" }
        );
        Ok(library)
    }

    /// Parse a font file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Font<'static>> {
        let path = path.as_ref();
        let failed = || OverlayError::FontLoadFailed {
            path: path.display().to_string(),
        };

        let bytes = std::fs::read(path).map_err(|_| failed())?;
        Font::try_from_vec(bytes).ok_or_else(|| failed().into())
    }

    /// Register a font under a family name
    pub fn register(&mut self, family: &str, font: Font<'static>) {
        self.families.insert(family.to_lowercase(), font);
    }

    /// Use `font` for any family without its own entry
    pub fn set_fallback(&mut self, font: Font<'static>) {
        self.fallback = Some(font);
    }

    /// Number of installed faces available for lookup
    pub fn installed_faces(&self) -> usize {
        self.system.len()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Font<'static>>> {
        self.resolved.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn font_for(&self, family: &str) -> Result<Font<'static>> {
        let key = family.to_lowercase();
        if let Some(font) = self.families.get(&key) {
            return Ok(font.clone());
        }
        if let Some(font) = self.cache().get(&key) {
            return Ok(font.clone());
        }

        let font = self
            .installed_family(family)
            .or_else(|| self.fallback.clone())
            .or_else(|| self.installed_sans_serif())
            .ok_or_else(|| OverlayError::FontNotFound {
                family: family.to_string(),
            })?;

        self.cache().insert(key, font.clone());
        Ok(font)
    }

    fn installed_family(&self, family: &str) -> Option<Font<'static>> {
        let query = Query {
            families: &[Family::Name(family)],
            ..Query::default()
        };
        let id = self.system.query(&query).or_else(|| {
            self.system
                .faces()
                .find(|face| face.families.iter().any(|(name, _)| name.eq_ignore_ascii_case(family)))
                .map(|face| face.id)
        })?;

        debug!("Font family '{}' found among installed fonts", family);
        self.load_face(id)
    }

    fn installed_sans_serif(&self) -> Option<Font<'static>> {
        let query = Query {
            families: &[Family::SansSerif],
            ..Query::default()
        };
        let id = self.system.query(&query).or_else(|| {
            self.system
                .faces()
                .find(|face| {
                    face.families
                        .iter()
                        .any(|(name, _)| name.to_lowercase().contains("sans"))
                })
                .or_else(|| self.system.faces().next())
                .map(|face| face.id)
        })?;

        self.load_face(id)
    }

    fn load_face(&self, id: ID) -> Option<Font<'static>> {
        self.system
            .with_face_data(id, |data, index| Font::try_from_vec_and_index(data.to_vec(), index))
            .flatten()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer for FontLibrary {
    fn rasterize(&self, family: &str, size: f32, text: &str) -> Result<TextMask> {
        let font = self.font_for(family)?;
        let scale = Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);

        // Room for glyph overhang past the advance box
        let pad = (size * 0.25).ceil().max(2.0);
        let line_height = v_metrics.ascent - v_metrics.descent;

        let glyphs: Vec<_> = font
            .layout(text, scale, point(pad, pad + v_metrics.ascent))
            .collect();

        let advance = glyphs
            .last()
            .map(|g| g.position().x - pad + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);

        let width = (advance + 2.0 * pad).ceil().max(1.0) as u32;
        let height = (line_height + 2.0 * pad).ceil().max(1.0) as u32;
        let mut coverage = GrayImage::new(width, height);

        for glyph in &glyphs {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };

            glyph.draw(|gx, gy, value| {
                let x = gx as i32 + bounds.min.x;
                let y = gy as i32 + bounds.min.y;
                if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                    return;
                }
                let pixel = coverage.get_pixel_mut(x as u32, y as u32);
                let value = (value * 255.0).round().clamp(0.0, 255.0) as u8;
                pixel[0] = pixel[0].max(value);
            });
        }

        debug!(
            "Rasterized '{}' in '{}' at {}px: {}x{} mask",
            text, family, size, width, height
        );

        Ok(TextMask {
            coverage,
            anchor_x: (pad + advance / 2.0) as f64,
            anchor_y: (pad + line_height / 2.0) as f64,
        })
    }
}
