//! Real font backend: a registry of parsed faces and a rasterizer that draws
//! their outlines with `ab_glyph`.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use log::{debug, warn};
use std::path::Path;

use crate::rendering::color::Rgba;
use crate::rendering::geometry::{Point, Rect};
use crate::rendering::pixmap::Pixmap;
use crate::rendering::text::{FontSpec, TextMetrics, TextRasterizer};
use crate::{Error, Result};

/// Families that match any registered face
const GENERIC_FAMILIES: &[&str] = &["sans-serif", "serif", "monospace", "system-ui"];

struct Face {
    family: String,
    weight: u16,
    font: FontArc,
}

/// Registered font faces, looked up by family list and weight
#[derive(Default)]
pub struct FontBook {
    faces: Vec<Face>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw TrueType/OpenType bytes.
    pub fn add(&mut self, family: &str, weight: u16, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| Error::FontError(format!("{} {}: {}", family, weight, e)))?;
        debug!("registered font face {} {}", family, weight);
        self.faces.push(Face { family: family.to_string(), weight, font });
        Ok(())
    }

    /// Register a face read from disk.
    pub fn load_file(&mut self, family: &str, weight: u16, path: impl AsRef<Path>) -> Result<()> {
        let bytes = std::fs::read(path.as_ref())?;
        self.add(family, weight, bytes)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Closest face for a spec: first family in the list that has any face,
    /// then the registered weight nearest to the requested one. Generic
    /// families match everything. Falls back to the first face.
    pub fn resolve(&self, spec: &FontSpec) -> Result<&FontArc> {
        if self.faces.is_empty() {
            return Err(Error::FontError("no font faces registered".into()));
        }
        for family in spec.families() {
            let generic = GENERIC_FAMILIES.iter().any(|g| g.eq_ignore_ascii_case(family));
            let best = self
                .faces
                .iter()
                .filter(|f| generic || f.family.eq_ignore_ascii_case(family))
                .min_by_key(|f| (f.weight as i32 - spec.weight as i32).abs());
            if let Some(face) = best {
                if face.weight != spec.weight {
                    debug!("{}: using weight {} for {}", face.family, face.weight, spec.weight);
                }
                return Ok(&face.font);
            }
        }
        let first = &self.faces[0];
        warn!("no face matches {:?}; falling back to {}", spec.family, first.family);
        Ok(&first.font)
    }
}

/// [`TextRasterizer`] over a [`FontBook`]
pub struct GlyphRasterizer {
    book: FontBook,
}

impl GlyphRasterizer {
    pub fn new(book: FontBook) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &FontBook {
        &self.book
    }
}

impl TextRasterizer for GlyphRasterizer {
    fn fill_text(
        &self,
        surface: &mut Pixmap,
        content: &str,
        spec: &FontSpec,
        fill: Rgba,
        origin: Point,
    ) -> Result<TextMetrics> {
        let font = self.book.resolve(spec)?;
        let scale = PxScale::from(spec.size.max(0.0));
        let scaled = font.as_scaled(scale);

        // Pen positions along the baseline, kerning applied between pairs.
        let mut pen = 0.0f32;
        let mut prev = None;
        let mut glyphs = Vec::with_capacity(content.len());
        for ch in content.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                pen += scaled.kern(p, id);
            }
            glyphs.push((id, pen));
            pen += scaled.h_advance(id);
            prev = Some(id);
        }
        let advance = pen;

        let ascent = scaled.ascent();
        let descent = -scaled.descent();
        let baseline = origin.y + (ascent - descent) / 2.0;
        let start = origin.x - advance / 2.0;

        let mut ink: Option<Rect> = None;
        for (id, x) in glyphs {
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(start + x, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let b = outlined.px_bounds();
            let (bx, by) = (b.min.x as i64, b.min.y as i64);
            outlined.draw(|gx, gy, coverage| {
                let a = (fill.a as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                surface.blend_pixel(bx + gx as i64, by + gy as i64, Rgba::new(fill.r, fill.g, fill.b, a));
            });
            let r = Rect::new(b.min.x, b.min.y, b.width(), b.height());
            ink = Some(ink.map_or(r, |acc| acc.union(&r)));
        }

        let (left, right) = match ink {
            Some(r) => (origin.x - r.x, r.right() - origin.x),
            None => (advance / 2.0, advance / 2.0),
        };
        Ok(TextMetrics {
            ascent: ascent - (baseline - origin.y),
            descent: descent + (baseline - origin.y),
            left,
            right,
            ink,
        })
    }
}
