//! Text measurement and rasterization contract
//!
//! A [`TextRasterizer`] is the host font primitive the asset builder wraps:
//! it draws a string centered on a point (horizontally centered, "middle"
//! baseline) and reports where the ink and the font box ended up relative to
//! that point. Backends:
//! - [`HeadlessRasterizer`]: deterministic block glyphs with metrics that are
//!   exact functions of the font size, for tests and font-less environments
//! - `GlyphRasterizer` (feature `glyph`): TrueType/OpenType outlines

use std::fmt;

use crate::rendering::color::Rgba;
use crate::rendering::geometry::{Padding, Point, Rect};
use crate::rendering::pixmap::Pixmap;
use crate::Result;

/// Font selection: CSS-like family list, numeric weight, pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Comma separated family names, first match wins (e.g. `"CA Saygon Text", sans-serif`)
    pub family: String,
    /// 100..=900
    pub weight: u16,
    /// Pixel size, already multiplied by the supersampling factor
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: u16, size: f32) -> Self {
        Self { family: family.into(), weight, size }
    }

    /// Family names in priority order with quotes stripped
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.family
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|f| !f.is_empty())
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}px {}", self.weight, self.size, self.family)
    }
}

/// Font and fill color for a text primitive
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub fill: Rgba,
}

impl TextStyle {
    pub fn new(font: FontSpec, fill: Rgba) -> Self {
        Self { font, fill }
    }
}

/// Metrics of a rendered run, relative to the render point
///
/// `ascent`/`descent` come from the font-wide bounding box, `left`/`right`
/// from the actual ink; all are distances, so a box around the run is
/// `grow(point, {t: ascent, r: right, b: descent, l: left})`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub left: f32,
    pub right: f32,
    /// Surface-absolute bounds of every pixel the run touched
    pub ink: Option<Rect>,
}

impl TextMetrics {
    /// How far each side of the layout box lies from the render point
    pub fn extents(&self) -> Padding {
        Padding::new(self.ascent, self.right, self.descent, self.left)
    }

    pub fn width(&self) -> f32 {
        self.left + self.right
    }

    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Host text primitive
pub trait TextRasterizer: Send + Sync {
    /// Draw `content` onto `surface`, centered horizontally on `origin.x` and
    /// with the middle of the font box on `origin.y`, and report its metrics.
    ///
    /// An empty string draws nothing and returns near-zero metrics.
    fn fill_text(
        &self,
        surface: &mut Pixmap,
        content: &str,
        font: &FontSpec,
        fill: Rgba,
        origin: Point,
    ) -> Result<TextMetrics>;

    /// Measure without a visible effect
    fn measure(&self, content: &str, font: &FontSpec) -> Result<TextMetrics> {
        let mut scratch = Pixmap::new(0, 0)?;
        self.fill_text(&mut scratch, content, font, Rgba::TRANSPARENT, Point::ZERO)
    }
}

/// Deterministic stand-in for a real font
///
/// Every character advances `0.6 × size`. Non-whitespace characters are
/// drawn as a solid block `0.5 × size` wide and `0.7 × size` tall sitting on
/// the baseline. The font box spans `0.8 × size` above and `0.2 × size`
/// below the baseline, so a run is always exactly `size` tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRasterizer;

impl HeadlessRasterizer {
    pub const ADVANCE: f32 = 0.6;
    pub const INK_WIDTH: f32 = 0.5;
    pub const INK_HEIGHT: f32 = 0.7;
    pub const ASCENT: f32 = 0.8;
    pub const DESCENT: f32 = 0.2;

    pub fn new() -> Self {
        HeadlessRasterizer
    }
}

impl TextRasterizer for HeadlessRasterizer {
    fn fill_text(
        &self,
        surface: &mut Pixmap,
        content: &str,
        font: &FontSpec,
        fill: Rgba,
        origin: Point,
    ) -> Result<TextMetrics> {
        let size = font.size.max(0.0);
        let advance = Self::ADVANCE * size;
        let total = advance * content.chars().count() as f32;
        let ascent = Self::ASCENT * size;
        let descent = Self::DESCENT * size;
        let baseline = origin.y + (ascent - descent) / 2.0;
        let start = origin.x - total / 2.0;
        let side = (advance - Self::INK_WIDTH * size) / 2.0;

        let mut ink: Option<Rect> = None;
        for (i, ch) in content.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let glyph = Rect::new(
                start + advance * i as f32 + side,
                baseline - Self::INK_HEIGHT * size,
                Self::INK_WIDTH * size,
                Self::INK_HEIGHT * size,
            );
            surface.fill_rect(glyph, fill);
            ink = Some(ink.map_or(glyph, |r| r.union(&glyph)));
        }

        let (left, right) = match ink {
            Some(r) => (origin.x - r.x, r.right() - origin.x),
            None => (total / 2.0, total / 2.0),
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
