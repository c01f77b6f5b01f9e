//! Asset builder: text, spacers, padded boxes and linear row/column layout
//!
//! The factory owns one scratch surface, at least as large as the final
//! composition. Every drawing operation clears it, paints its primitive
//! around the surface center and cuts the result out as a fresh [`Asset`],
//! so nothing leaks from one call into the next. Layout is strictly bottom-up:
//! children are measured (built) before the composite that stacks them.

use log::debug;

use crate::rendering::asset::{Asset, Frame};
use crate::rendering::color::Rgba;
use crate::rendering::geometry::{grow, grow_from_center, Padding, Point, Rect, Size};
use crate::rendering::pixmap::{Pixmap, DEFAULT_MAX_PIXELS};
use crate::rendering::text::{TextRasterizer, TextStyle};
use crate::Result;

/// Background, padding and minimum height of a [`AssetFactory::boxed`] asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub background: Rgba,
    pub padding: Padding,
    pub min_height: f32,
}

impl BoxStyle {
    pub fn new(background: Rgba) -> Self {
        Self { background, padding: Padding::ZERO, min_height: 0.0 }
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn min_height(mut self, min_height: f32) -> Self {
        self.min_height = min_height;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn main(self, s: Size) -> f32 {
        match self {
            Axis::Horizontal => s.w,
            Axis::Vertical => s.h,
        }
    }

    fn cross(self, s: Size) -> f32 {
        match self {
            Axis::Horizontal => s.h,
            Axis::Vertical => s.w,
        }
    }

    fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    fn advance(self, origin: Point, by: f32) -> Point {
        match self {
            Axis::Horizontal => Point::new(origin.x + by, origin.y),
            Axis::Vertical => Point::new(origin.x, origin.y + by),
        }
    }
}

pub struct AssetFactory<'r> {
    surface: Pixmap,
    rasterizer: &'r dyn TextRasterizer,
}

impl<'r> AssetFactory<'r> {
    /// Acquire a `width × height` scratch surface.
    ///
    /// Fails with [`crate::Error::SurfaceError`] when the surface cannot be
    /// allocated; callers treat that as fatal for the render pass.
    pub fn new(width: u32, height: u32, rasterizer: &'r dyn TextRasterizer) -> Result<Self> {
        Self::with_limit(width, height, DEFAULT_MAX_PIXELS, rasterizer)
    }

    pub fn with_limit(
        width: u32,
        height: u32,
        max_pixels: u64,
        rasterizer: &'r dyn TextRasterizer,
    ) -> Result<Self> {
        let surface = Pixmap::with_limit(width, height, max_pixels)?;
        debug!("asset factory surface {}x{}", width, height);
        Ok(Self { surface, rasterizer })
    }

    pub fn surface_size(&self) -> Size {
        Size::new(self.surface.width() as f32, self.surface.height() as f32)
    }

    fn center(&self) -> Point {
        let s = self.surface_size();
        Point::new(s.w / 2.0, s.h / 2.0)
    }

    /// Render `content` and frame it by its font box and ink extent.
    ///
    /// The frame's top-left is the corner of
    /// `grow(center, {ascent, right, descent, left})`, so the asset can be
    /// stacked by its visual box regardless of where the glyphs sit.
    pub fn text(&mut self, content: &str, style: &TextStyle) -> Result<Asset> {
        self.surface.clear();
        let c = self.center();
        let metrics = self.rasterizer.fill_text(&mut self.surface, content, &style.font, style.fill, c)?;
        let frame = grow(Rect::at(c), metrics.extents());
        let drawn = metrics.ink.unwrap_or_else(|| Rect::at(c));
        Asset::extract(&self.surface, frame, drawn)
    }

    pub fn space(&self, w: f32, h: f32) -> Asset {
        Asset::spacer(w, h)
    }

    pub fn hspace(&self, w: f32) -> Asset {
        Asset::spacer(w, 0.0)
    }

    pub fn vspace(&self, h: f32) -> Asset {
        Asset::spacer(0.0, h)
    }

    /// Center `content` on a filled background grown by `style.padding`.
    ///
    /// When the padded box is shorter than `style.min_height` it grows
    /// equally at top and bottom; width never changes. The returned frame is
    /// the box itself.
    pub fn boxed(&mut self, content: Asset, style: BoxStyle) -> Result<Asset> {
        self.surface.clear();
        let c = self.center();
        let content_rect = grow_from_center(Rect::at(c), content.width(), content.height());
        let mut box_rect = grow(content_rect, style.padding);
        if box_rect.h < style.min_height {
            box_rect = grow_from_center(box_rect, 0.0, style.min_height - box_rect.h);
        }
        self.surface.fill_rect(box_rect, style.background);
        let drawn = content.draw_onto(&mut self.surface, content_rect.origin());
        Asset::extract(&self.surface, box_rect, box_rect.union(&drawn))
    }

    /// Lay children out left to right, top-aligned, `gap` apart.
    pub fn row(&mut self, children: Vec<Asset>, gap: f32) -> Result<Asset> {
        self.linear(children, gap, Axis::Horizontal)
    }

    /// Stack children top to bottom, left-aligned, `gap` apart.
    pub fn col(&mut self, children: Vec<Asset>, gap: f32) -> Result<Asset> {
        self.linear(children, gap, Axis::Vertical)
    }

    fn linear(&mut self, children: Vec<Asset>, gap: f32, axis: Axis) -> Result<Asset> {
        self.surface.clear();
        let gaps = gap * children.len().saturating_sub(1) as f32;
        let (main, cross) = children
            .iter()
            .fold((0.0f32, 0.0f32), |(m, c), a| (m + axis.main(a.size()), c.max(axis.cross(a.size()))));
        let size = axis.size(main + gaps, cross);

        let c = self.center();
        let origin = Point::new(c.x - size.w / 2.0, c.y - size.h / 2.0);
        let frame = Rect::from_origin_size(origin, size);

        // Nothing to cut out when every child is blank.
        if children.iter().all(|child| child.bitmap.is_none()) {
            return Ok(Asset::new(None, Frame::sized(size.w.max(0.0), size.h.max(0.0))));
        }

        let (drawn, _) = children.iter().fold((Rect::at(origin), 0.0f32), |(drawn, cursor), child| {
            let r = child.draw_onto(&mut self.surface, axis.advance(origin, cursor));
            (drawn.union(&r), cursor + axis.main(child.size()) + gap)
        });
        Asset::extract(&self.surface, frame, drawn)
    }
}
