//! The `Asset` value: an optional bitmap plus the frame that anchors it

use crate::rendering::geometry::{Point, Rect, Size};
use crate::rendering::pixmap::Pixmap;
use crate::Result;

/// Layout frame of an asset
///
/// `size` is the extent the asset occupies in a layout. `anchor` is the
/// offset from the bitmap's top-left corner to the frame's top-left corner,
/// so a bitmap carrying ink outside its frame (or a frame that only covers
/// part of its bitmap) can still be placed exactly: placing the asset at
/// `(dx, dy)` draws the bitmap at `(dx - anchor.x, dy - anchor.y)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub anchor: Point,
    pub size: Size,
}

impl Frame {
    pub fn new(anchor: Point, size: Size) -> Self {
        Self { anchor, size }
    }

    /// Frame with no anchor offset
    pub fn sized(w: f32, h: f32) -> Self {
        Self::new(Point::ZERO, Size::new(w, h))
    }
}

/// A positioned, immutable bitmap
///
/// An asset without a bitmap still occupies its frame's size in a layout
/// but draws nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Asset {
    pub bitmap: Option<Pixmap>,
    pub frame: Frame,
}

impl Asset {
    pub fn new(bitmap: Option<Pixmap>, frame: Frame) -> Self {
        Self { bitmap, frame }
    }

    /// Blank asset of a fixed size
    pub fn spacer(w: f32, h: f32) -> Self {
        Self::new(None, Frame::sized(w, h))
    }

    pub fn size(&self) -> Size {
        self.frame.size
    }

    pub fn width(&self) -> f32 {
        self.frame.size.w
    }

    pub fn height(&self) -> f32 {
        self.frame.size.h
    }

    /// Cut an asset out of a working surface.
    ///
    /// `frame` is where the asset's layout box sits on `surface`; `drawn`
    /// covers whatever was painted for it. The bitmap keeps the union of the
    /// two (clipped to the surface) so no ink is lost, and the anchor records
    /// where the frame starts inside it.
    pub fn extract(surface: &Pixmap, frame: Rect, drawn: Rect) -> Result<Asset> {
        let size = Size::new(frame.w.max(0.0), frame.h.max(0.0));
        let region = frame.union(&drawn).intersect(&surface.bounds()).round_out();
        if region.is_empty() {
            return Ok(Asset::new(None, Frame::new(Point::ZERO, size)));
        }
        let bitmap = surface.crop(region.x as i64, region.y as i64, region.w as u32, region.h as u32)?;
        let anchor = Point::new(frame.x - region.x, frame.y - region.y);
        Ok(Asset::new(Some(bitmap), Frame::new(anchor, size)))
    }

    /// Draw with the frame's top-left at `at`. Returns the rectangle the
    /// bitmap covers on `target` (empty when there is no bitmap).
    pub fn draw_onto(&self, target: &mut Pixmap, at: Point) -> Rect {
        let Some(bitmap) = &self.bitmap else {
            return Rect::at(at);
        };
        let x = at.x - self.frame.anchor.x;
        let y = at.y - self.frame.anchor.y;
        target.draw_pixmap(bitmap, x, y);
        Rect::new(x, y, bitmap.width() as f32, bitmap.height() as f32)
    }
}

/// Place `asset` on `target` with its frame's top-left at `(dx, dy)`.
pub fn draw_asset(target: &mut Pixmap, asset: &Asset, dx: f32, dy: f32) {
    asset.draw_onto(target, Point::new(dx, dy));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::color::Rgba;

    #[test]
    fn spacer_has_size_but_no_bitmap() {
        let s = Asset::spacer(10.0, 4.0);
        assert!(s.bitmap.is_none());
        assert_eq!(s.size(), Size::new(10.0, 4.0));
        let mut target = Pixmap::new(8, 8).unwrap();
        let r = s.draw_onto(&mut target, Point::new(1.0, 1.0));
        assert!(r.is_empty());
        assert!(target.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn extract_keeps_ink_outside_frame() {
        let mut surface = Pixmap::new(20, 20).unwrap();
        surface.fill_rect(Rect::new(4.0, 4.0, 8.0, 8.0), Rgba::WHITE);
        let frame = Rect::new(6.0, 6.0, 4.0, 4.0);
        let a = Asset::extract(&surface, frame, Rect::new(4.0, 4.0, 8.0, 8.0)).unwrap();
        let bm = a.bitmap.as_ref().unwrap();
        assert_eq!((bm.width(), bm.height()), (8, 8));
        assert_eq!(a.frame.anchor, Point::new(2.0, 2.0));
        assert_eq!(a.size(), Size::new(4.0, 4.0));

        // Placing the frame at (10, 10) puts the ink back around it.
        let mut target = Pixmap::new(20, 20).unwrap();
        draw_asset(&mut target, &a, 10.0, 10.0);
        assert_eq!(target.pixel(8, 8), Some(Rgba::WHITE));
        assert_eq!(target.pixel(7, 7), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn extract_of_nothing_is_blank() {
        let surface = Pixmap::new(10, 10).unwrap();
        let a = Asset::extract(&surface, Rect::new(5.0, 5.0, 0.0, 0.0), Rect::default()).unwrap();
        assert!(a.bitmap.is_none());
        assert_eq!(a.size(), Size::ZERO);
    }
}
