//! Rectangle and padding value types with the pure arithmetic the layout
//! engine is built on.
//!
//! All coordinates are logical units multiplied by the scene's supersampling
//! factor, i.e. surface pixels, but kept as `f32` so fractional design
//! coordinates survive until a bitmap is actually blitted.

use std::ops::Add;

/// A point on a surface, or an offset inside a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of an extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub const ZERO: Size = Size { w: 0.0, h: 0.0 };

    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }
}

/// Axis-aligned rectangle `{x, y, w, h}`
///
/// Width and height are expected to be non-negative. Shrinking past zero
/// (negative padding) is allowed and yields an empty rectangle; see
/// [`Rect::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Per-side padding `{t, r, b, l}`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub t: f32,
    pub r: f32,
    pub b: f32,
    pub l: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Zero-size rectangle at a point
    pub fn at(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Expand every side by the matching padding component.
    pub fn grow(&self, p: Padding) -> Rect {
        grow(*self, p)
    }

    /// Expand width by `dw` and height by `dh`, keeping the center fixed.
    pub fn grow_from_center(&self, dw: f32, dh: f32) -> Rect {
        grow_from_center(*self, dw, dh)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        union(*self, *other)
    }

    /// Intersection with another rectangle; empty inputs give an empty result
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        Rect::new(x, y, (r - x).max(0.0), (b - y).max(0.0))
    }

    /// Smallest rectangle with integral edges containing this one.
    pub fn round_out(&self) -> Rect {
        let x = self.x.floor();
        let y = self.y.floor();
        let r = self.right().ceil();
        let b = self.bottom().ceil();
        Rect::new(x, y, (r - x).max(0.0), (b - y).max(0.0))
    }
}

/// Expand every side of `rect` by the matching component of `p`.
///
/// Negative components shrink. Sequential applications are additive, so
/// `grow(grow(r, p1), p2) == grow(r, p1 + p2)`.
pub fn grow(rect: Rect, p: Padding) -> Rect {
    Rect::new(rect.x - p.l, rect.y - p.t, rect.w + p.l + p.r, rect.h + p.t + p.b)
}

/// Expand `rect` by `dw` horizontally and `dh` vertically, split evenly on
/// both sides so the center stays put.
pub fn grow_from_center(rect: Rect, dw: f32, dh: f32) -> Rect {
    grow(rect, Padding::symmetric(dh / 2.0, dw / 2.0))
}

/// Smallest rectangle containing both inputs. Empty rectangles contribute
/// nothing unless both are empty, in which case `a` is returned.
pub fn union(a: Rect, b: Rect) -> Rect {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => a,
        (true, false) => b,
        (false, true) => a,
        (false, false) => {
            let x = a.x.min(b.x);
            let y = a.y.min(b.y);
            let r = a.right().max(b.right());
            let bt = a.bottom().max(b.bottom());
            Rect::new(x, y, r - x, bt - y)
        }
    }
}

impl Padding {
    pub const ZERO: Padding = Padding { t: 0.0, r: 0.0, b: 0.0, l: 0.0 };

    pub fn new(t: f32, r: f32, b: f32, l: f32) -> Self {
        Self { t, r, b, l }
    }

    pub fn uniform(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// `vertical` on top and bottom, `horizontal` on left and right
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Sum matching sides.
    pub fn merge(self, other: Padding) -> Padding {
        Padding::new(self.t + other.t, self.r + other.r, self.b + other.b, self.l + other.l)
    }

    /// Scale every side, e.g. by a supersampling factor
    pub fn scale(self, s: f32) -> Padding {
        Padding::new(self.t * s, self.r * s, self.b * s, self.l * s)
    }
}

impl Add for Padding {
    type Output = Padding;

    fn add(self, rhs: Padding) -> Padding {
        self.merge(rhs)
    }
}

// Quad conversions: rect as [x, y, w, h], padding as [t, r, b, l].

impl From<[f32; 4]> for Rect {
    fn from([x, y, w, h]: [f32; 4]) -> Self {
        Rect::new(x, y, w, h)
    }
}

impl From<Rect> for [f32; 4] {
    fn from(r: Rect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

impl From<[f32; 4]> for Padding {
    fn from([t, r, b, l]: [f32; 4]) -> Self {
        Padding::new(t, r, b, l)
    }
}

impl From<Padding> for [f32; 4] {
    fn from(p: Padding) -> Self {
        [p.t, p.r, p.b, p.l]
    }
}
