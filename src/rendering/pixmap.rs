//! Owned RGBA8 raster buffer with the handful of drawing operations the
//! asset builder and the scenes need.
//!
//! Pixels are stored row-major with straight (non-premultiplied) alpha, the
//! same convention a 2D canvas exposes through its image data. Drawing uses
//! source-over compositing. Fractional destination offsets are rounded to the
//! nearest pixel.

use sha2::{Digest, Sha256};

use crate::rendering::color::Rgba;
use crate::rendering::geometry::Rect;
use crate::{Error, Result};

/// Default allocation budget for a single surface (64 Mi pixels)
pub const DEFAULT_MAX_PIXELS: u64 = 64 * 1024 * 1024;

#[derive(Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Pixmap {
    /// Allocate a transparent surface within the default pixel budget.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_limit(width, height, DEFAULT_MAX_PIXELS)
    }

    /// Allocate a transparent surface, failing when it would exceed
    /// `max_pixels` or when the allocator refuses the request.
    pub fn with_limit(width: u32, height: u32, max_pixels: u64) -> Result<Self> {
        let pixels = width as u64 * height as u64;
        if pixels > max_pixels {
            return Err(Error::SurfaceError(format!(
                "{}x{} exceeds the budget of {} pixels",
                width, height, max_pixels
            )));
        }
        let len = usize::try_from(pixels * 4)
            .map_err(|_| Error::SurfaceError(format!("{}x{} is not addressable", width, height)))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::SurfaceError(format!("{}x{}: {}", width, height, e)))?;
        data.resize(len, 0);
        Ok(Self { width, height, data })
    }

    /// Copy this surface into a fresh allocation held to `max_pixels`.
    pub fn try_clone(&self, max_pixels: u64) -> Result<Self> {
        let mut copy = Self::with_limit(self.width, self.height, max_pixels)?;
        copy.data.copy_from_slice(&self.data);
        Ok(copy)
    }

    /// Wrap existing RGBA8 bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::DecodeError(format!(
                "expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Surface filled with a vertical two-color gradient, top to bottom
    pub fn vertical_gradient(width: u32, height: u32, top: Rgba, bottom: Rgba) -> Result<Self> {
        let mut pm = Self::new(width, height)?;
        let span = height.saturating_sub(1).max(1) as f32;
        for y in 0..height {
            let t = y as f32 / span;
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            let c = [mix(top.r, bottom.r), mix(top.g, bottom.g), mix(top.b, bottom.b), mix(top.a, bottom.a)];
            let row = pm.row_mut(y);
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&c);
            }
        }
        Ok(pm)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bounds as a rectangle at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Pixel at `(x, y)`, or `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgba::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, c: Rgba) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.data[i..i + 4].copy_from_slice(&c.to_array());
        }
    }

    /// Composite a single pixel; coordinates outside the surface are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, c: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 || c.a == 0 {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        blend_over(&mut self.data[i..i + 4], c.to_array());
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Replace every pixel with `c`, ignoring what was there.
    pub fn fill(&mut self, c: Rgba) {
        let c = c.to_array();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    /// Integral pixel span `[start, end)` covered by `[lo, lo + len)` along an
    /// axis of `limit` pixels.
    fn span(lo: f32, len: f32, limit: u32) -> (u32, u32) {
        let start = lo.round().max(0.0).min(limit as f32) as u32;
        let end = (lo + len).round().max(0.0).min(limit as f32) as u32;
        (start, end.max(start))
    }

    /// Composite `c` over the pixels covered by `rect`.
    pub fn fill_rect(&mut self, rect: Rect, c: Rgba) {
        if rect.is_empty() || c.a == 0 {
            return;
        }
        let (x0, x1) = Self::span(rect.x, rect.w, self.width);
        let (y0, y1) = Self::span(rect.y, rect.h, self.height);
        let src = c.to_array();
        for y in y0..y1 {
            let row = self.row_mut(y);
            for x in x0..x1 {
                let i = x as usize * 4;
                blend_over(&mut row[i..i + 4], src);
            }
        }
    }

    /// Composite `src` with its top-left corner at `(dx, dy)`.
    pub fn draw_pixmap(&mut self, src: &Pixmap, dx: f32, dy: f32) {
        let ox = dx.round() as i64;
        let oy = dy.round() as i64;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + src.width as i64).min(self.width as i64);
        let y1 = (oy + src.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0..y1 {
            let sy = (y - oy) as u32;
            for x in x0..x1 {
                let sx = (x - ox) as u32;
                let si = src.offset(sx, sy);
                let s = [src.data[si], src.data[si + 1], src.data[si + 2], src.data[si + 3]];
                if s[3] == 0 {
                    continue;
                }
                let di = self.offset(x as u32, y as u32);
                blend_over(&mut self.data[di..di + 4], s);
            }
        }
    }

    /// Composite `src` stretched onto `dst` with bilinear sampling.
    pub fn draw_pixmap_scaled(&mut self, src: &Pixmap, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let (x0, x1) = Self::span(dst.x, dst.w, self.width);
        let (y0, y1) = Self::span(dst.y, dst.h, self.height);
        let sx_scale = src.width as f32 / dst.w;
        let sy_scale = src.height as f32 / dst.h;
        for y in y0..y1 {
            let v = (y as f32 + 0.5 - dst.y) * sy_scale - 0.5;
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - dst.x) * sx_scale - 0.5;
                let s = src.sample_bilinear(u, v);
                if s[3] == 0 {
                    continue;
                }
                let di = self.offset(x, y);
                blend_over(&mut self.data[di..di + 4], s);
            }
        }
    }

    /// Bilinear sample at a continuous source coordinate, edges clamped.
    /// Interpolation happens on premultiplied values.
    fn sample_bilinear(&self, u: f32, v: f32) -> [u8; 4] {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let u = u.clamp(0.0, max_x);
        let v = v.clamp(0.0, max_y);
        let (ux, vy) = (u.floor(), v.floor());
        let (fx, fy) = (u - ux, v - vy);
        let (ax, ay) = (ux as u32, vy as u32);
        let bx = (ax + 1).min(self.width - 1);
        let by = (ay + 1).min(self.height - 1);

        let mut acc = [0f32; 4];
        for (px, py, wgt) in [
            (ax, ay, (1.0 - fx) * (1.0 - fy)),
            (bx, ay, fx * (1.0 - fy)),
            (ax, by, (1.0 - fx) * fy),
            (bx, by, fx * fy),
        ] {
            let i = self.offset(px, py);
            let a = self.data[i + 3] as f32 * wgt;
            acc[0] += self.data[i] as f32 * a;
            acc[1] += self.data[i + 1] as f32 * a;
            acc[2] += self.data[i + 2] as f32 * a;
            acc[3] += a;
        }
        if acc[3] <= 0.0 {
            return [0, 0, 0, 0];
        }
        [
            (acc[0] / acc[3]).round().clamp(0.0, 255.0) as u8,
            (acc[1] / acc[3]).round().clamp(0.0, 255.0) as u8,
            (acc[2] / acc[3]).round().clamp(0.0, 255.0) as u8,
            acc[3].round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Copy the region `(x, y, w, h)` into a new surface. Pixels outside this
    /// surface read as transparent.
    pub fn crop(&self, x: i64, y: i64, w: u32, h: u32) -> Result<Pixmap> {
        let mut out = Pixmap::new(w, h)?;
        let sx0 = x.max(0);
        let sy0 = y.max(0);
        let sx1 = (x + w as i64).min(self.width as i64);
        let sy1 = (y + h as i64).min(self.height as i64);
        if sx0 >= sx1 || sy0 >= sy1 {
            return Ok(out);
        }
        let run = (sx1 - sx0) as usize * 4;
        for sy in sy0..sy1 {
            let si = self.offset(sx0 as u32, sy as u32);
            let di = out.offset((sx0 - x) as u32, (sy - y) as u32);
            out.data[di..di + run].copy_from_slice(&self.data[si..si + run]);
        }
        Ok(out)
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
            writer.finish()?;
        }
        Ok(out)
    }

    /// Decode a PNG of any color type into RGBA8.
    pub fn decode_png(bytes: &[u8]) -> Result<Pixmap> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16 | png::Transformations::ALPHA,
        );
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let bytes = &buf[..info.buffer_size()];

        let rgba: Vec<u8> = match info.color_type {
            png::ColorType::Rgba => bytes.to_vec(),
            png::ColorType::Rgb => bytes.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
            png::ColorType::GrayscaleAlpha => {
                bytes.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect()
            }
            png::ColorType::Grayscale => bytes.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(Error::DecodeError("palette was not expanded".into()));
            }
        };
        Pixmap::from_rgba(info.width, info.height, rgba)
    }

    /// SHA-256 over the dimensions and pixel bytes, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(&self.data);
        hex::encode(hasher.finalize())
    }
}

/// Source-over composite of a straight-alpha pixel onto a straight-alpha pixel.
fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 || dst[3] == 0 {
        dst.copy_from_slice(&src);
        return;
    }
    let sa = sa as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / oa;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (oa * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_transparent() {
        let pm = Pixmap::new(4, 3).unwrap();
        assert_eq!(pm.data().len(), 48);
        assert!(pm.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_size_is_valid() {
        let pm = Pixmap::new(0, 10).unwrap();
        assert!(pm.is_empty());
        assert!(pm.data().is_empty());
    }

    #[test]
    fn over_budget_is_surface_error() {
        let err = Pixmap::with_limit(100, 100, 99).unwrap_err();
        assert!(matches!(err, Error::SurfaceError(_)));
    }

    #[test]
    fn fill_rect_rounds_and_clips() {
        let mut pm = Pixmap::new(4, 4).unwrap();
        pm.fill_rect(Rect::new(-1.0, 0.6, 2.4, 10.0), Rgba::WHITE);
        assert_eq!(pm.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(pm.pixel(0, 1), Some(Rgba::WHITE));
        assert_eq!(pm.pixel(1, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn blend_half_alpha_over_opaque() {
        let mut pm = Pixmap::new(1, 1).unwrap();
        pm.fill(Rgba::BLACK);
        pm.fill_rect(pm.bounds(), Rgba::new(255, 255, 255, 128));
        let p = pm.pixel(0, 0).unwrap();
        assert_eq!(p.a, 255);
        assert!((p.r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn draw_and_crop() {
        let mut src = Pixmap::new(2, 2).unwrap();
        src.fill(Rgba::opaque(10, 20, 30));
        let mut dst = Pixmap::new(5, 5).unwrap();
        dst.draw_pixmap(&src, 2.4, -0.6);
        assert_eq!(dst.pixel(2, 0), Some(Rgba::opaque(10, 20, 30)));
        assert_eq!(dst.pixel(2, 1), Some(Rgba::TRANSPARENT));

        let c = dst.crop(1, -1, 3, 2).unwrap();
        assert_eq!(c.pixel(1, 1), Some(Rgba::opaque(10, 20, 30)));
        assert_eq!(c.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn scaled_draw_covers_destination() {
        let mut src = Pixmap::new(2, 2).unwrap();
        src.fill(Rgba::opaque(200, 0, 0));
        let mut dst = Pixmap::new(8, 8).unwrap();
        dst.draw_pixmap_scaled(&src, Rect::new(2.0, 2.0, 4.0, 4.0));
        assert_eq!(dst.pixel(2, 2), Some(Rgba::opaque(200, 0, 0)));
        assert_eq!(dst.pixel(5, 5), Some(Rgba::opaque(200, 0, 0)));
        assert_eq!(dst.pixel(6, 6), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn png_roundtrip_preserves_pixels() {
        let pm = Pixmap::vertical_gradient(3, 5, Rgba::WHITE, Rgba::BLACK).unwrap();
        let bytes = pm.encode_png().unwrap();
        assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
        let back = Pixmap::decode_png(&bytes).unwrap();
        assert_eq!(back, pm);
        assert_eq!(back.digest(), pm.digest());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(Pixmap::decode_png(b"not a png"), Err(Error::DecodeError(_))));
    }
}
