//! Duotone gradient map
//!
//! Each pixel's perceptual luma, raised to a gamma exponent, picks a point
//! on the gradient from `color_a` (black) to `color_b` (white). The output
//! alpha is the gradient's alpha attenuated by the source pixel's alpha.
//! Pixels are independent, so the image is split into row bands processed
//! on scoped worker threads.

use crate::rendering::color::Rgba;
use crate::rendering::pixmap::Pixmap;

/// Below this many pixels the map runs on the calling thread.
const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Perceptual luma of 8-bit channels, normalized to `0.0..=1.0`
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

/// Gradient position for a luma value. Always within `0.0..=1.0`, even for
/// negative or non-finite exponents.
pub fn gradient_position(t0: f64, gamma: f64) -> f64 {
    let t = t0.powf(gamma);
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn lerp(a: u8, b: u8, t: f64) -> f64 {
    a as f64 + t * (b as f64 - a as f64)
}

fn to_byte(v: f64) -> u8 {
    (v + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Map one RGBA pixel.
pub fn map_pixel(px: [u8; 4], color_a: Rgba, color_b: Rgba, gamma: f64) -> [u8; 4] {
    let t = gradient_position(luma(px[0], px[1], px[2]), gamma);
    [
        to_byte(lerp(color_a.r, color_b.r, t)),
        to_byte(lerp(color_a.g, color_b.g, t)),
        to_byte(lerp(color_a.b, color_b.b, t)),
        to_byte(lerp(color_a.a, color_b.a, t) * (px[3] as f64 / 255.0)),
    ]
}

fn map_band(band: &mut [u8], color_a: Rgba, color_b: Rgba, gamma: f64) {
    for px in band.chunks_exact_mut(4) {
        let out = map_pixel([px[0], px[1], px[2], px[3]], color_a, color_b, gamma);
        px.copy_from_slice(&out);
    }
}

/// Apply the gradient map using every available core.
pub fn apply_gradient_map(source: &Pixmap, color_a: Rgba, color_b: Rgba, gamma: f64) -> Pixmap {
    apply_gradient_map_with(source, color_a, color_b, gamma, 0)
}

/// Apply the gradient map on `threads` workers (`0` = one per core).
/// The result has the dimensions of `source`.
pub fn apply_gradient_map_with(
    source: &Pixmap,
    color_a: Rgba,
    color_b: Rgba,
    gamma: f64,
    threads: usize,
) -> Pixmap {
    let mut out = source.clone();
    gradient_map_in_place(&mut out, color_a, color_b, gamma, threads);
    out
}

/// Gradient-map `target` itself, without allocating a copy.
pub fn gradient_map_in_place(target: &mut Pixmap, color_a: Rgba, color_b: Rgba, gamma: f64, threads: usize) {
    let threads = if threads == 0 { num_cpus::get() } else { threads };
    let pixels = target.width() as usize * target.height() as usize;
    let row_bytes = target.width() as usize * 4;

    if threads <= 1 || pixels < PARALLEL_THRESHOLD || row_bytes == 0 {
        map_band(target.data_mut(), color_a, color_b, gamma);
        return;
    }

    let rows_per_band = (target.height() as usize).div_ceil(threads).max(1);
    std::thread::scope(|scope| {
        for band in target.data_mut().chunks_mut(rows_per_band * row_bytes) {
            scope.spawn(move || map_band(band, color_a, color_b, gamma));
        }
    });
}
