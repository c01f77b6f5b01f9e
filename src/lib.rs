//! fcdesign
//!
//! A raster layout and compositing engine for building fixed-size promotional
//! images out of text runs, filled boxes and photographs, plus the two scenes
//! built on it ("cover" and "post") and a duotone gradient-map filter.
//!
//! # Features
//!
//! - **Asset layout**: text, boxes and spacers composed with `row` / `col`,
//!   each asset carrying its own layout frame next to its bitmap
//! - **Real fonts** (`glyph`, default): TrueType/OpenType rasterization with
//!   `ab_glyph`; without it only the deterministic headless rasterizer exists
//! - **Last-write-wins rendering**: an async session that drops superseded
//!   requests before they reach the screen
//!
//! # Example
//!
//! ```no_run
//! use fcdesign::rendering::text::HeadlessRasterizer;
//! use fcdesign::scene::{self, CoverScene};
//! use fcdesign::RenderConfig;
//!
//! # fn main() -> fcdesign::Result<()> {
//! let config = RenderConfig { supersample: Some(2), ..Default::default() };
//! let shot = scene::render(&CoverScene::default(), &HeadlessRasterizer::new(), &config)?;
//! std::fs::write("cover.png", shot.to_png()?)?;
//! println!("{}x{} {}", shot.width, shot.height, shot.digest());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod rendering;

pub mod scene;

// Font readiness and image decoding
pub mod platform;

// Async, last-write-wins render session (worker-backed)
pub mod async_api;

pub use async_api::{RenderOutcome, RenderSession};
pub use rendering::Screenshot;

use rendering::pixmap::DEFAULT_MAX_PIXELS;

/// Configuration for a render pass
///
/// The defaults match the interactive tool:
/// - each scene uses its own supersampling factor
/// - the gradient map uses one worker per core
/// - the async session waits 100 ms before starting a pass
///
/// # Examples
///
/// ```
/// let cfg = fcdesign::RenderConfig::default();
/// assert_eq!(cfg.debounce_ms, 100);
/// assert!(cfg.supersample.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Overrides the scene's supersampling factor; `Some(0)` is rejected
    pub supersample: Option<u32>,
    /// Gradient-map worker threads (0 => one per core)
    pub threads: usize,
    /// Debounce before an async render pass, in milliseconds
    pub debounce_ms: u64,
    /// Largest surface, in pixels, a render pass may allocate
    pub max_surface_pixels: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            supersample: None,
            threads: 0,
            debounce_ms: 100,
            max_surface_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}
