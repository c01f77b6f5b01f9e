//! Scenes: the two fixed-size compositions built on the layout engine.
//!
//! A scene holds the current field values and externally decoded bitmaps.
//! Each [`render`] call builds a fresh asset tree and discards it; nothing
//! is retained between passes.

pub mod cover;
pub mod post;
pub mod source;

pub use cover::{CoverInputs, CoverScene};
pub use post::{PostInputs, PostScene, Theme};
pub use source::{parse_source, CoverSource, Item, Title};

use log::{debug, error};

use crate::rendering::geometry::Size;
use crate::rendering::pixmap::Pixmap;
use crate::rendering::text::{FontSpec, TextRasterizer};
use crate::rendering::Screenshot;
use crate::{Error, RenderConfig, Result};

/// Font family list shared by both scenes
pub const FONT_FAMILY: &str = "\"CA Saygon Text\", sans-serif";

pub(crate) fn font(weight: u16, size: f32) -> FontSpec {
    FontSpec::new(FONT_FAMILY, weight, size)
}

pub trait Scene: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Output size in logical units
    fn logical_size(&self) -> Size;

    /// Supersampling factor used unless the config overrides it
    fn default_supersample(&self) -> u32;

    /// Draw the whole composition onto `surface`, whose size is
    /// `logical_size() × s`.
    fn compose(
        &self,
        surface: &mut Pixmap,
        s: f32,
        rasterizer: &dyn TextRasterizer,
        config: &RenderConfig,
    ) -> Result<()>;
}

/// Effective supersampling factor for a scene
pub fn supersample(scene: &dyn Scene, config: &RenderConfig) -> Result<u32> {
    match config.supersample.unwrap_or_else(|| scene.default_supersample()) {
        0 => Err(Error::ConfigError("supersampling factor must be at least 1".into())),
        s => Ok(s),
    }
}

/// Render a scene into a new output buffer.
pub fn render(scene: &dyn Scene, rasterizer: &dyn TextRasterizer, config: &RenderConfig) -> Result<Screenshot> {
    let s = supersample(scene, config)?;
    let logical = scene.logical_size();
    let width = (logical.w * s as f32).round() as u32;
    let height = (logical.h * s as f32).round() as u32;
    debug!("rendering {} at {}x{} (S={})", scene.name(), width, height, s);

    let frame = Pixmap::with_limit(width, height, config.max_surface_pixels).and_then(|mut surface| {
        scene.compose(&mut surface, s as f32, rasterizer, config)?;
        Ok(surface)
    });
    match frame {
        Ok(surface) => Ok(Screenshot::new(surface)),
        Err(e @ Error::SurfaceError(_)) => {
            error!("{}: skipping frame: {}", scene.name(), e);
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::text::HeadlessRasterizer;
    use std::sync::Arc;

    #[test]
    fn surface_failure_while_composing_is_reported() {
        let photo = Pixmap::new(1100, 1100).unwrap();
        let scene = PostScene::default().with_photo(Arc::new(photo));
        // Room for the output surface but not for a copy of the photo.
        let config = RenderConfig { supersample: Some(1), max_surface_pixels: 1080 * 1080, ..Default::default() };
        let err = render(&scene, &HeadlessRasterizer::new(), &config).unwrap_err();
        assert!(matches!(err, Error::SurfaceError(_)), "{err}");
    }

    #[test]
    fn zero_supersample_is_a_config_error() {
        let config = RenderConfig { supersample: Some(0), ..Default::default() };
        assert!(matches!(supersample(&CoverScene::default(), &config), Err(Error::ConfigError(_))));
    }
}
