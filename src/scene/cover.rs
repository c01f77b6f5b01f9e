//! Cover image: a two-line title and a column of contest schedule boxes
//! over a background picture.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::rendering::asset::{draw_asset, Asset};
use crate::rendering::color::Rgba;
use crate::rendering::factory::{AssetFactory, BoxStyle};
use crate::rendering::geometry::{Padding, Rect, Size};
use crate::rendering::pixmap::Pixmap;
use crate::rendering::text::{TextRasterizer, TextStyle};
use crate::scene::source::{parse_source, CoverSource, Item};
use crate::scene::{font, Scene};
use crate::{RenderConfig, Result};

pub const WIDTH: f32 = 820.0;
pub const HEIGHT: f32 = 360.0;
pub const SUPERSAMPLE: u32 = 8;

pub const DEFAULT_SOURCE: &str = "CÁC KỲ THI,08/2023\n\
05/08,IOI PRACTICE CONTEST,2023\n\
12/08,TESTING ROUND,53\n\
19/08,TESTING ROUND,54\n\
26/08,FREE CONTEST,149";

const INK: Rgba = Rgba::opaque(0x20, 0x1E, 0x1E);
const ACCENT: Rgba = Rgba::opaque(0x2F, 0x89, 0xFC);
const DATE_BOX: Rgba = Rgba::opaque(0x49, 0x46, 0x46);

/// Background color of an item's contest-name box, by keyword.
pub fn contest_color(main: &str) -> Rgba {
    if main.contains("TESTING") {
        Rgba::opaque(0xF1, 0x6F, 0x3E)
    } else if main.contains("BEGINNER") {
        Rgba::opaque(0x06, 0xBA, 0x63)
    } else if main.contains("CUP") || main.contains("PRACTICE") {
        Rgba::opaque(0xF5, 0xB8, 0x2E)
    } else if main.contains("FREE") {
        ACCENT
    } else {
        INK
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverInputs {
    /// Raw source text, see [`parse_source`]
    pub source: String,
}

impl Default for CoverInputs {
    fn default() -> Self {
        Self { source: DEFAULT_SOURCE.to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoverScene {
    pub inputs: CoverInputs,
    pub background: Option<Arc<Pixmap>>,
    pub logo: Option<Arc<Pixmap>>,
}

impl CoverScene {
    pub fn new(inputs: CoverInputs) -> Self {
        Self { inputs, background: None, logo: None }
    }

    pub fn with_background(mut self, background: Arc<Pixmap>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_logo(mut self, logo: Arc<Pixmap>) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn source(&self) -> CoverSource {
        parse_source(&self.inputs.source)
    }

    fn title_layer(&self, f: &mut AssetFactory<'_>, data: &CoverSource, s: f32) -> Result<Asset> {
        let top = f.text(&data.title.top, &TextStyle::new(font(700, 33.03 * s), INK))?;
        let main = f.text(&data.title.main, &TextStyle::new(font(700, 33.03 * s), ACCENT))?;
        let gap = f.vspace(7.0 * s);
        f.col(vec![top, gap, main], 0.0)
    }

    fn item(&self, f: &mut AssetFactory<'_>, item: &Item, s: f32) -> Result<Asset> {
        let label = |size: f32| TextStyle::new(font(700, size * s), Rgba::WHITE);
        let top_pad = Padding::new(2.0, 8.0, 0.0, 8.0).scale(s);
        let pad = Padding::new(4.0, 8.0, 0.0, 8.0).scale(s);

        let content = f.text(&item.top, &label(14.51))?;
        let top = f.boxed(content, BoxStyle::new(DATE_BOX).padding(top_pad).min_height(19.72 * s))?;

        let content = f.text(&item.main, &label(20.0))?;
        let style = BoxStyle::new(contest_color(&item.main)).padding(pad).min_height(28.61 * s);
        let main = f.boxed(content, style)?;

        let content = f.text(&item.right, &label(20.0))?;
        let right = f.boxed(content, BoxStyle::new(INK).padding(pad).min_height(28.61 * s))?;

        let line = f.row(vec![main, right], 0.0)?;
        f.col(vec![top, line], 0.0)
    }

    fn content_layer(&self, f: &mut AssetFactory<'_>, data: &CoverSource, s: f32) -> Result<Asset> {
        let mut items = Vec::with_capacity(data.items.len() * 2);
        for item in &data.items {
            if !items.is_empty() {
                items.push(f.vspace(13.5 * s));
            }
            items.push(self.item(f, item, s)?);
        }
        f.col(items, 0.0)
    }
}

impl Scene for CoverScene {
    fn name(&self) -> &'static str {
        "cover"
    }

    fn logical_size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }

    fn default_supersample(&self) -> u32 {
        SUPERSAMPLE
    }

    fn compose(
        &self,
        surface: &mut Pixmap,
        s: f32,
        rasterizer: &dyn TextRasterizer,
        config: &RenderConfig,
    ) -> Result<()> {
        let data = self.source();

        if let Some(bg) = &self.background {
            let full = surface.bounds();
            surface.draw_pixmap_scaled(bg, full);
        }
        if let Some(logo) = self.logo.as_deref().filter(|l| !l.is_empty()) {
            let h = 59.68 * s;
            let w = 59.68 * logo.width() as f32 / logo.height() as f32 * s;
            surface.draw_pixmap_scaled(logo, Rect::new(118.34 * s, 52.59 * s, w, h));
        }

        let mut f = AssetFactory::with_limit(surface.width(), surface.height(), config.max_surface_pixels, rasterizer)?;

        let title = self.title_layer(&mut f, &data, s)?;
        draw_asset(surface, &title, 120.0 * s, 144.0 * s);

        let content = self.content_layer(&mut f, &data, s)?;
        debug!("cover content {}x{} for {} items", content.width(), content.height(), data.items.len());
        let y = (HEIGHT / 2.0) * s - content.height() / 2.0 - 4.64 * s;
        draw_asset(surface, &content, 372.96 * s, y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_colors_in_priority_order() {
        assert_eq!(contest_color("TESTING ROUND"), Rgba::opaque(0xF1, 0x6F, 0x3E));
        assert_eq!(contest_color("BEGINNER FREE"), Rgba::opaque(0x06, 0xBA, 0x63));
        assert_eq!(contest_color("IOI PRACTICE CONTEST"), Rgba::opaque(0xF5, 0xB8, 0x2E));
        assert_eq!(contest_color("FREE CONTEST"), ACCENT);
        assert_eq!(contest_color("anything"), INK);
    }

    #[test]
    fn default_source_has_four_items() {
        let scene = CoverScene::default();
        let data = scene.source();
        assert_eq!(data.title.main, "08/2023");
        assert_eq!(data.items.len(), 4);
    }

    #[test]
    fn inputs_deserialize_with_defaults() {
        let inputs: CoverInputs = serde_json::from_str("{}").unwrap();
        assert_eq!(inputs, CoverInputs::default());
    }
}
