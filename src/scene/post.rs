//! Post image: a duotone-filtered photo with the contest date, name and
//! number stacked in the bottom-left corner.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::rendering::asset::{draw_asset, Asset};
use crate::rendering::color::Rgba;
use crate::rendering::factory::AssetFactory;
use crate::rendering::filter::gradient_map_in_place;
use crate::rendering::geometry::{grow, Padding, Point, Rect, Size};
use crate::rendering::pixmap::Pixmap;
use crate::rendering::text::{TextRasterizer, TextStyle};
use crate::scene::{font, Scene};
use crate::{RenderConfig, Result};

pub const WIDTH: f32 = 1080.0;
pub const HEIGHT: f32 = 1080.0;
pub const SUPERSAMPLE: u32 = 4;

/// Side of the synthesized white-to-black backdrop
const FALLBACK_SIDE: u32 = 1080;

/// Duotone color pair for the background filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    Blue,
    #[default]
    Green,
    Orange,
    Yellow,
    /// Any unrecognized name; renders grayscale
    Neutral,
}

impl Theme {
    /// `(color_a, color_b)`: the colors black and white map to
    pub fn colors(self) -> (Rgba, Rgba) {
        match self {
            Theme::Blue => (Rgba::opaque(123, 1, 190), Rgba::opaque(27, 136, 251)),
            Theme::Green => (Rgba::opaque(20, 11, 158), Rgba::opaque(6, 185, 99)),
            Theme::Orange => (Rgba::opaque(236, 37, 78), Rgba::opaque(240, 111, 62)),
            Theme::Yellow => (Rgba::opaque(240, 111, 62), Rgba::opaque(244, 183, 46)),
            Theme::Neutral => (Rgba::opaque(0, 0, 0), Rgba::opaque(128, 128, 128)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Orange => "orange",
            Theme::Yellow => "yellow",
            Theme::Neutral => "default",
        }
    }
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        match s {
            "blue" => Theme::Blue,
            "green" => Theme::Green,
            "orange" => Theme::Orange,
            "yellow" => Theme::Yellow,
            _ => Theme::Neutral,
        }
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        Theme::from(s.as_str())
    }
}

impl From<Theme> for String {
    fn from(t: Theme) -> Self {
        t.name().to_string()
    }
}

impl FromStr for Theme {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Theme::from(s))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInputs {
    /// Natural log of the extra zoom applied on top of aspect-fill
    pub zoom: f64,
    /// Horizontal pan, `0.0` = left edge, `1.0` = right edge
    pub pos_x: f64,
    pub pos_y: f64,
    /// Natural log of the gamma exponent handed to the filter
    pub gamma_correction: f64,
    pub contest_line1: String,
    /// Optional second name line; empty hides it
    pub contest_line2: String,
    pub contest_line3: String,
    pub date: String,
    pub time: String,
    pub theme: Theme,
}

impl Default for PostInputs {
    fn default() -> Self {
        Self {
            zoom: 0.0,
            pos_x: 0.5,
            pos_y: 0.5,
            gamma_correction: 0.0,
            contest_line1: "BEGINNER".into(),
            contest_line2: "FREE CONTEST".into(),
            contest_line3: "52".into(),
            date: "03/06/2023".into(),
            time: "19:30 - 22:30".into(),
            theme: Theme::Green,
        }
    }
}

/// Where an `image` lands on a `surface` so that it covers it entirely
/// (aspect-fill), scaled by `exp(zoom)` and panned so the image point at
/// `(pos_x, pos_y)` sits on the same relative point of the surface.
pub fn cover_placement(surface: Size, image: Size, zoom: f64, pos_x: f64, pos_y: f64) -> Rect {
    if !(image.w > 0.0 && image.h > 0.0) {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }
    let (w0, h0) = (surface.w as f64, surface.h as f64);
    let ar = image.w as f64 / image.h as f64;
    let area = (w0 * (w0 / ar)).max(h0 * (h0 * ar));
    let zm = zoom.exp();
    let w1 = (area * ar).sqrt() * zm;
    let h1 = (area / ar).sqrt() * zm;

    let pivot = Rect::at(Point::new((pos_x * w0) as f32, (pos_y * h0) as f32));
    let p = Padding::new(
        (pos_y * h1) as f32,
        ((1.0 - pos_x) * w1) as f32,
        ((1.0 - pos_y) * h1) as f32,
        (pos_x * w1) as f32,
    );
    grow(pivot, p)
}

#[derive(Debug, Clone, Default)]
pub struct PostScene {
    pub inputs: PostInputs,
    /// User photo; takes precedence over `fallback`
    pub photo: Option<Arc<Pixmap>>,
    /// White-to-black backdrop used when there is no photo
    pub fallback: Option<Arc<Pixmap>>,
    /// Site badge, bottom-right
    pub badge: Option<Arc<Pixmap>>,
    pub logo: Option<Arc<Pixmap>>,
}

impl PostScene {
    pub fn new(inputs: PostInputs) -> Self {
        Self { inputs, ..Default::default() }
    }

    pub fn with_photo(mut self, photo: Arc<Pixmap>) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<Pixmap>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_badge(mut self, badge: Arc<Pixmap>) -> Self {
        self.badge = Some(badge);
        self
    }

    pub fn with_logo(mut self, logo: Arc<Pixmap>) -> Self {
        self.logo = Some(logo);
        self
    }

    fn background_source(&self) -> Result<Cow<'_, Pixmap>> {
        if let Some(photo) = self.photo.as_deref() {
            return Ok(Cow::Borrowed(photo));
        }
        if let Some(fallback) = self.fallback.as_deref() {
            return Ok(Cow::Borrowed(fallback));
        }
        warn!("post: no backdrop image, synthesizing a white-to-black gradient");
        Pixmap::vertical_gradient(FALLBACK_SIDE, FALLBACK_SIDE, Rgba::WHITE, Rgba::BLACK).map(Cow::Owned)
    }

    /// The backdrop run through the theme's gradient map.
    ///
    /// A borrowed photo is copied within `config.max_surface_pixels` first.
    pub fn filtered_background(&self, config: &RenderConfig) -> Result<Pixmap> {
        let mut out = match self.background_source()? {
            Cow::Borrowed(image) => image.try_clone(config.max_surface_pixels)?,
            Cow::Owned(image) => image,
        };
        let (a, b) = self.inputs.theme.colors();
        let gamma = self.inputs.gamma_correction.exp();
        debug!("post: gradient map {}x{} theme={} gamma={:.3}", out.width(), out.height(), self.inputs.theme, gamma);
        gradient_map_in_place(&mut out, a, b, gamma, config.threads);
        Ok(out)
    }

    fn text_layer(&self, f: &mut AssetFactory<'_>, s: f32) -> Result<Asset> {
        let i = &self.inputs;
        let white = |weight: u16, size: f32| TextStyle::new(font(weight, size * s), Rgba::WHITE);

        let date = f.text(&i.date, &white(700, 54.42))?;
        let sep = f.text(" | ", &white(700, 54.42))?;
        let time = f.text(&i.time, &white(600, 54.42))?;
        let line1 = f.text(&i.contest_line1, &white(700, 95.17))?;
        let name = if i.contest_line2.is_empty() {
            line1
        } else {
            let line2 = f.text(&i.contest_line2, &white(700, 95.17))?;
            let gap = f.vspace(16.0 * s);
            f.col(vec![line1, gap, line2], 0.0)?
        };
        let line3 = f.text(&i.contest_line3, &white(700, 291.13))?;

        let when = vec![date, f.hspace(20.0 * s), sep, f.hspace(20.0 * s), time];
        let when = f.row(when, 0.0)?;
        let indent = f.hspace(3.0 * s);
        let name = f.row(vec![indent, name], 0.0)?;
        let layer = vec![when, f.vspace(28.0 * s), name, f.vspace(24.0 * s), line3];
        f.col(layer, 0.0)
    }
}

impl Scene for PostScene {
    fn name(&self) -> &'static str {
        "post"
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
        let i = &self.inputs;
        surface.fill(Rgba::BLACK);

        let backdrop = self.filtered_background(config)?;
        let full = surface.bounds().size();
        let image = Size::new(backdrop.width() as f32, backdrop.height() as f32);
        let placement = cover_placement(full, image, i.zoom, i.pos_x, i.pos_y);
        surface.draw_pixmap_scaled(&backdrop, placement);

        let mut f = AssetFactory::with_limit(surface.width(), surface.height(), config.max_surface_pixels, rasterizer)?;
        let text = self.text_layer(&mut f, s)?;
        debug!("post text layer {}x{}", text.width(), text.height());
        draw_asset(surface, &text, 76.0 * s, HEIGHT * s - text.height());

        if let Some(badge) = &self.badge {
            let x = 1010.0 * s - badge.width() as f32;
            let y = 1010.0 * s - badge.height() as f32;
            surface.draw_pixmap(badge, x, y);
        }
        if let Some(logo) = &self.logo {
            surface.draw_pixmap(logo, 66.97 * s, 55.87 * s);
        }
        Ok(())
    }
}
