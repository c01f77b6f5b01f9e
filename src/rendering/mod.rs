//! Raster layout and compositing engine
//!
//! Leaves first: [`geometry`] (rect arithmetic), [`pixmap`] (pixel buffer),
//! [`text`] / [`fonts`] (text metrics adapter), [`asset`] and [`factory`]
//! (asset model and layout), [`filter`] (gradient map).

pub mod asset;
pub mod color;
pub mod factory;
pub mod filter;
#[cfg(feature = "glyph")]
pub mod fonts;
pub mod geometry;
pub mod pixmap;
pub mod text;

use base64::Engine as _;

use crate::Result;
use pixmap::Pixmap;

/// Final output of a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub pixmap: Pixmap,
}

impl Screenshot {
    pub fn new(pixmap: Pixmap) -> Self {
        Self { width: pixmap.width(), height: pixmap.height(), pixmap }
    }

    /// Raw RGBA8 pixels, row-major
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.pixmap.encode_png()
    }

    /// `data:image/png;base64,...` URL for embedding in a page
    pub fn to_data_url(&self) -> Result<String> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(png)))
    }

    /// Content digest of the pixels, see [`Pixmap::digest`]
    pub fn digest(&self) -> String {
        self.pixmap.digest()
    }
}
