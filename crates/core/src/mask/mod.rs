use std::{fmt, path::Path};

use crate::{error::ensure_positive, CaptchaError, Result};

mod builtin;
mod truetype;

pub use builtin::BuiltinFont;
pub use truetype::TruetypeFont;

/// Alpha values strictly above this level count as glyph coverage.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Capability to draw a text string into a single-channel alpha canvas.
pub trait TextRasterizer: Send + Sync {
    /// Returns `width * height` alpha values in row-major order. Glyph parts
    /// falling outside the canvas are clipped.
    fn rasterize(
        &self,
        text: &str,
        size: f32,
        offset: (i32, i32),
        width: usize,
        height: usize,
    ) -> Vec<u8>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Boolean occupancy grid marking which canvas pixels belong to the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl TextMask {
    /// Wraps a precomputed occupancy grid.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Result<Self> {
        ensure_positive("mask width", width)?;
        ensure_positive("mask height", height)?;
        if cells.len() != width * height {
            return Err(CaptchaError::invalid(format!(
                "expected {} mask cells for a {width}x{height} canvas, got {}",
                width * height,
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Thresholds an alpha canvas into foreground and background.
    pub fn from_alpha(width: usize, height: usize, alpha: &[u8]) -> Result<Self> {
        let cells = alpha.iter().map(|&a| a > ALPHA_THRESHOLD).collect();
        Self::from_cells(width, height, cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }
}

/// Builds [`TextMask`]s for a fixed canvas size.
pub struct GlyphMaskBuilder {
    rasterizer: Box<dyn TextRasterizer>,
    width: usize,
    height: usize,
}

impl GlyphMaskBuilder {
    pub fn new(rasterizer: Box<dyn TextRasterizer>, width: usize, height: usize) -> Result<Self> {
        ensure_positive("canvas width", width)?;
        ensure_positive("canvas height", height)?;
        Ok(Self {
            rasterizer,
            width,
            height,
        })
    }

    /// Builder backed by the built-in bitmap font.
    pub fn builtin(width: usize, height: usize) -> Result<Self> {
        Self::new(Box::new(BuiltinFont), width, height)
    }

    /// Loads a TrueType font, falling back to the built-in font when the file
    /// is missing or unreadable. Rendering quality degrades; the challenge
    /// still renders.
    pub fn from_font_path_or_builtin(
        path: Option<&Path>,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let rasterizer: Box<dyn TextRasterizer> = match path.map(TruetypeFont::load) {
            Some(Ok(font)) => Box::new(font),
            Some(Err(err)) => {
                tracing::warn!(%err, "falling back to built-in font");
                Box::new(BuiltinFont)
            }
            None => Box::new(BuiltinFont),
        };
        Self::new(rasterizer, width, height)
    }

    pub fn rasterizer_name(&self) -> &str {
        self.rasterizer.name()
    }

    /// Renders `text` at `font_size` with its top-left corner at `offset`.
    pub fn build(&self, text: &str, font_size: f32, offset: (i32, i32)) -> Result<TextMask> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(CaptchaError::invalid("font size must be > 0"));
        }
        let alpha = self
            .rasterizer
            .rasterize(text, font_size, offset, self.width, self.height);
        TextMask::from_alpha(self.width, self.height, &alpha)
    }
}

impl fmt::Debug for GlyphMaskBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphMaskBuilder")
            .field("rasterizer", &self.rasterizer.name())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Writes `value` into the canvas keeping the strongest coverage seen so far.
pub(crate) fn blend_max(canvas: &mut [u8], width: usize, height: usize, x: i64, y: i64, value: u8) {
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return;
    }
    let slot = &mut canvas[y as usize * width + x as usize];
    *slot = (*slot).max(value);
}
