use std::{fs, path::Path};

use fontdue::{
    layout::{
        CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, VerticalAlign,
        WrapStyle,
    },
    Font, FontSettings,
};

use super::{blend_max, TextRasterizer};
use crate::{CaptchaError, Result};

/// Scalable font parsed by `fontdue`.
pub struct TruetypeFont {
    font: Font,
}

impl TruetypeFont {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| {
            CaptchaError::unavailable(format!("failed to read font {}: {err}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| CaptchaError::unavailable(format!("failed to parse font: {err}")))?;
        Ok(Self { font })
    }
}

impl TextRasterizer for TruetypeFont {
    fn rasterize(
        &self,
        text: &str,
        size: f32,
        offset: (i32, i32),
        width: usize,
        height: usize,
    ) -> Vec<u8> {
        let mut canvas = vec![0_u8; width * height];

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: offset.0 as f32,
            y: offset.1 as f32,
            max_width: None,
            max_height: None,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: 1.0,
            wrap_style: WrapStyle::Letter,
            wrap_hard_breaks: true,
        });
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, bitmap) = self.font.rasterize_config(glyph.key);
            let origin_x = glyph.x.round() as i64;
            let origin_y = glyph.y.round() as i64;

            for (row, line) in bitmap.chunks_exact(glyph.width).enumerate() {
                for (col, &alpha) in line.iter().enumerate() {
                    blend_max(
                        &mut canvas,
                        width,
                        height,
                        origin_x + col as i64,
                        origin_y + row as i64,
                        alpha,
                    );
                }
            }
        }

        canvas
    }

    fn name(&self) -> &str {
        "truetype"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEJAVU_SANS: &[u8] = include_bytes!("../../resources/DejaVuSans.ttf");

    #[test]
    fn rasterizes_text_inside_canvas() {
        let font = TruetypeFont::from_bytes(DEJAVU_SANS.to_vec()).unwrap();
        let (width, height) = (120, 48);
        let canvas = font.rasterize("AB", 32.0, (4, 6), width, height);

        assert_eq!(canvas.len(), width * height);
        assert!(canvas.iter().any(|&alpha| alpha > 128));
        // Glyphs start at the offset.
        for y in 0..height {
            for x in 0..4 {
                assert_eq!(canvas[y * width + x], 0);
            }
        }
        for x in 0..width {
            for y in 0..6 {
                assert_eq!(canvas[y * width + x], 0);
            }
        }
    }

    #[test]
    fn clips_glyphs_past_the_canvas_edge() {
        let font = TruetypeFont::from_bytes(DEJAVU_SANS.to_vec()).unwrap();
        let canvas = font.rasterize("WWWWWWWW", 40.0, (0, 0), 30, 20);
        assert_eq!(canvas.len(), 30 * 20);
        assert!(canvas.iter().any(|&alpha| alpha > 0));
        assert_eq!(font.name(), "truetype");
    }

    #[test]
    fn empty_text_leaves_canvas_blank() {
        let font = TruetypeFont::from_bytes(DEJAVU_SANS.to_vec()).unwrap();
        assert!(font.rasterize("", 32.0, (0, 0), 16, 16).iter().all(|&a| a == 0));
    }

    #[test]
    fn missing_file_is_resource_unavailable() {
        let err = TruetypeFont::load(Path::new("no/such/font.ttf"))
            .err()
            .expect("loading a missing font must fail");
        assert!(matches!(err, CaptchaError::ResourceUnavailable(_)));
    }

    #[test]
    fn garbage_bytes_are_resource_unavailable() {
        let err = TruetypeFont::from_bytes(vec![1, 2, 3, 4])
            .err()
            .expect("parsing garbage must fail");
        assert!(matches!(err, CaptchaError::ResourceUnavailable(_)));
    }
}
