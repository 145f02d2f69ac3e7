use super::{blend_max, TextRasterizer};

const GLYPH_COLUMNS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Columns advanced per character, including one column of spacing.
const ADVANCE_COLUMNS: usize = GLYPH_COLUMNS + 1;

/// 5x7 glyphs for `A`-`Z` followed by `0`-`9`, one row per byte, MSB on the left.
const GLYPHS: [[u8; GLYPH_ROWS]; 36] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

fn glyph_for(ch: char) -> Option<&'static [u8; GLYPH_ROWS]> {
    let ch = ch.to_ascii_uppercase();
    match ch {
        'A'..='Z' => GLYPHS.get(ch as usize - 'A' as usize),
        '0'..='9' => GLYPHS.get(26 + ch as usize - '0' as usize),
        _ => None,
    }
}

/// Minimal blocky font that needs no external resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFont;

impl BuiltinFont {
    /// Pixel size of one glyph cell at the requested font size.
    pub fn cell_size(size: f32) -> usize {
        ((size / 10.0).round() as usize).max(1)
    }
}

impl TextRasterizer for BuiltinFont {
    fn rasterize(
        &self,
        text: &str,
        size: f32,
        offset: (i32, i32),
        width: usize,
        height: usize,
    ) -> Vec<u8> {
        let mut canvas = vec![0_u8; width * height];
        let cell = Self::cell_size(size) as i64;

        for (index, ch) in text.chars().enumerate() {
            let Some(rows) = glyph_for(ch) else {
                continue;
            };
            let origin_x = offset.0 as i64 + (index * ADVANCE_COLUMNS) as i64 * cell;
            let origin_y = offset.1 as i64;

            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_COLUMNS {
                    if bits & (1 << (GLYPH_COLUMNS - 1 - col)) == 0 {
                        continue;
                    }
                    for dy in 0..cell {
                        for dx in 0..cell {
                            blend_max(
                                &mut canvas,
                                width,
                                height,
                                origin_x + col as i64 * cell + dx,
                                origin_y + row as i64 * cell + dy,
                                u8::MAX,
                            );
                        }
                    }
                }
            }
        }

        canvas
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_scaled_glyph_cells() {
        let alpha = BuiltinFont.rasterize("I", 20.0, (0, 0), 12, 14);
        // Top bar of `I` spans columns 1..4 at cell size 2.
        assert_eq!(alpha[0], 0);
        assert_eq!(alpha[2], 255);
        assert_eq!(alpha[7], 255);
        assert_eq!(alpha[8], 0);
        // Stem sits in column 2 on the second glyph row.
        assert_eq!(alpha[2 * 12 + 4], 255);
        assert_eq!(alpha[2 * 12 + 2], 0);
    }

    #[test]
    fn folds_lowercase_and_skips_unknown_characters() {
        let upper = BuiltinFont.rasterize("AB", 10.0, (1, 1), 20, 10);
        let lower = BuiltinFont.rasterize("ab", 10.0, (1, 1), 20, 10);
        assert_eq!(upper, lower);

        let blank = BuiltinFont.rasterize(" -", 10.0, (0, 0), 20, 10);
        assert!(blank.iter().all(|&a| a == 0));
    }

    #[test]
    fn clips_glyphs_outside_the_canvas() {
        let alpha = BuiltinFont.rasterize("W", 10.0, (-3, -3), 4, 4);
        assert_eq!(alpha.len(), 16);
    }
}
