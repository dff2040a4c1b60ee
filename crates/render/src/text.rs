//! Bitmap label text
//!
//! Labels use the 8x8 glyphs from `font8x8`, scaled by whole pixels, so text
//! output does not depend on system fonts. Characters outside the bundled
//! tables are drawn as `?`.
//!
//! Only Basic Latin, Latin-1, Greek and Hiragana are covered. Kanji and
//! Katakana item names (e.g. `土間コンクリート`) render as `?` runs; use
//! Latin item names when labels must be legible on the overlay.

use font8x8::{UnicodeFonts, BASIC_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS};
use takeoff_core::Color;

use crate::canvas::Canvas;

/// Glyph cell size in font units
pub const GLYPH_SIZE: i32 = 8;

/// Outline radius around label text, in device pixels
pub const OUTLINE_WIDTH: i32 = 2;

fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| HIRAGANA_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
}

/// Whole-pixel glyph scale for a nominal font size
pub fn glyph_scale(font_size: u32) -> i32 {
    ((font_size as f64 / GLYPH_SIZE as f64).round() as i32).max(1)
}

/// Width and height of `text` at `scale`
pub fn text_size(text: &str, scale: i32) -> (i32, i32) {
    let scale = scale.max(1);
    (text.chars().count() as i32 * GLYPH_SIZE * scale, GLYPH_SIZE * scale)
}

/// Draw a single line of text with its top-left corner at `(x, y)`
pub fn draw_text(canvas: &mut Canvas, x: i32, y: i32, text: &str, color: Color, scale: i32) {
    let scale = scale.max(1);
    let mut cursor_x = x;

    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row_idx, &bits) in rows.iter().enumerate() {
                for col_idx in 0..GLYPH_SIZE {
                    if (bits >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx * scale;
                    let py = y + row_idx as i32 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            canvas.put_pixel(px + sx, py + sy, color);
                        }
                    }
                }
            }
        }
        cursor_x += GLYPH_SIZE * scale;
    }
}

/// Draw text over a square outline halo so it reads on any background
pub fn draw_outlined_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    color: Color,
    outline: Color,
    scale: i32,
) {
    for dx in -OUTLINE_WIDTH..=OUTLINE_WIDTH {
        for dy in -OUTLINE_WIDTH..=OUTLINE_WIDTH {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw_text(canvas, x + dx, y + dy, text, outline, scale);
        }
    }
    draw_text(canvas, x, y, text, color, scale);
}
