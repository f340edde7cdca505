//! Card label rasterization.
//!
//! Uses cosmic-text for text rendering with:
//! - Subpixel antialiasing
//! - Proper text shaping (HarfBuzz)
//! - Unicode support

use cosmic_text::{Attrs as TextAttrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};
use std::sync::Mutex;

use super::pixmap::Pixmap;

// Global font system (expensive to create, reuse across all labels)
lazy_static::lazy_static! {
    static ref FONT_SYSTEM: Mutex<FontSystem> = Mutex::new(FontSystem::new());
    static ref SWASH_CACHE: Mutex<SwashCache> = Mutex::new(SwashCache::new());
}

/// Label texture dimensions in pixels.
pub const LABEL_TEX_WIDTH: usize = 256;
pub const LABEL_TEX_HEIGHT: usize = 48;
const LABEL_FONT_SIZE: f32 = 22.0;
const LABEL_PADDING: f32 = 8.0;

const LABEL_BG: [u8; 4] = [253, 250, 243, 255];
const LABEL_INK: [u8; 4] = [70, 62, 58, 255];

/// Rasterize a card's one-line label strip.
///
/// Text is centered horizontally and clipped to the strip; overly long
/// titles simply run off the edge, matching how physical labels crop.
pub fn rasterize_label(text: &str) -> Pixmap {
    let mut pm = Pixmap::filled(LABEL_TEX_WIDTH, LABEL_TEX_HEIGHT, LABEL_BG);
    if text.is_empty() {
        return pm;
    }

    let mut font_system = FONT_SYSTEM.lock().unwrap();
    let mut swash_cache = SWASH_CACHE.lock().unwrap();

    let metrics = Metrics::new(LABEL_FONT_SIZE, LABEL_TEX_HEIGHT as f32);
    let mut buffer = Buffer::new(&mut font_system, metrics);
    buffer.set_size(
        &mut font_system,
        Some(LABEL_TEX_WIDTH as f32 - LABEL_PADDING * 2.0),
        Some(LABEL_TEX_HEIGHT as f32),
    );

    let text_attrs = TextAttrs::new().family(Family::SansSerif);
    buffer.set_text(&mut font_system, text, text_attrs, Shaping::Advanced);
    buffer.shape_until_scroll(&mut font_system, false);

    // Measure the laid-out line to center it.
    let mut text_width = 0.0f32;
    for run in buffer.layout_runs() {
        for glyph in run.glyphs.iter() {
            text_width = text_width.max(glyph.x + glyph.w);
        }
    }
    let align_offset =
        ((LABEL_TEX_WIDTH as f32 - text_width) * 0.5).max(LABEL_PADDING);

    let ink = Color::rgba(LABEL_INK[0], LABEL_INK[1], LABEL_INK[2], LABEL_INK[3]);
    buffer.draw(&mut font_system, &mut swash_cache, ink, |x, y, w, h, color| {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                pm.blend_px(
                    x + (align_offset as i32) + dx,
                    y + dy,
                    [color.r(), color.g(), color.b(), color.a()],
                );
            }
        }
    });

    pm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_dimensions() {
        let pm = rasterize_label("2025-06-01  Walkies");
        assert_eq!(pm.width(), LABEL_TEX_WIDTH);
        assert_eq!(pm.height(), LABEL_TEX_HEIGHT);
    }

    #[test]
    fn test_empty_label_is_background() {
        let pm = rasterize_label("");
        assert_eq!(pm.px(0, 0), LABEL_BG);
        assert_eq!(pm.px(LABEL_TEX_WIDTH / 2, LABEL_TEX_HEIGHT / 2), LABEL_BG);
    }

    #[test]
    fn test_label_corners_keep_background() {
        // Centered text never reaches the strip corners.
        let pm = rasterize_label("hi");
        assert_eq!(pm.px(0, 0), LABEL_BG);
        assert_eq!(pm.px(LABEL_TEX_WIDTH - 1, 0), LABEL_BG);
    }
}
