//! Procedural filler artwork.
//!
//! Synthesizes the paw-print placeholder image used to pad the display set
//! when real diary content runs short. Pure function of the filler index and
//! the palette: the same index always produces the same pixels, so repeated
//! resamples re-draw identical artwork for a given slot.

use crate::render::pixmap::Pixmap;

/// Square canvas edge for synthesized artwork, in pixels.
pub const CANVAS_SIZE: usize = 256;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Draw a stylized paw print for `index` in `palette[index % len]`.
///
/// No I/O and no shared state; safe to call concurrently.
pub fn synthesize(index: usize, palette: &[[u8; 3]]) -> Pixmap {
    let mut pm = Pixmap::filled(CANVAS_SIZE, CANVAS_SIZE, BACKGROUND);
    let [r, g, b] = palette[index % palette.len()];
    let ink = [r, g, b, 255];

    let c = CANVAS_SIZE as f32;

    // Heel pad: wide ellipse in the lower half.
    fill_ellipse(&mut pm, c * 0.5, c * 0.62, c * 0.21, c * 0.17, ink);

    // Four toe pads arcing over the heel. Outer toes sit lower and smaller.
    let toes: [(f32, f32, f32); 4] = [
        (0.27, 0.40, 0.075),
        (0.42, 0.30, 0.085),
        (0.58, 0.30, 0.085),
        (0.73, 0.40, 0.075),
    ];
    for (tx, ty, tr) in toes {
        fill_ellipse(&mut pm, c * tx, c * ty, c * tr, c * (tr * 1.15), ink);
    }

    pm
}

/// Fill an axis-aligned ellipse with a one-pixel soft edge.
fn fill_ellipse(pm: &mut Pixmap, cx: f32, cy: f32, rx: f32, ry: f32, rgba: [u8; 4]) {
    let x0 = (cx - rx - 1.0).floor() as i32;
    let x1 = (cx + rx + 1.0).ceil() as i32;
    let y0 = (cy - ry - 1.0).floor() as i32;
    let y1 = (cy + ry + 1.0).ceil() as i32;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            let d = (dx * dx + dy * dy).sqrt();
            if d >= 1.0 {
                continue;
            }
            // Coverage ramps down over the outermost edge band.
            let edge = 1.0 / rx.min(ry);
            let coverage = ((1.0 - d) / edge).clamp(0.0, 1.0);
            let a = (rgba[3] as f32 * coverage).round() as u8;
            pm.blend_px(x, y, [rgba[0], rgba[1], rgba[2], a]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::PALETTE;

    #[test]
    fn test_canvas_dimensions() {
        let pm = synthesize(0, &PALETTE);
        assert_eq!(pm.width(), CANVAS_SIZE);
        assert_eq!(pm.height(), CANVAS_SIZE);
    }

    #[test]
    fn test_deterministic_per_index() {
        assert_eq!(synthesize(5, &PALETTE), synthesize(5, &PALETTE));
    }

    #[test]
    fn test_palette_indices_differ() {
        // Index 0 and 1 pick different palette colors, so the artwork differs.
        assert_ne!(synthesize(0, &PALETTE), synthesize(1, &PALETTE));
    }

    #[test]
    fn test_palette_wraps() {
        // Same palette slot -> identical artwork.
        assert_eq!(synthesize(0, &PALETTE), synthesize(PALETTE.len(), &PALETTE));
    }

    #[test]
    fn test_background_is_white() {
        let pm = synthesize(2, &PALETTE);
        assert_eq!(pm.px(0, 0), BACKGROUND);
        assert_eq!(pm.px(CANVAS_SIZE - 1, CANVAS_SIZE - 1), BACKGROUND);
    }

    #[test]
    fn test_heel_pad_is_inked() {
        let pm = synthesize(0, &PALETTE);
        let [r, g, b] = PALETTE[0];
        // Center of the heel pad, well inside the ellipse.
        let px = pm.px(CANVAS_SIZE / 2, (CANVAS_SIZE as f32 * 0.62) as usize);
        assert_eq!(px, [r, g, b, 255]);
    }
}
