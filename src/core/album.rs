//! Flat album layout.
//!
//! The 2-D alternate renderer over the same display set as the sphere:
//! a centered grid of cards with a deterministic per-index presentation
//! variant and a small rotation jitter, fed through the same quad renderer
//! under an orthographic projection. Switching view modes never resamples.

use glam::{Mat4, Vec3};

/// Grid cell edge in world units; the scene builder draws cards slightly
/// smaller than the cell so the jitter rotation never overlaps neighbors.
pub const CELL_SIZE: f32 = 1.0;
/// Breathing room around the grid in the orthographic projection.
pub const VIEW_MARGIN: f32 = 0.6;

/// Fixed presentation styles, cycled by display-set index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlbumVariant {
    BorderedPhoto,
    ColoredNote,
    DashedCard,
}

impl AlbumVariant {
    pub fn from_index(index: usize) -> Self {
        match index % 3 {
            0 => AlbumVariant::BorderedPhoto,
            1 => AlbumVariant::ColoredNote,
            _ => AlbumVariant::DashedCard,
        }
    }
}

/// Deterministic rotation jitter in degrees for a display-set index.
pub fn jitter_deg(index: usize) -> f32 {
    (index % 5) as f32 - 2.0
}

/// One laid-out album cell.
#[derive(Clone, Copy, Debug)]
pub struct AlbumItem {
    pub index: usize,
    pub variant: AlbumVariant,
    pub rotation_deg: f32,
    /// Cell-center frame (translation + jitter rotation) for the card's
    /// quads; sizes are applied per quad by the scene builder.
    pub frame: Mat4,
}

/// Lay out `count` cards in a centered grid shaped for the viewport aspect.
pub fn layout(count: usize, aspect: f32) -> Vec<AlbumItem> {
    let (cols, rows) = grid_shape(count, aspect);
    (0..count)
        .map(|index| {
            let col = index % cols;
            let row = index / cols;
            // Last row may be partial; keep it centered too.
            let row_len = if row == rows - 1 && count % cols != 0 {
                count % cols
            } else {
                cols
            };
            let x = (col as f32 - (row_len as f32 - 1.0) * 0.5) * CELL_SIZE;
            let y = ((rows as f32 - 1.0) * 0.5 - row as f32) * CELL_SIZE;
            let rotation_deg = jitter_deg(index);
            let frame = Mat4::from_translation(Vec3::new(x, y, 0.0))
                * Mat4::from_rotation_z(rotation_deg.to_radians());
            AlbumItem {
                index,
                variant: AlbumVariant::from_index(index),
                rotation_deg,
                frame,
            }
        })
        .collect()
}

/// Orthographic projection that frames the whole grid for the aspect ratio.
pub fn ortho_projection(count: usize, aspect: f32) -> Mat4 {
    let (cols, rows) = grid_shape(count, aspect);
    let half_w = cols as f32 * CELL_SIZE * 0.5 + VIEW_MARGIN;
    let half_h = rows as f32 * CELL_SIZE * 0.5 + VIEW_MARGIN;
    // Grow whichever axis is too tight for the viewport shape.
    let (half_w, half_h) = if half_w / half_h < aspect {
        (half_h * aspect, half_h)
    } else {
        (half_w, half_w / aspect.max(1e-3))
    };
    Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, -10.0, 10.0)
}

fn grid_shape(count: usize, aspect: f32) -> (usize, usize) {
    if count == 0 {
        return (1, 1);
    }
    let cols = ((count as f32 * aspect.max(0.1)).sqrt().round() as usize)
        .clamp(1, count);
    let rows = count.div_ceil(cols);
    (cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_cycle() {
        let expected = [0usize, 1, 2, 0, 1, 2, 0, 1, 2, 0];
        for (i, want) in expected.iter().enumerate() {
            let got = match AlbumVariant::from_index(i) {
                AlbumVariant::BorderedPhoto => 0,
                AlbumVariant::ColoredNote => 1,
                AlbumVariant::DashedCard => 2,
            };
            assert_eq!(got, *want, "variant at index {i}");
        }
    }

    #[test]
    fn test_jitter_cycle() {
        let expected = [-2.0, -1.0, 0.0, 1.0, 2.0, -2.0, -1.0, 0.0, 1.0, 2.0];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(jitter_deg(i), *want, "jitter at index {i}");
        }
    }

    #[test]
    fn test_layout_preserves_count_and_order() {
        let items = layout(30, 16.0 / 9.0);
        assert_eq!(items.len(), 30);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.rotation_deg, jitter_deg(i));
        }
    }

    #[test]
    fn test_layout_cells_distinct() {
        let items = layout(30, 1.5);
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                let a = items[i].frame.w_axis;
                let b = items[j].frame.w_axis;
                assert!(
                    (a - b).length() > 1e-3,
                    "cells {i} and {j} overlap"
                );
            }
        }
    }

    #[test]
    fn test_grid_fits_projection() {
        let count = 30;
        let aspect = 16.0 / 9.0;
        let proj = ortho_projection(count, aspect);
        for item in layout(count, aspect) {
            let clip = proj * item.frame.w_axis;
            assert!(clip.x.abs() <= 1.0, "cell {} outside x clip", item.index);
            assert!(clip.y.abs() <= 1.0, "cell {} outside y clip", item.index);
        }
    }

    #[test]
    fn test_empty_layout() {
        assert!(layout(0, 1.0).is_empty());
        assert!(!ortho_projection(0, 1.0).is_nan());
    }
}
