//! Fibonacci-sphere card layout.
//!
//! Maps N cards onto quasi-uniform positions on a sphere using the
//! golden-angle increment, and builds the model matrices for each card's
//! three visual quads (color panel, image plane, label plane). Layout
//! depends only on the card count, so resampling with an unchanged count
//! keeps the sphere visually stable and only swaps textures.

use glam::{Mat4, Vec3, Vec4};

/// Image plane edge length in world units (square photos).
pub const CARD_SIZE: f32 = 1.35;
/// How much the color panel overhangs the image on each side.
pub const PANEL_MARGIN: f32 = 0.14;
/// Panel inward nudge along the normal so it reads as a border behind the image.
pub const PANEL_INSET: f32 = 0.02;
/// Label plane dimensions and offset below the image plane.
pub const LABEL_WIDTH: f32 = CARD_SIZE + PANEL_MARGIN;
pub const LABEL_HEIGHT: f32 = 0.30;
pub const LABEL_GAP: f32 = 0.08;

/// One card's place on the sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Unit vector from the sphere center through the card.
    pub outward_normal: Vec3,
}

/// Model matrices for a card's three quads, all over a unit quad (±0.5).
#[derive(Clone, Copy, Debug)]
pub struct CardTransforms {
    pub panel: Mat4,
    pub image: Mat4,
    pub label: Mat4,
}

/// Distribute `count` points on a sphere of the given radius.
///
/// `count == 0` yields an empty layout; `count == 1` puts the single card
/// on the equator (`phi == pi/2`, the half-offset form's lone sample).
pub fn place(count: usize, radius: f32) -> Vec<Placement> {
    let n = count as f32;
    let golden = std::f32::consts::PI * (1.0 + 5.0_f32.sqrt());
    (0..count)
        .map(|i| {
            let phi = (1.0 - 2.0 * (i as f32 + 0.5) / n).acos();
            let theta = golden * i as f32;
            let dir = Vec3::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            );
            Placement {
                position: dir * radius,
                outward_normal: dir.normalize(),
            }
        })
        .collect()
}

/// Orientation frame for a placement: the quad's local +Z looks outward,
/// as if aimed at a point twice as far out along the same ray.
///
/// Up defaults to world Y; at the poles (normal parallel to Y) it falls
/// back to world Z to avoid the degenerate cross product.
pub fn orientation(p: &Placement) -> Mat4 {
    let forward = p.outward_normal;
    let up_hint = if forward.x.abs() < 1e-5 && forward.z.abs() < 1e-5 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = up_hint.cross(forward).normalize();
    let up = forward.cross(right);
    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        p.position.extend(1.0),
    )
}

/// Build the three quad transforms for one card.
pub fn card_transforms(p: &Placement) -> CardTransforms {
    let frame = orientation(p);
    let panel_size = CARD_SIZE + PANEL_MARGIN;
    let panel = frame
        * Mat4::from_translation(Vec3::new(0.0, 0.0, -PANEL_INSET))
        * Mat4::from_scale(Vec3::new(panel_size, panel_size, 1.0));
    let image = frame * Mat4::from_scale(Vec3::new(CARD_SIZE, CARD_SIZE, 1.0));
    let label_y = -(panel_size * 0.5 + LABEL_GAP + LABEL_HEIGHT * 0.5);
    let label = frame
        * Mat4::from_translation(Vec3::new(0.0, label_y, 0.0))
        * Mat4::from_scale(Vec3::new(LABEL_WIDTH, LABEL_HEIGHT, 1.0));
    CardTransforms { panel, image, label }
}

/// World position of a model matrix (its translation column).
pub fn model_origin(model: &Mat4) -> Vec3 {
    let col: Vec4 = model.w_axis;
    Vec3::new(col.x, col.y, col.z)
}
