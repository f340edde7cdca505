//! Card picking via raycast.
//!
//! Converts a pointer position (already in NDC) into a world-space ray
//! through the inverse view-projection, intersects it with every card's
//! image plane in object space, and returns the nearest hit. Works for both
//! the perspective sphere and the album's orthographic projection.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// One pickable quad: the card's display-set index and the model matrix of
/// its image plane (unit quad, ±0.5).
#[derive(Clone, Copy, Debug)]
pub struct PickTarget {
    pub index: usize,
    pub model: Mat4,
}

/// Pick the card under an NDC point, nearest hit first.
///
/// Returns the display-set index of the hit card, or None when the ray
/// misses everything.
pub fn pick(ndc: Vec2, view_projection: Mat4, targets: &[PickTarget]) -> Option<usize> {
    let inv_vp = view_projection.inverse();
    let (origin, dir) = unproject_ray(ndc, inv_vp)?;

    let mut best: Option<(f32, usize)> = None;
    for target in targets {
        let Some(t) = intersect_unit_quad(origin, dir, target.model) else {
            continue;
        };
        if best.is_none_or(|(best_t, _)| t < best_t) {
            best = Some((t, target.index));
        }
    }
    best.map(|(_, index)| index)
}

/// Unproject the NDC point at the near and far planes to get a world ray.
fn unproject_ray(ndc: Vec2, inv_vp: Mat4) -> Option<(Vec3, Vec3)> {
    let near_clip = Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
    let far_clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

    let near_world4 = inv_vp * near_clip;
    let far_world4 = inv_vp * far_clip;
    if near_world4.w.abs() < 1e-6 || far_world4.w.abs() < 1e-6 {
        return None;
    }
    let near_world = near_world4.truncate() / near_world4.w;
    let far_world = far_world4.truncate() / far_world4.w;

    Some((near_world, far_world - near_world))
}

/// Intersect a ray with a unit quad's z=0 plane in object space.
///
/// Returns the ray parameter `t` in [0, 1] (near plane to far plane) for
/// hits inside the quad bounds, front of camera only.
fn intersect_unit_quad(origin: Vec3, dir: Vec3, model: Mat4) -> Option<f32> {
    let inv_model = model.inverse();
    let o = inv_model.transform_point3(origin);
    let d = inv_model.transform_vector3(dir);

    if d.z.abs() < 1e-6 {
        return None; // Ray parallel to the card plane
    }
    let t = -o.z / d.z;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let hit = o + d * t;
    if hit.x.abs() <= 0.5 && hit.y.abs() <= 0.5 {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera;

    fn vp() -> Mat4 {
        camera::view_projection(0.0, 0.0, 10.0, 1.0)
    }

    fn quad_at(index: usize, z: f32, size: f32) -> PickTarget {
        PickTarget {
            index,
            model: Mat4::from_translation(Vec3::new(0.0, 0.0, z))
                * Mat4::from_scale(Vec3::new(size, size, 1.0)),
        }
    }

    #[test]
    fn test_center_click_hits_centered_quad() {
        let targets = [quad_at(3, 0.0, 2.0)];
        assert_eq!(pick(Vec2::ZERO, vp(), &targets), Some(3));
    }

    #[test]
    fn test_miss_returns_none() {
        let targets = [quad_at(0, 0.0, 0.5)];
        // Far corner of the screen, well outside a half-unit quad at origin.
        assert_eq!(pick(Vec2::new(0.95, 0.95), vp(), &targets), None);
    }

    #[test]
    fn test_empty_targets() {
        assert_eq!(pick(Vec2::ZERO, vp(), &[]), None);
    }

    #[test]
    fn test_nearest_of_two_stacked_quads_wins() {
        // Camera looks down -Z from z = +10; larger z is closer to it.
        let targets = [quad_at(0, -2.0, 2.0), quad_at(1, 2.0, 2.0)];
        assert_eq!(pick(Vec2::ZERO, vp(), &targets), Some(1));
    }

    #[test]
    fn test_orthographic_projection() {
        let ortho = Mat4::orthographic_rh_gl(-5.0, 5.0, -5.0, 5.0, 0.1, 50.0)
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
        let targets = [
            PickTarget {
                index: 7,
                model: Mat4::from_translation(Vec3::new(2.0, 1.0, 0.0))
                    * Mat4::from_scale(Vec3::new(1.0, 1.0, 1.0)),
            },
        ];
        // NDC for world (2, 1): x = 2/5, y = 1/5.
        assert_eq!(pick(Vec2::new(0.4, 0.2), ortho, &targets), Some(7));
        assert_eq!(pick(Vec2::new(-0.4, 0.2), ortho, &targets), None);
    }

    #[test]
    fn test_tilted_quad() {
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, 0.0))
            * Mat4::from_rotation_y(0.6)
            * Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0));
        let targets = [PickTarget { index: 0, model }];
        assert_eq!(pick(Vec2::ZERO, vp(), &targets), Some(0));
    }
}
