//! Orbit camera matrices.
//!
//! The camera sits on the -Z axis at `distance` from the origin and the
//! world (the card sphere) is rotated under it by yaw/pitch. Projection is
//! a fixed-FOV perspective; the album view supplies its own orthographic
//! projection instead.

use glam::Mat4;

pub const FOV_DEG: f32 = 45.0;
pub const NEAR_CLIP: f32 = 0.1;
pub const FAR_CLIP: f32 = 200.0;

/// World -> camera space for the given orbit state.
pub fn view_matrix(yaw: f32, pitch: f32, distance: f32) -> Mat4 {
    Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -distance))
        * Mat4::from_rotation_x(pitch)
        * Mat4::from_rotation_y(yaw)
}

/// Camera -> clip space.
pub fn projection_matrix(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_DEG.to_radians(), aspect.max(1e-3), NEAR_CLIP, FAR_CLIP)
}

/// Combined world -> clip matrix.
pub fn view_projection(yaw: f32, pitch: f32, distance: f32, aspect: f32) -> Mat4 {
    projection_matrix(aspect) * view_matrix(yaw, pitch, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_matrices_are_finite() {
        let vp = view_projection(0.7, -0.3, 12.0, 16.0 / 9.0);
        assert!(!vp.is_nan());
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let vp = view_projection(1.2, 0.4, 10.0, 1.5);
        let clip = vp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        assert!(ndc_x.abs() < 1e-5);
        assert!(ndc_y.abs() < 1e-5);
    }

    #[test]
    fn test_distance_moves_camera_back() {
        let view = view_matrix(0.0, 0.0, 8.0);
        let eye_space = view.transform_point3(Vec3::ZERO);
        assert!((eye_space.z - -8.0).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_rotates_world() {
        let view = view_matrix(std::f32::consts::FRAC_PI_2, 0.0, 5.0);
        // A point on +X swings onto the view axis under a quarter-turn yaw.
        let p = view.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-5);
    }
}
