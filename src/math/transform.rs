//! Transform builder.
//!
//! Produces model, normal, view and projection matrices on top of glam.
//! Model matrices are composed as `T(p) · R · S · T(-p)` so rotation and
//! scale pivot on the entity's own centre while the figure stays at `p`.

use glam::{Mat4, Vec3};

use super::utils::EPSILON;

/// Canonical "up" of every generated mesh: the pole at phi = 0.
pub const REFERENCE_UP: Vec3 = Vec3::Y;

/// Rotation taking `up` onto `target`.
///
/// axis = up × target, angle = atan2(|axis|, up · target). When the axis
/// vanishes the vectors are parallel (identity) or opposite (half turn
/// about any axis perpendicular to `up`). Non-finite or zero targets
/// yield the identity.
pub fn alignment_rotation(up: Vec3, target: Vec3) -> Mat4 {
    if !target.is_finite() || target.length_squared() < EPSILON * EPSILON {
        return Mat4::IDENTITY;
    }

    let axis = up.cross(target);
    let axis_len = axis.length();
    let cos_part = up.dot(target);

    if axis_len < EPSILON {
        if cos_part >= 0.0 {
            return Mat4::IDENTITY;
        }
        return Mat4::from_axis_angle(up.any_orthonormal_vector(), std::f32::consts::PI);
    }

    let angle = axis_len.atan2(cos_part);
    Mat4::from_axis_angle(axis / axis_len, angle)
}

/// Model matrix for an entity centred at `position`.
///
/// Order: translate to `position`, align `REFERENCE_UP` with `normal`
/// (when given), scale, translate back by `-position`.
pub fn model_matrix(position: Vec3, normal: Option<Vec3>, scale: Vec3) -> Mat4 {
    let mut model = Mat4::from_translation(position);
    if let Some(normal) = normal {
        model *= alignment_rotation(REFERENCE_UP, normal);
    }
    model *= Mat4::from_scale(scale);
    model * Mat4::from_translation(-position)
}

/// Inverse-transpose of a model-view matrix, for transforming normals.
///
/// Singular inputs (zero scale) fall back to the identity.
pub fn normal_matrix(model_view: &Mat4) -> Mat4 {
    if model_view.determinant().abs() < EPSILON {
        return Mat4::IDENTITY;
    }
    model_view.inverse().transpose()
}

/// View matrix of a camera orbiting the origin.
///
/// The camera sits `distance` along +Z after being rotated by `-angle_y`
/// about Y and `-angle_x` about X.
pub fn orbit_view(angle_x: f32, angle_y: f32, distance: f32) -> Mat4 {
    let camera = Mat4::from_rotation_y(-angle_y)
        * Mat4::from_rotation_x(-angle_x)
        * Mat4::from_translation(Vec3::new(0.0, 0.0, distance));
    camera.inverse()
}

/// Right-handed OpenGL perspective projection.
pub fn perspective(fov_y: f32, width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };
    Mat4::perspective_rh_gl(fov_y, aspect, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    fn all_finite(m: &Mat4) -> bool {
        m.to_cols_array().iter().all(|v| v.is_finite())
    }

    #[test]
    fn test_parallel_normal_is_identity() {
        let r = alignment_rotation(REFERENCE_UP, Vec3::Y);
        assert!(all_finite(&r));
        assert_eq!(r, Mat4::IDENTITY);

        let r = alignment_rotation(REFERENCE_UP, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(r, Mat4::IDENTITY);
    }

    #[test]
    fn test_opposite_normal_flips_without_nan() {
        let r = alignment_rotation(REFERENCE_UP, -Vec3::Y);
        assert!(all_finite(&r));
        assert!(approx(r.transform_vector3(Vec3::Y), -Vec3::Y));
    }

    #[test]
    fn test_zero_or_nan_target_is_identity() {
        assert_eq!(alignment_rotation(REFERENCE_UP, Vec3::ZERO), Mat4::IDENTITY);
        assert_eq!(alignment_rotation(REFERENCE_UP, Vec3::new(f32::NAN, 0.0, 1.0)), Mat4::IDENTITY);
    }

    #[test]
    fn test_alignment_maps_up_onto_target() {
        for target in [
            Vec3::X,
            Vec3::Z,
            Vec3::new(1.0, 1.0, 0.0).normalize(),
            Vec3::new(-0.3, -0.8, 0.52).normalize(),
        ] {
            let r = alignment_rotation(REFERENCE_UP, target);
            assert!(approx(r.transform_vector3(REFERENCE_UP), target), "target {target:?}");
        }
    }

    #[test]
    fn test_model_matrix_pivots_on_position() {
        let p = Vec3::new(1.0, -2.0, 0.5);
        let m = model_matrix(p, Some(Vec3::X), Vec3::splat(2.0));
        assert!(approx(m.transform_point3(p), p));

        // The pole above the pivot ends up along the target normal.
        let pole = p + REFERENCE_UP;
        assert!(approx(m.transform_point3(pole), p + Vec3::X * 2.0));
    }

    #[test]
    fn test_model_matrix_without_normal_only_scales() {
        let m = model_matrix(Vec3::ZERO, None, Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(m.transform_point3(Vec3::ONE), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_normal_matrix_handles_singular() {
        assert_eq!(normal_matrix(&Mat4::from_scale(Vec3::ZERO)), Mat4::IDENTITY);
        let n = normal_matrix(&Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)));
        assert!(approx(n.transform_vector3(Vec3::X), Vec3::X * 0.5));
    }

    #[test]
    fn test_orbit_view_places_origin_in_front() {
        let view = orbit_view(0.3, -1.1, 5.0);
        let origin = view.transform_point3(Vec3::ZERO);
        assert!(approx(origin, Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_perspective_zero_height() {
        let p = perspective(1.0, 640, 0, 1.0, 50.0);
        assert!(all_finite(&p));
    }
}
