//! Planar reflection math.

use glam::{Mat4, Vec3, Vec4};

/// Reflects a point across the plane through `plane_point` with normal
/// `plane_normal`.
pub fn reflect_point(point: Vec3, plane_point: Vec3, plane_normal: Vec3) -> Vec3 {
    let n = plane_normal.normalize();
    point - 2.0 * (point - plane_point).dot(n) * n
}

/// Reflects a direction vector across a plane with normal `plane_normal`.
pub fn reflect_direction(direction: Vec3, plane_normal: Vec3) -> Vec3 {
    let n = plane_normal.normalize();
    direction - 2.0 * direction.dot(n) * n
}

/// Computes a reflection matrix for a plane.
///
/// The plane is defined by a point on the plane and its normal. The
/// resulting matrix reflects points across this plane; it is what the
/// reflection pass applies per instance in the vertex stage.
pub fn reflection_matrix(plane_point: Vec3, plane_normal: Vec3) -> Mat4 {
    let n = plane_normal.normalize();
    let d = -plane_point.dot(n);

    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.y, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.z, -2.0 * n.y * n.z, 1.0 - 2.0 * n.z * n.z, 0.0),
        Vec4::new(-2.0 * n.x * d, -2.0 * n.y * d, -2.0 * n.z * d, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_point_across_offset_plane() {
        // Plane z = -2 facing +Z: a point at z = 0 lands at z = -4.
        let reflected = reflect_point(Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert!((reflected - Vec3::new(1.0, 1.0, -4.0)).length() < 1e-6);
    }

    #[test]
    fn test_matrix_agrees_with_pointwise_reflection() {
        let plane_point = Vec3::new(0.5, -1.0, 2.0);
        let plane_normal = Vec3::new(1.0, 2.0, -0.5).normalize();
        let mat = reflection_matrix(plane_point, plane_normal);

        let point = Vec3::new(3.0, -2.0, 1.0);
        let via_matrix = mat.transform_point3(point);
        let via_formula = reflect_point(point, plane_point, plane_normal);
        assert!((via_matrix - via_formula).length() < 1e-5);
    }

    #[test]
    fn test_reflection_is_involution() {
        let mat = reflection_matrix(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        let double = mat * mat;

        // Reflecting twice should give identity
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((double.col(j)[i] - expected).abs() < 0.001);
            }
        }
    }

    #[test]
    fn test_reflect_direction_preserves_tangent() {
        // Directions in the plane are unchanged; the normal component flips.
        let n = Vec3::Y;
        assert!((reflect_direction(Vec3::X, n) - Vec3::X).length() < 1e-6);
        assert!((reflect_direction(Vec3::Y, n) + Vec3::Y).length() < 1e-6);
    }
}
