//! Planar shadow projection
//!
//! Flattens geometry onto a plane along the direction of a light. With `L` the
//! homogeneous light vector and `P = (a, b, c, d)` the plane,
//! `M = (P·L) I - L Pᵀ`. `M` has rank 3 and maps every point onto the plane,
//! so applying it twice is the same as applying it once.

use crate::foundation::math::{Mat4, Vec4};

/// Build the planar shadow matrix for `light` (w = 0 for directional) and `plane`
pub fn shadow_matrix(light: Vec4, plane: Vec4) -> Mat4 {
    let dot = plane.dot(&light);
    Mat4::from_fn(|row, col| {
        let diagonal = if row == col { dot } else { 0.0 };
        diagonal - light[row] * plane[col]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn sun_on_floor() -> Mat4 {
        shadow_matrix(Vec4::new(1.0, 1.0, 1.0, 0.0), Vec4::new(0.0, 1.0, 0.0, 0.0))
    }

    #[test]
    fn test_matrix_entries() {
        let m = sun_on_floor();
        // dot = 1; column 1 carries -L, diagonal is 1 except at (1, 1)
        assert_relative_eq!(m[(0, 0)], 1.0);
        assert_relative_eq!(m[(1, 1)], 0.0);
        assert_relative_eq!(m[(0, 1)], -1.0);
        assert_relative_eq!(m[(2, 1)], -1.0);
        assert_relative_eq!(m[(3, 3)], 1.0);
        assert_relative_eq!(m[(1, 0)], 0.0);
    }

    #[test]
    fn test_points_land_on_plane_along_light() {
        let m = sun_on_floor();
        let projected = m.transform_point(&Vec3::new(2.0, 3.0, -1.0).into());
        assert_relative_eq!(projected.coords, Vec3::new(-1.0, 0.0, -4.0), epsilon = 1e-6);
    }

    #[test]
    fn test_singular_and_idempotent() {
        let lights = [
            Vec4::new(1.0, 1.0, 1.0, 0.0),
            Vec4::new(-0.3, 2.0, 0.5, 0.0),
            Vec4::new(4.0, 10.0, -2.0, 1.0),
        ];
        let planes = [
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, -0.5),
            Vec4::new(0.2, 0.9, 0.1, 0.3),
        ];
        for light in lights {
            for plane in planes {
                let m = shadow_matrix(light, plane);
                let dot = plane.dot(&light);
                assert_abs_diff_eq!(m.determinant() / dot.powi(4), 0.0, epsilon = 1e-4);

                let p = Vec4::new(0.7, 2.5, -1.2, 1.0);
                let once = m * p;
                let twice = m * once;
                // Same homogeneous point: compare after dividing by w
                assert_relative_eq!(once.xyz() / once.w, twice.xyz() / twice.w, epsilon = 1e-4);
                // The projected point satisfies the plane equation
                assert_abs_diff_eq!(plane.dot(&once) / once.w, 0.0, epsilon = 1e-4);
            }
        }
    }
}
