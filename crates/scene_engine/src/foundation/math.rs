//! Math utilities and types
//!
//! Provides the vector/matrix aliases used across the engine and the local
//! transform of a scene node: position, Euler rotation in degrees and a
//! non-uniform scale.
//!
//! ## Conventions
//!
//! - Right-handed, Y-up.
//! - Euler angles are intrinsic X, then Y, then Z, stored in degrees.
//! - A local transform maps a point as `T * Rz * Ry * Rx * S`.

pub use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (homogeneous coordinates, plane equations)
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Scale components with a magnitude below this are treated as 1 when inverting.
pub const SCALE_EPSILON: f32 = 1e-4;

/// Orbit axes shorter than this are rejected.
pub const AXIS_EPSILON: f32 = 1e-4;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3, SCALE_EPSILON};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// `1 / s`, or `1` when `s` is degenerate.
    pub fn safe_reciprocal(s: f32) -> f32 {
        if s.abs() > SCALE_EPSILON {
            1.0 / s
        } else {
            1.0
        }
    }

    /// Componentwise division that leaves degenerate components untouched.
    pub fn safe_div(v: Vec3, scale: Vec3) -> Vec3 {
        Vec3::new(
            v.x * safe_reciprocal(scale.x),
            v.y * safe_reciprocal(scale.y),
            v.z * safe_reciprocal(scale.z),
        )
    }
}

fn axis_rotation(axis: Unit<Vec3>, degrees: f32) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&axis, utils::deg_to_rad(degrees))
}

/// Rotate `v` by Euler angles (degrees): X first, then Y, then Z.
pub fn rotate_euler(v: Vec3, degrees: Vec3) -> Vec3 {
    let rx = axis_rotation(Vec3::x_axis(), degrees.x);
    let ry = axis_rotation(Vec3::y_axis(), degrees.y);
    let rz = axis_rotation(Vec3::z_axis(), degrees.z);
    rz * (ry * (rx * v))
}

/// Exact inverse of [`rotate_euler`]: Z, then Y, then X with negated angles.
pub fn inverse_rotate_euler(v: Vec3, degrees: Vec3) -> Vec3 {
    let rx = axis_rotation(Vec3::x_axis(), -degrees.x);
    let ry = axis_rotation(Vec3::y_axis(), -degrees.y);
    let rz = axis_rotation(Vec3::z_axis(), -degrees.z);
    rx * (ry * (rz * v))
}

/// Rotate `v` about a unit `axis` by `degrees` using Rodrigues' formula.
pub fn rodrigues(v: Vec3, axis: Vec3, degrees: f32) -> Vec3 {
    let rad = utils::deg_to_rad(degrees);
    let (s, c) = rad.sin_cos();
    axis * axis.dot(&v) * (1.0 - c) + v * c + axis.cross(&v) * s
}

/// Local transform of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in the parent frame
    pub position: Vec3,

    /// Euler rotation in degrees (X, Y, Z)
    pub rotation: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the Euler rotation (degrees)
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Map a point from this frame into the parent frame: scale, rotate, translate.
    pub fn apply_to_point(&self, point: Vec3) -> Vec3 {
        let scaled = point.component_mul(&self.scale);
        rotate_euler(scaled, self.rotation) + self.position
    }

    /// Map a parent-frame point into this frame.
    ///
    /// Degenerate scale components (below [`SCALE_EPSILON`]) are left undivided.
    pub fn apply_inverse_to_point(&self, point: Vec3) -> Vec3 {
        let unrotated = inverse_rotate_euler(point - self.position, self.rotation);
        utils::safe_div(unrotated, self.scale)
    }

    /// Matrix form of [`Transform::apply_to_point`]
    pub fn to_matrix(&self) -> Mat4 {
        let rx = axis_rotation(Vec3::x_axis(), self.rotation.x).to_homogeneous();
        let ry = axis_rotation(Vec3::y_axis(), self.rotation.y).to_homogeneous();
        let rz = axis_rotation(Vec3::z_axis(), self.rotation.z).to_homogeneous();
        Mat4::new_translation(&self.position) * rz * ry * rx * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Rotate the position about `pivot` and `axis` (both in the parent frame)
    /// and add `angle * axis` to the Euler rotation so facing follows the orbit.
    ///
    /// Returns `false` and leaves the transform untouched for a near-zero axis.
    pub fn orbit(&mut self, pivot: Vec3, axis: Vec3, angle_degrees: f32) -> bool {
        let length = axis.norm();
        if length < AXIS_EPSILON {
            return false;
        }
        let axis = axis / length;

        let offset = self.position - pivot;
        self.position = pivot + rodrigues(offset, axis, angle_degrees);
        self.rotation += axis * angle_degrees;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotate_euler_quarter_turn_about_y() {
        let v = rotate_euler(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0));
        assert_relative_eq!(v, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        // X 90 takes +Y to +Z, then Y 90 takes +Z to +X.
        let v = rotate_euler(Vec3::new(0.0, 1.0, 0.0), Vec3::new(90.0, 90.0, 0.0));
        assert_relative_eq!(v, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_rotation_undoes_rotation() {
        let angles = Vec3::new(30.0, -45.0, 120.0);
        let v = Vec3::new(0.3, -2.0, 5.0);
        let back = inverse_rotate_euler(rotate_euler(v, angles), angles);
        assert_relative_eq!(back, v, epsilon = 1e-4);
    }

    #[test]
    fn test_matrix_matches_point_mapping() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(10.0, 20.0, 30.0))
            .with_scale(Vec3::new(2.0, 0.5, 1.5));
        let p = Vec3::new(-0.4, 0.7, 2.2);

        let via_matrix = transform.to_matrix().transform_point(&p.into()).coords;
        assert_relative_eq!(via_matrix, transform.apply_to_point(p), epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_scale_is_treated_as_one() {
        let transform = Transform::identity().with_scale(Vec3::new(0.0, 2.0, 1.0));
        let local = transform.apply_inverse_to_point(Vec3::new(3.0, 4.0, 5.0));
        assert_relative_eq!(local, Vec3::new(3.0, 2.0, 5.0));
    }

    #[test]
    fn test_orbit_preserves_distance_to_pivot() {
        let pivot = Vec3::new(-0.55, 0.0, 0.0);
        let axes = [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-0.2, 0.3, 4.0),
        ];
        for axis in axes {
            for angle in [-170.0, -90.0, -1.0, 0.5, 45.0, 300.0] {
                let mut transform = Transform::from_position(Vec3::new(-1.3, 0.4, 0.2));
                let before = (transform.position - pivot).norm();
                assert!(transform.orbit(pivot, axis, angle));
                let after = (transform.position - pivot).norm();
                assert_relative_eq!(before, after, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_orbit_tracks_facing() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        transform.orbit(Vec3::zeros(), Vec3::new(0.0, 2.0, 0.0), 90.0);
        assert_relative_eq!(transform.position, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(transform.rotation, Vec3::new(0.0, 90.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_with_zero_axis_is_noop() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(!transform.orbit(Vec3::zeros(), Vec3::new(0.0, 0.00001, 0.0), 90.0));
        assert_eq!(transform, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
    }
}
