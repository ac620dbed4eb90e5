//! Math utilities and types
//!
//! Provides the fundamental math types shared by the collision and spatial
//! modules. Everything is `f32`, matching the rest of the engine.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix4,
    UnitQuaternion,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colors)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// World transform: position, rotation, and (possibly non-uniform) scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
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

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// The three rotated unit axes (local X, Y, Z in world space)
    pub fn axes(&self) -> [Vec3; 3] {
        [
            safe_normalize(self.rotation * Vec3::x()),
            safe_normalize(self.rotation * Vec3::y()),
            safe_normalize(self.rotation * Vec3::z()),
        ]
    }

    /// Component-wise absolute scale (mirroring does not shrink shapes)
    pub fn abs_scale(&self) -> Vec3 {
        self.scale.abs()
    }

    /// Largest absolute scale component
    pub fn max_abs_scale(&self) -> f32 {
        let s = self.abs_scale();
        s.x.max(s.y).max(s.z)
    }
}

/// Normalize `v`, returning the zero vector for degenerate input
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len_sq = v.magnitude_squared();
    if len_sq > f32::EPSILON * f32::EPSILON {
        v / len_sq.sqrt()
    } else {
        Vec3::zeros()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with camera matrix builders
pub trait Mat4Ext {
    /// Create a perspective projection matrix mapping depth to [0, 1]
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // View space looks down +Z, clip w = view z.
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        // Left-handed: forward maps to +Z so it pairs with `perspective`.
        let forward = (target - eye).normalize();
        let right = up.cross(&forward).normalize();
        let camera_up = forward.cross(&right);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            forward.x, forward.y, forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_axes_follow_rotation() {
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), constants::PI * 0.5);
        let transform = Transform::from_position_rotation(Vec3::zeros(), rotation);
        let [x, y, z] = transform.axes();

        assert_relative_eq!(x, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(y, Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(z, Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_max_abs_scale_ignores_sign() {
        let transform = Transform::identity().with_scale(Vec3::new(1.0, -3.0, 2.0));
        assert_relative_eq!(transform.max_abs_scale(), 3.0);
    }

    #[test]
    fn test_safe_normalize_zero() {
        assert_eq!(safe_normalize(Vec3::zeros()), Vec3::zeros());
    }

    #[test]
    fn test_look_at_maps_target_to_positive_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::zeros(), Vec3::y());
        let p = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.z, 10.0, epsilon = EPSILON);
        assert_relative_eq!(p.x, 0.0, epsilon = EPSILON);
    }
}
