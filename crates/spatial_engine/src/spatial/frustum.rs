//! View frustum and planes
//!
//! Planes use `normal . p + distance >= 0` for the inside half space.

use crate::foundation::math::{Mat4, Vec3, Vector4};
use crate::physics::collision::{Aabb, BoundingSphere};

/// Plane in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Plane normal (pointing into the kept half space)
    pub normal: Vec3,
    /// Distance term
    pub distance: f32,
}

impl Plane {
    /// Create a new plane
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` facing `normal`
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -normal.dot(&point),
        }
    }

    /// Plane from clip-space row coefficients `(a, b, c, d)`, normalized
    fn from_coefficients(c: Vector4<f32>) -> Self {
        let normal = Vec3::new(c.x, c.y, c.z);
        let len = normal.magnitude();
        if len > 0.0 {
            Self::new(normal / len, c.w / len)
        } else {
            // Degenerate row: keep everything
            Self::new(Vec3::y(), f32::INFINITY)
        }
    }

    /// Get signed distance from point to plane
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }

    fn flipped(self) -> Self {
        Self::new(-self.normal, -self.distance)
    }
}

/// How a volume relates to the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Completely outside at least one plane
    Outside,
    /// Crosses at least one plane
    Intersecting,
    /// Inside all six planes
    Inside,
}

/// View frustum for culling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Build a frustum from camera parameters
    ///
    /// `forward`, `right` and `up` are the camera basis in world space and
    /// `fov_y` is the vertical field of view in radians. Side planes pass
    /// through `origin`. Every plane is oriented to keep the frustum's
    /// midpoint, so the basis may be left- or right-handed.
    pub fn from_perspective(
        origin: Vec3,
        forward: Vec3,
        right: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let half_v = far * (fov_y * 0.5).tan();
        let half_h = half_v * aspect;
        let to_far = forward * far;

        let inside = origin + forward * ((near + far) * 0.5);
        let facing_inside = |plane: Plane| {
            if plane.distance_to_point(inside) < 0.0 {
                plane.flipped()
            } else {
                plane
            }
        };

        let left = Plane::from_point_normal(origin, up.cross(&(to_far - right * half_h)));
        let right_plane = Plane::from_point_normal(origin, (to_far + right * half_h).cross(&up));
        let bottom = Plane::from_point_normal(origin, (to_far - up * half_v).cross(&right));
        let top = Plane::from_point_normal(origin, right.cross(&(to_far + up * half_v)));
        let near_plane = Plane::from_point_normal(origin + forward * near, forward);
        let far_plane = Plane::from_point_normal(origin + to_far, -forward);

        Self::new([left, right_plane, bottom, top, near_plane, far_plane].map(facing_inside))
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Expects column vectors (`clip = m * p`) and clip depth in `[0, w]`,
    /// the convention of [`crate::foundation::math::Mat4Ext::perspective`].
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let row = |i: usize| -> Vector4<f32> { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self::new([
            Plane::from_coefficients(r3 + r0),
            Plane::from_coefficients(r3 - r0),
            Plane::from_coefficients(r3 + r1),
            Plane::from_coefficients(r3 - r1),
            Plane::from_coefficients(r2),
            Plane::from_coefficients(r3 - r2),
        ])
    }

    /// Classify an AABB against the six planes
    pub fn classify_aabb(&self, aabb: &Aabb) -> Containment {
        let center = aabb.center();
        let extent = aabb.half_extent();
        let mut inside = true;

        for plane in &self.planes {
            let dist = plane.distance_to_point(center);
            let radius = plane.normal.abs().dot(&extent);

            if dist + radius < 0.0 {
                return Containment::Outside;
            }
            if dist - radius < 0.0 {
                inside = false;
            }
        }

        if inside {
            Containment::Inside
        } else {
            Containment::Intersecting
        }
    }

    /// Test if AABB is at least partly inside the frustum
    pub fn is_aabb_visible(&self, aabb: &Aabb) -> bool {
        self.classify_aabb(aabb) != Containment::Outside
    }

    /// Test if AABB crosses the frustum boundary (neither fully in nor out)
    pub fn intersects_aabb_boundary(&self, aabb: &Aabb) -> bool {
        self.classify_aabb(aabb) == Containment::Intersecting
    }

    /// Test if a sphere is at least partly inside the frustum
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(sphere.center) >= -sphere.radius)
    }
}
