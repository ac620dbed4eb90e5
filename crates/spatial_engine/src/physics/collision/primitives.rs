//! Primitive collision shapes and intersection algorithms
//!
//! Provides the basic geometric primitives (rays, axis-aligned boxes, spheres)
//! with the intersection tests the broad phase and picking code rely on.

use crate::foundation::math::{safe_normalize, Vec3};

/// Direction components below this are treated as parallel to a slab
pub const DEFAULT_PARALLEL_EPSILON: f32 = 1e-6;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized, or zero if degenerate)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: safe_normalize(direction),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray query against the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<H> {
    /// The object that was hit
    pub handle: H,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
}

/// Axis-aligned bounding box
///
/// The default box is the degenerate point at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from two corners, reordering components so `min <= max`
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_extents(center: Vec3, half_extent: Vec3) -> Self {
        let half_extent = half_extent.abs();
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Get the center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half size)
    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Union of two boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Check if `other` lies entirely inside this box (boundary inclusive)
    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    /// Check if this AABB intersects another (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Check if this AABB intersects a sphere
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let closest = sphere.center.sup(&self.min).inf(&self.max);
        let radius = sphere.radius.max(0.0);
        (sphere.center - closest).magnitude_squared() <= radius * radius
    }

    /// The eight corners, bit `i` of the index selecting max on axis `i`
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Ray slab test with the default parallel epsilon
    ///
    /// Returns `(t_min, t_max)` of the clipped interval, with `t_min >= 0`.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        self.slab_test(ray, DEFAULT_PARALLEL_EPSILON)
    }

    /// Ray slab test
    ///
    /// An axis whose direction component is below `parallel_epsilon` only
    /// rejects the ray when the origin lies outside that slab. Intersections
    /// behind the origin are ignored.
    pub fn slab_test(&self, ray: &Ray, parallel_epsilon: f32) -> Option<(f32, f32)> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            let origin = ray.origin[i];
            let dir = ray.direction[i];

            if dir.abs() < parallel_epsilon {
                if origin < self.min[i] || origin > self.max[i] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t1 = (self.min[i] - origin) * inv;
            let mut t2 = (self.max[i] - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, t_max))
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere; a negative radius collapses to a point
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Tight axis-aligned bounds
    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    /// Test ray intersection with this sphere
    ///
    /// Returns the distance to the first surface crossing in front of the
    /// origin, or zero when the origin is already inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;
        let c = oc.dot(&oc) - self.radius * self.radius;
        if c <= 0.0 {
            return Some(0.0);
        }

        // Direction is unit length, so a == 1 and b is halved
        let b = oc.dot(&ray.direction);
        if b > 0.0 {
            return None;
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        Some((-b - discriminant.sqrt()).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_slab_exact_interval() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_relative_eq!(t_min, 4.0);
        assert_relative_eq!(t_max, 6.0);
    }

    #[test]
    fn test_ray_slab_parallel_outside_misses() {
        let ray = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_slab_behind_origin_misses() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_slab_origin_inside_clamps_to_zero() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_relative_eq!(t_min, 0.0);
        assert_relative_eq!(t_max, 1.0);
    }

    #[test]
    fn test_aabb_union_and_contains() {
        let a = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(2.0, -1.0, 0.0), Vec3::new(3.0, 0.0, 0.5));
        let u = a.union(&b);
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_aabb_new_reorders_corners() {
        let a = Aabb::new(Vec3::new(1.0, -1.0, 3.0), Vec3::new(-1.0, 1.0, 2.0));
        assert_eq!(a.min, Vec3::new(-1.0, -1.0, 2.0));
        assert_eq!(a.max, Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn test_aabb_intersects_touching() {
        let a = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_aabb_sphere() {
        let sphere = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(unit_box().intersects_sphere(&sphere));
        let far = BoundingSphere::new(Vec3::new(2.0, 2.0, 0.0), 1.0);
        assert!(!unit_box().intersects_sphere(&far));
    }

    #[test]
    fn test_sphere_ray() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(sphere.intersect_ray(&ray).unwrap(), 8.0);

        let away = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect_ray(&away).is_none());
    }
}
