//! Oriented bounding boxes
//!
//! An [`Obb`] is always derived from a transform and a local extent, used for
//! one query and then dropped.

use crate::foundation::math::{Transform, Vec3};
use super::primitives::{Aabb, BoundingSphere, Ray, DEFAULT_PARALLEL_EPSILON};

/// Candidate separating axes with squared length below this are skipped
pub const DEFAULT_AXIS_EPSILON: f32 = 1e-6;

/// Oriented bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Box center in world space
    pub center: Vec3,
    /// Orthonormal local axes in world space
    pub axes: [Vec3; 3],
    /// Non-negative half size along each local axis
    pub half_extent: Vec3,
}

impl Obb {
    /// Create an OBB, clamping negative half-extents to zero
    pub fn new(center: Vec3, axes: [Vec3; 3], half_extent: Vec3) -> Self {
        Self {
            center,
            axes,
            half_extent: half_extent.sup(&Vec3::zeros()),
        }
    }

    /// Axis-aligned OBB covering `aabb`
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), [Vec3::x(), Vec3::y(), Vec3::z()], aabb.half_extent())
    }

    /// Build the world OBB of a box with local half-extent `extent`
    ///
    /// Rotation gives the axes; the absolute scale multiplies the extent so
    /// mirrored transforms keep their size.
    pub fn from_transform(extent: Vec3, transform: &Transform) -> Self {
        Self::new(
            transform.position,
            transform.axes(),
            extent.abs().component_mul(&transform.abs_scale()),
        )
    }

    /// Projection radius of the box onto a unit axis
    fn project_radius(&self, axis: &Vec3) -> f32 {
        (0..3)
            .map(|i| self.half_extent[i] * self.axes[i].dot(axis).abs())
            .sum()
    }

    /// SAT overlap test with the default axis epsilon
    pub fn intersects(&self, other: &Obb) -> bool {
        self.intersects_with_epsilon(other, DEFAULT_AXIS_EPSILON)
    }

    /// Separating axis test over the 15 candidate axes
    ///
    /// Boxes that only touch are treated as separated. Near-zero cross
    /// products (parallel edges) are skipped rather than normalized.
    pub fn intersects_with_epsilon(&self, other: &Obb, axis_epsilon: f32) -> bool {
        let offset = other.center - self.center;

        let separated_on = |axis: Vec3| -> bool {
            let len_sq = axis.magnitude_squared();
            if len_sq < axis_epsilon {
                return false;
            }
            let n = axis / len_sq.sqrt();
            let dist = offset.dot(&n).abs();
            dist >= self.project_radius(&n) + other.project_radius(&n)
        };

        if self.axes.iter().chain(other.axes.iter()).any(|a| separated_on(*a)) {
            return false;
        }

        for a in &self.axes {
            for b in &other.axes {
                if separated_on(a.cross(b)) {
                    return false;
                }
            }
        }

        true
    }

    /// Closest point on or inside the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        (0..3).fold(self.center, |acc, i| {
            let h = self.half_extent[i];
            acc + self.axes[i] * d.dot(&self.axes[i]).clamp(-h, h)
        })
    }

    /// Sphere overlap by clamping the sphere center into the box frame
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let radius = sphere.radius.max(0.0);
        (sphere.center - self.closest_point(sphere.center)).magnitude_squared() <= radius * radius
    }

    /// Overlap with an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects(&Obb::from_aabb(aabb))
    }

    /// Tight axis-aligned bounds of the rotated box
    pub fn to_aabb(&self) -> Aabb {
        let reach = (0..3).fold(Vec3::zeros(), |acc, i| {
            acc + self.axes[i].abs() * self.half_extent[i]
        });
        Aabb::from_center_extents(self.center, reach)
    }

    /// The eight corners in the same order as [`Aabb::corners`]
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
            self.center
                + self.axes[0] * (self.half_extent.x * sign(1))
                + self.axes[1] * (self.half_extent.y * sign(2))
                + self.axes[2] * (self.half_extent.z * sign(4))
        })
    }

    /// Ray entry distance, found by running the slab test in box space
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let d = ray.origin - self.center;
        let local = Ray {
            origin: Vec3::new(d.dot(&self.axes[0]), d.dot(&self.axes[1]), d.dot(&self.axes[2])),
            direction: Vec3::new(
                ray.direction.dot(&self.axes[0]),
                ray.direction.dot(&self.axes[1]),
                ray.direction.dot(&self.axes[2]),
            ),
        };
        Aabb::from_center_extents(Vec3::zeros(), self.half_extent)
            .slab_test(&local, DEFAULT_PARALLEL_EPSILON)
            .map(|(t_min, _)| t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::PI, Quat};
    use approx::assert_relative_eq;

    fn cube_at(x: f32) -> Obb {
        Obb::from_transform(Vec3::new(1.0, 1.0, 1.0), &Transform::from_position(Vec3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_sat_touching_boxes_separated() {
        assert!(!cube_at(0.0).intersects(&cube_at(2.0)));
    }

    #[test]
    fn test_sat_overlapping_boxes() {
        assert!(cube_at(0.0).intersects(&cube_at(1.9)));
    }

    #[test]
    fn test_sat_rotated_box_reaches_further() {
        // A cube rotated 45 degrees about Z has a corner at sqrt(2) along X
        let rotated = Obb::from_transform(
            Vec3::new(1.0, 1.0, 1.0),
            &Transform::from_position_rotation(
                Vec3::new(2.3, 0.0, 0.0),
                Quat::from_axis_angle(&Vec3::z_axis(), PI * 0.25),
            ),
        );
        assert!(cube_at(0.0).intersects(&rotated));
        assert!(!cube_at(0.0).intersects(&cube_at(2.3)));
    }

    #[test]
    fn test_sat_parallel_edges_do_not_falsely_separate() {
        let a = cube_at(0.0);
        let b = cube_at(0.5);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_scale_uses_absolute_value() {
        let transform = Transform::identity().with_scale(Vec3::new(-2.0, 1.0, 1.0));
        let obb = Obb::from_transform(Vec3::new(1.0, 1.0, 1.0), &transform);
        assert_relative_eq!(obb.half_extent, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_sphere_against_rotated_box() {
        let obb = Obb::new(
            Vec3::zeros(),
            Transform::from_position_rotation(Vec3::zeros(), Quat::from_axis_angle(&Vec3::z_axis(), PI * 0.25)).axes(),
            Vec3::new(1.0, 1.0, 1.0),
        );
        // Corner sits at sqrt(2) ~ 1.414 on the X axis
        assert!(obb.intersects_sphere(&BoundingSphere::new(Vec3::new(1.6, 0.0, 0.0), 0.25)));
        assert!(!obb.intersects_sphere(&BoundingSphere::new(Vec3::new(1.8, 0.0, 0.0), 0.25)));
    }

    #[test]
    fn test_to_aabb_of_rotated_box() {
        let obb = Obb::new(
            Vec3::zeros(),
            Transform::from_position_rotation(Vec3::zeros(), Quat::from_axis_angle(&Vec3::z_axis(), PI * 0.25)).axes(),
            Vec3::new(1.0, 1.0, 1.0),
        );
        let aabb = obb.to_aabb();
        assert_relative_eq!(aabb.max.x, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(aabb.max.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_against_box() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(cube_at(0.0).intersect_ray(&ray).unwrap(), 4.0, epsilon = 1e-5);
        let miss = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(cube_at(0.0).intersect_ray(&miss).is_none());
    }

    #[test]
    fn test_negative_extent_clamped() {
        let obb = Obb::new(Vec3::zeros(), [Vec3::x(), Vec3::y(), Vec3::z()], Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(obb.half_extent.x, 0.0);
    }
}
