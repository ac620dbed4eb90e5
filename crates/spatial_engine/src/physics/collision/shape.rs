//! High-level collision shape abstractions
//!
//! Shapes are stored in model space and transformed to world space on demand,
//! only for the duration of a single test.

use crate::foundation::math::{Transform, Vec3};
use super::capsule::CapsuleParts;
use super::obb::Obb;
use super::primitives::{Aabb, BoundingSphere, Ray};

/// Shape discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Oriented box
    Box,
    /// Sphere
    Sphere,
    /// Capsule along local Z
    Capsule,
}

/// Collision shape types (stored in MODEL SPACE)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    /// A box given by its local half-extent
    Box {
        /// Half size along local X, Y, Z
        half_extent: Vec3,
    },
    /// A sphere of the given local radius
    Sphere {
        /// Local radius
        radius: f32,
    },
    /// A capsule along local Z
    Capsule {
        /// Local radius of the caps
        radius: f32,
        /// Half height including the caps
        half_height: f32,
    },
}

impl CollisionShape {
    /// Creates a box shape
    pub fn cuboid(half_extent: Vec3) -> Self {
        Self::Box { half_extent }
    }

    /// Creates a spherical shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Creates a capsule shape
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule { radius, half_height }
    }

    /// The shape's kind
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box { .. } => ShapeKind::Box,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Capsule { .. } => ShapeKind::Capsule,
        }
    }

    /// Transform this shape to world space
    ///
    /// Spheres take the largest absolute scale component as their radius
    /// multiplier, so non-uniform scale yields an enclosing sphere rather than
    /// an ellipsoid.
    pub fn to_world_space(&self, transform: &Transform) -> WorldSpaceShape {
        match *self {
            Self::Box { half_extent } => {
                WorldSpaceShape::Box(Obb::from_transform(half_extent, transform))
            }
            Self::Sphere { radius } => WorldSpaceShape::Sphere(BoundingSphere::new(
                transform.position,
                radius.max(0.0) * transform.max_abs_scale(),
            )),
            Self::Capsule { radius, half_height } => {
                WorldSpaceShape::Capsule(CapsuleParts::from_transform(radius, half_height, transform))
            }
        }
    }

    /// World-space axis-aligned bounds under `transform`
    pub fn world_aabb(&self, transform: &Transform) -> Aabb {
        self.to_world_space(transform).to_aabb()
    }
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// World-space oriented box
    Box(Obb),
    /// World-space sphere
    Sphere(BoundingSphere),
    /// World-space capsule pieces
    Capsule(CapsuleParts),
}

impl WorldSpaceShape {
    /// Kind of the source shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box(_) => ShapeKind::Box,
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Capsule(_) => ShapeKind::Capsule,
        }
    }

    /// Get center position
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Box(obb) => obb.center,
            Self::Sphere(sphere) => sphere.center,
            Self::Capsule(parts) => parts.core.center,
        }
    }

    /// Axis-aligned bounds
    pub fn to_aabb(&self) -> Aabb {
        match self {
            Self::Box(obb) => obb.to_aabb(),
            Self::Sphere(sphere) => sphere.to_aabb(),
            Self::Capsule(parts) => parts.to_aabb(),
        }
    }

    /// Test ray intersection with this collision shape
    /// Returns distance to hit if intersected, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Box(obb) => obb.intersect_ray(ray),
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
            Self::Capsule(parts) => parts.intersect_ray(ray),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(CollisionShape::cuboid(Vec3::new(1.0, 1.0, 1.0)).kind(), ShapeKind::Box);
        assert_eq!(CollisionShape::sphere(1.0).kind(), ShapeKind::Sphere);
        assert_eq!(CollisionShape::capsule(0.5, 1.0).kind(), ShapeKind::Capsule);
    }

    #[test]
    fn test_sphere_radius_inflated_by_max_scale() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(1.0, 2.0, -4.0));
        match CollisionShape::sphere(0.5).to_world_space(&transform) {
            WorldSpaceShape::Sphere(sphere) => {
                assert_relative_eq!(sphere.radius, 2.0);
                assert_relative_eq!(sphere.center, Vec3::new(1.0, 2.0, 3.0));
            }
            other => panic!("expected sphere, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_radius_clamped() {
        let aabb = CollisionShape::sphere(-1.0).world_aabb(&Transform::identity());
        assert_eq!(aabb, Aabb::default());
    }

    #[test]
    fn test_box_world_aabb() {
        let transform = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
        let aabb = CollisionShape::cuboid(Vec3::new(1.0, 2.0, 3.0)).world_aabb(&transform);
        assert_relative_eq!(aabb.min, Vec3::new(4.0, -2.0, -3.0));
        assert_relative_eq!(aabb.max, Vec3::new(6.0, 2.0, 3.0));
    }
}
