//! Narrow-phase overlap tests
//!
//! Decides whether two shapes under their own world transforms overlap.
//! Every test is total: degenerate input is clamped, never rejected.

use crate::config::NarrowPhaseConfig;
use crate::foundation::math::Transform;
use super::collision::obb::DEFAULT_AXIS_EPSILON;
use super::collision::{CapsuleParts, CollisionShape, WorldSpaceShape};

/// Overlap tester carrying the SAT axis epsilon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrowPhase {
    axis_epsilon: f32,
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self { axis_epsilon: DEFAULT_AXIS_EPSILON }
    }
}

impl NarrowPhase {
    /// Create from configuration
    pub fn new(config: &NarrowPhaseConfig) -> Self {
        Self { axis_epsilon: config.axis_epsilon.max(0.0) }
    }

    /// Do two model-space shapes overlap under their world transforms?
    pub fn overlaps(
        &self,
        shape_a: &CollisionShape,
        transform_a: &Transform,
        shape_b: &CollisionShape,
        transform_b: &Transform,
    ) -> bool {
        self.test(&shape_a.to_world_space(transform_a), &shape_b.to_world_space(transform_b))
    }

    /// Overlap test between two world-space shapes
    pub fn test(&self, a: &WorldSpaceShape, b: &WorldSpaceShape) -> bool {
        match (a, b) {
            (WorldSpaceShape::Box(a), WorldSpaceShape::Box(b)) => {
                a.intersects_with_epsilon(b, self.axis_epsilon)
            }

            (WorldSpaceShape::Box(obb), WorldSpaceShape::Sphere(sphere)) |
            (WorldSpaceShape::Sphere(sphere), WorldSpaceShape::Box(obb)) => {
                obb.intersects_sphere(sphere)
            }

            (WorldSpaceShape::Sphere(a), WorldSpaceShape::Sphere(b)) => a.intersects(b),

            // Capsule-capsule unfolds into core/core, core/cap and cap/cap
            (WorldSpaceShape::Capsule(capsule), other) |
            (other, WorldSpaceShape::Capsule(capsule)) => self.capsule_vs(capsule, other),
        }
    }

    fn capsule_vs(&self, capsule: &CapsuleParts, other: &WorldSpaceShape) -> bool {
        let [bottom, top] = capsule.cap_spheres();
        self.test(&WorldSpaceShape::Box(capsule.core), other)
            || self.test(&WorldSpaceShape::Sphere(bottom), other)
            || self.test(&WorldSpaceShape::Sphere(top), other)
    }
}

/// Overlap test with default tolerances
pub fn overlaps(
    shape_a: &CollisionShape,
    transform_a: &Transform,
    shape_b: &CollisionShape,
    transform_b: &Transform,
) -> bool {
    NarrowPhase::default().overlaps(shape_a, transform_a, shape_b, transform_b)
}
