//! Capsule decomposition
//!
//! A capsule is handled as a core box plus two spherical caps, so every
//! capsule test reuses the box and sphere primitives. The core box is square
//! in cross section, which makes the result slightly conservative near the
//! rounded edges.

use crate::foundation::math::{safe_normalize, Transform, Vec3};
use super::obb::Obb;
use super::primitives::{Aabb, BoundingSphere, Ray};

/// World-space pieces of a capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleParts {
    /// Core box between the two cap centers
    pub core: Obb,
    /// Bottom and top cap centers
    pub caps: [Vec3; 2],
    /// World radius of the caps and the core cross section
    pub radius: f32,
}

impl CapsuleParts {
    /// Build the capsule pieces for a local `radius` and `half_height`
    ///
    /// `half_height` includes the caps. The radius scales by the larger of
    /// |scale.x| and |scale.y|; the axis scales by |scale.z|.
    pub fn from_transform(radius: f32, half_height: f32, transform: &Transform) -> Self {
        let radius = radius.max(0.0);
        let scale = transform.abs_scale();
        let radius_world = radius * scale.x.max(scale.y);
        let axis_half_world = (half_height - radius).max(0.0) * scale.z;

        let axis = safe_normalize(transform.rotation * Vec3::z());
        let center = transform.position;

        Self {
            core: Obb::new(
                center,
                transform.axes(),
                Vec3::new(radius_world, radius_world, axis_half_world),
            ),
            caps: [center - axis * axis_half_world, center + axis * axis_half_world],
            radius: radius_world,
        }
    }

    /// The two caps as spheres
    pub fn cap_spheres(&self) -> [BoundingSphere; 2] {
        self.caps.map(|c| BoundingSphere::new(c, self.radius))
    }

    /// Axis-aligned bounds of the core box and both caps
    pub fn to_aabb(&self) -> Aabb {
        let [bottom, top] = self.cap_spheres();
        self.core
            .to_aabb()
            .union(&bottom.to_aabb())
            .union(&top.to_aabb())
    }

    /// Nearest ray entry over the core and both caps
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let [bottom, top] = self.cap_spheres();
        [
            self.core.intersect_ray(ray),
            bottom.intersect_ray(ray),
            top.intersect_ray(ray),
        ]
        .into_iter()
        .flatten()
        .min_by(f32::total_cmp)
    }
}
