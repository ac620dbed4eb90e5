//! Collision geometry
//!
//! Shapes are stored in model space and turned into world-space primitives
//! only while a test runs.
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, axis-aligned boxes, spheres
//! - [`obb`] - Oriented boxes and the separating axis test
//! - [`capsule`] - Capsule decomposition into a core box plus two caps
//! - [`shape`] - Model-space shapes and their world-space counterparts

pub mod primitives;
pub mod obb;
pub mod capsule;
pub mod shape;

// Re-export commonly used types
pub use primitives::{Aabb, BoundingSphere, Ray, RayHit};
pub use obb::Obb;
pub use capsule::CapsuleParts;
pub use shape::{CollisionShape, ShapeKind, WorldSpaceShape};
