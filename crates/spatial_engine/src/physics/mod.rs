//! Collision detection
//!
//! Narrow-phase geometry, layer filtering, and the per-object overlap state
//! machine driven by [`CollisionWorld`].

pub mod collision;
pub mod narrow_phase;
pub mod collision_layers;
pub mod overlap;
pub mod collision_world;

pub use collision::{Aabb, BoundingSphere, CapsuleParts, CollisionShape, Obb, Ray, RayHit, ShapeKind, WorldSpaceShape};
pub use narrow_phase::{overlaps, NarrowPhase};
pub use collision_layers::{CollisionLayers, CollisionResponse};
pub use overlap::{OverlapEvent, OverlapEventKind, OverlapEventLog, OverlapListener, OverlapSets};
pub use collision_world::{CollisionObject, CollisionObjectDesc, CollisionWorld, ObjectFlags};
