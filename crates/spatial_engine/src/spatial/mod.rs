//! Spatial partitioning data structures
//!
//! A linear BVH over cached object AABBs, rebuilt in bulk, plus the frustum,
//! ray and volume queries that run against it.

pub mod morton;
pub mod frustum;
pub mod lbvh;
mod spatial_index;
mod query;

pub use frustum::{Containment, Frustum, Plane};
pub use lbvh::{Lbvh, LbvhNode, LbvhNodeKind};
pub use spatial_index::{SpatialIndex, SpatialIndexStats};
pub use query::QueryVolume;
