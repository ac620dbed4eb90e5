//! # Spatial Engine
//!
//! The spatial and collision core of a real-time 3D engine.
//!
//! ## Features
//!
//! - **LBVH Broad Phase**: Morton-ordered bounding volume hierarchy, rebuilt
//!   in bulk once per frame from cached object bounds
//! - **Queries**: Frustum culling, nearest-hit ray picking, and AABB / OBB /
//!   sphere volume queries
//! - **Narrow Phase**: Boolean overlap tests between boxes, spheres and
//!   capsules under arbitrary transforms
//! - **Overlap Events**: Begin / end / hit notifications, once per pair per
//!   transition
//!
//! ## Quick Start
//!
//! ```rust
//! use spatial_engine::prelude::*;
//!
//! let mut world = CollisionWorld::new(&SpatialConfig::default());
//! let a = world.spawn(CollisionObjectDesc::new(
//!     CollisionShape::sphere(1.0),
//!     Transform::from_position(Vec3::new(0.0, 0.0, 0.0)),
//! ));
//! let b = world.spawn(CollisionObjectDesc::new(
//!     CollisionShape::cuboid(Vec3::new(1.0, 1.0, 1.0)),
//!     Transform::from_position(Vec3::new(1.5, 0.0, 0.0)),
//! ));
//!
//! world.flush_rebuild();
//!
//! let mut notified = NotifiedPairs::new();
//! let mut events = OverlapEventLog::new();
//! world.update_overlaps(&mut notified, &mut events);
//! assert!(world.is_overlapping(a, b));
//! assert_eq!(events.count(OverlapEventKind::Begin), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;
pub mod debug;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SpatialConfig},
        foundation::{
            collections::{NotifiedPairs, ObjectHandle},
            math::{Mat4, Mat4Ext, Quat, Transform, Vec3},
        },
        physics::{
            overlaps, Aabb, BoundingSphere, CollisionLayers, CollisionObjectDesc, CollisionResponse,
            CollisionShape, CollisionWorld, NarrowPhase, Obb, ObjectFlags, OverlapEventKind,
            OverlapEventLog, OverlapListener, Ray, RayHit,
        },
        spatial::{Containment, Frustum, QueryVolume, SpatialIndex},
        debug::CollisionDebugVisualizer,
    };
}
