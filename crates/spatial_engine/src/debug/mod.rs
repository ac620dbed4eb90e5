//! Debug visualization data
//!
//! Produces shapes for a renderer to draw; nothing here renders.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugDrawList, DebugShape};
pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
