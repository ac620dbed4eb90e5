//! Collision-specific debug visualization
//!
//! Turns the hierarchy and the collision world into [`DebugShape`]s.

use crate::debug::draw::{DebugDrawList, DebugShape};
use crate::foundation::math::Vec4;
use crate::physics::collision::WorldSpaceShape;
use crate::physics::CollisionWorld;
use crate::spatial::Lbvh;

/// Color scheme for collision visualization
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Hierarchy leaf boxes
    pub lbvh_leaf: Vec4,
    /// Hierarchy internal boxes
    pub lbvh_internal: Vec4,
    /// Shapes not overlapping anything
    pub shape_default: Vec4,
    /// Shapes overlapping something
    pub shape_overlapping: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            lbvh_leaf: Vec4::new(1.0, 0.2, 0.0, 1.0),      // Red-orange
            lbvh_internal: Vec4::new(1.0, 0.8, 0.0, 1.0),  // Yellow
            shape_default: Vec4::new(0.0, 1.0, 0.0, 0.3),  // Green, semi-transparent
            shape_overlapping: Vec4::new(1.0, 0.0, 0.0, 0.5), // Red, semi-transparent
        }
    }
}

/// Collision-specific debug visualizer
pub struct CollisionDebugVisualizer {
    draw: DebugDrawList,
    colors: CollisionDebugColors,

    /// Emit one wire box per hierarchy node
    pub show_hierarchy: bool,

    /// Emit one shape per collision object
    pub show_shapes: bool,
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDebugVisualizer {
    /// Create a new collision debug visualizer
    pub fn new() -> Self {
        Self {
            draw: DebugDrawList::new(),
            colors: CollisionDebugColors::default(),
            show_hierarchy: true,
            show_shapes: true,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Wire boxes for every node of `tree`
    pub fn draw_hierarchy<H>(&mut self, tree: &Lbvh<H>) {
        if !self.show_hierarchy {
            return;
        }
        for node in tree.nodes() {
            let color = if node.is_leaf() {
                self.colors.lbvh_leaf
            } else {
                self.colors.lbvh_internal
            };
            self.draw.draw_wire_box(&node.bounds.corners(), color);
        }
    }

    /// One shape per active object, colored by overlap state
    pub fn draw_world(&mut self, world: &CollisionWorld) {
        if self.show_hierarchy {
            self.draw_hierarchy(world.index().tree());
        }
        if !self.show_shapes {
            return;
        }

        for (_, object) in world.objects().filter(|(_, o)| o.is_alive()) {
            let color = if object.current_overlaps().is_empty() {
                self.colors.shape_default
            } else {
                self.colors.shape_overlapping
            };

            let shape = match object.shape().to_world_space(object.transform()) {
                WorldSpaceShape::Box(obb) => DebugShape::Box {
                    center: obb.center,
                    axes: obb.axes,
                    half_extent: obb.half_extent,
                    color,
                },
                WorldSpaceShape::Sphere(sphere) => DebugShape::Sphere {
                    center: sphere.center,
                    radius: sphere.radius,
                    color,
                },
                WorldSpaceShape::Capsule(parts) => DebugShape::Capsule {
                    start: parts.caps[0],
                    end: parts.caps[1],
                    radius: parts.radius,
                    color,
                },
            };
            self.draw.push(shape);
        }
    }

    /// Shapes gathered so far
    pub fn shapes(&self) -> &[DebugShape] {
        self.draw.shapes()
    }

    /// Start a new frame
    pub fn clear(&mut self) {
        self.draw.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::NotifiedPairs;
    use crate::foundation::math::{Transform, Vec3};
    use crate::physics::{CollisionObjectDesc, CollisionShape};

    #[test]
    fn test_hierarchy_emits_twelve_lines_per_node() {
        let mut world = CollisionWorld::default();
        world.bulk_spawn((0..9).map(|i| {
            CollisionObjectDesc::new(CollisionShape::sphere(0.5), Transform::from_position(Vec3::new(i as f32 * 2.0, 0.0, 0.0)))
        }));

        let mut visualizer = CollisionDebugVisualizer::new();
        visualizer.show_shapes = false;
        visualizer.draw_world(&world);
        assert_eq!(visualizer.shapes().len(), 12 * world.index().node_count());
    }

    #[test]
    fn test_overlapping_shapes_change_color() {
        let mut world = CollisionWorld::default();
        let a = world.spawn(CollisionObjectDesc::new(CollisionShape::sphere(1.0), Transform::identity()));
        world.spawn(CollisionObjectDesc::new(
            CollisionShape::capsule(0.5, 1.0),
            Transform::from_position(Vec3::new(1.0, 0.0, 0.0)),
        ));
        world.spawn(CollisionObjectDesc::new(
            CollisionShape::cuboid(Vec3::new(0.5, 0.5, 0.5)),
            Transform::from_position(Vec3::new(20.0, 0.0, 0.0)),
        ));
        world.update_overlaps(&mut NotifiedPairs::new(), &mut ());
        assert!(!world.overlapping_with(a).is_empty());

        let colors = CollisionDebugColors::default();
        let mut visualizer = CollisionDebugVisualizer::new();
        visualizer.show_hierarchy = false;
        visualizer.draw_world(&world);

        let shapes = visualizer.shapes();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes.iter().filter(|s| s.color() == colors.shape_overlapping).count(), 2);
        assert!(shapes.iter().any(|s| matches!(s, DebugShape::Box { .. })));
    }
}
