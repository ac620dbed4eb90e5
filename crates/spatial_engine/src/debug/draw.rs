//! Debug drawing primitives

use crate::foundation::math::{Vec3, Vec4};

/// Edges of a box as pairs of corner indices, corners ordered as in
/// [`crate::physics::Aabb::corners`]
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// Segment start
        start: Vec3,
        /// Segment end
        end: Vec3,
        /// RGBA color
        color: Vec4,
    },

    /// Sphere at center with radius
    Sphere {
        /// Center
        center: Vec3,
        /// Radius
        radius: f32,
        /// RGBA color
        color: Vec4,
    },

    /// Oriented box
    Box {
        /// Center
        center: Vec3,
        /// Local axes in world space
        axes: [Vec3; 3],
        /// Half size along each axis
        half_extent: Vec3,
        /// RGBA color
        color: Vec4,
    },

    /// Capsule between two cap centers
    Capsule {
        /// Bottom cap center
        start: Vec3,
        /// Top cap center
        end: Vec3,
        /// Cap radius
        radius: f32,
        /// RGBA color
        color: Vec4,
    },
}

impl DebugShape {
    /// Shape color
    pub fn color(&self) -> Vec4 {
        match self {
            DebugShape::Line { color, .. }
            | DebugShape::Sphere { color, .. }
            | DebugShape::Box { color, .. }
            | DebugShape::Capsule { color, .. } => *color,
        }
    }
}

/// Flat list of shapes for one frame
#[derive(Clone, Debug, Default)]
pub struct DebugDrawList {
    shapes: Vec<DebugShape>,
}

impl DebugDrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape
    pub fn push(&mut self, shape: DebugShape) {
        self.shapes.push(shape);
    }

    /// Add a line
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        self.push(DebugShape::Line { start, end, color });
    }

    /// Add the 12 edges of a box given its 8 corners
    pub fn draw_wire_box(&mut self, corners: &[Vec3; 8], color: Vec4) {
        for (a, b) in BOX_EDGES {
            self.draw_line(corners[a], corners[b], color);
        }
    }

    /// Everything added so far
    pub fn shapes(&self) -> &[DebugShape] {
        &self.shapes
    }

    /// Number of shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Drop all shapes
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Aabb;

    #[test]
    fn test_wire_box_edges_are_axis_aligned() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        let mut list = DebugDrawList::new();
        list.draw_wire_box(&aabb.corners(), Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(list.len(), 12);

        for shape in list.shapes() {
            let DebugShape::Line { start, end, .. } = shape else {
                panic!("expected a line");
            };
            let changed = (0..3).filter(|&i| start[i] != end[i]).count();
            assert_eq!(changed, 1);
        }
    }
}
