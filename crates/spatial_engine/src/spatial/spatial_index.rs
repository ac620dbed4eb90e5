//! Spatial index over cached object bounds
//!
//! Objects push their world AABB whenever they move. The hierarchy is rebuilt
//! from the full cache at most once per frame, in [`SpatialIndex::flush_rebuild`],
//! and is read-only until the next rebuild.

use std::collections::HashMap;
use std::hash::Hash;

use crate::config::{RayQueryConfig, SpatialConfig};
use crate::foundation::logging::{debug, trace};
use crate::physics::collision::Aabb;
use super::lbvh::{Lbvh, LbvhNodeKind};

/// Summary numbers for tooling and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpatialIndexStats {
    /// Objects with a cached AABB
    pub tracked: usize,
    /// Objects in the last build
    pub built: usize,
    /// Nodes in the last build
    pub nodes: usize,
    /// `ceil(log2(nodes + 1))`
    pub max_occupied_depth: usize,
    /// A rebuild is pending
    pub dirty: bool,
}

/// Broad-phase index generic over the handle type
#[derive(Debug, Clone)]
pub struct SpatialIndex<H> {
    pub(crate) bounds: HashMap<H, Aabb>,
    pub(crate) tree: Lbvh<H>,
    pending_rebuild: bool,
    max_leaf_size: usize,
    pub(crate) ray: RayQueryConfig,
}

impl<H> Default for SpatialIndex<H> {
    fn default() -> Self {
        let config = SpatialConfig::default();
        Self {
            bounds: HashMap::new(),
            tree: Lbvh::default(),
            pending_rebuild: false,
            max_leaf_size: config.lbvh.max_leaf_size,
            ray: config.ray,
        }
    }
}

impl<H: Copy + Eq + Hash + Ord + std::fmt::Debug> SpatialIndex<H> {
    /// Create an empty index
    pub fn new(config: &SpatialConfig) -> Self {
        Self {
            max_leaf_size: config.lbvh.max_leaf_size.max(1),
            ray: config.ray.clone(),
            ..Self::default()
        }
    }

    /// Cache the world AABB of `handle` and mark the tree dirty
    pub fn update(&mut self, handle: H, bounds: Aabb) {
        self.bounds.insert(handle, bounds);
        self.pending_rebuild = true;
    }

    /// Forget `handle`; marks the tree dirty if it was tracked
    pub fn remove(&mut self, handle: H) -> bool {
        let removed = self.bounds.remove(&handle).is_some();
        if removed {
            self.pending_rebuild = true;
        }
        removed
    }

    /// Add many objects and rebuild immediately, bypassing the dirty flag
    pub fn bulk_load<I: IntoIterator<Item = (H, Aabb)>>(&mut self, items: I) {
        self.bounds.extend(items);
        self.rebuild();
    }

    /// Rebuild now if anything changed since the last build
    ///
    /// Returns whether a rebuild ran.
    pub fn flush_rebuild(&mut self) -> bool {
        if !self.pending_rebuild {
            return false;
        }
        self.rebuild();
        true
    }

    /// Unconditional full rebuild from the bounds cache
    pub fn rebuild(&mut self) {
        self.pending_rebuild = false;

        let items: Vec<(H, Aabb)> = self.bounds.iter().map(|(h, b)| (*h, *b)).collect();
        self.tree = Lbvh::build(&items, self.max_leaf_size);

        debug!(
            "LBVH rebuilt: {} objects, {} nodes, depth {}",
            self.tree.object_count(),
            self.tree.node_count(),
            self.tree.max_occupied_depth()
        );
    }

    /// Drop every object and the tree
    pub fn clear(&mut self) {
        self.bounds.clear();
        self.tree = Lbvh::default();
        self.pending_rebuild = false;
    }

    /// Log one line per node at debug level
    pub fn debug_dump(&self) {
        debug!(
            "LBVH dump: {} nodes, {} objects, {} tracked",
            self.tree.node_count(),
            self.tree.object_count(),
            self.bounds.len()
        );
        for (index, node) in self.tree.nodes().iter().enumerate() {
            match node.kind {
                LbvhNodeKind::Internal { left, right } => debug!(
                    "  [{index}] internal left={left} right={right} min={:?} max={:?}",
                    node.bounds.min.as_slice(),
                    node.bounds.max.as_slice()
                ),
                LbvhNodeKind::Leaf { first, count } => debug!(
                    "  [{index}] leaf first={first} count={count} objects={:?} min={:?} max={:?}",
                    self.tree.leaf_objects(node),
                    node.bounds.min.as_slice(),
                    node.bounds.max.as_slice()
                ),
            }
        }
    }

    /// Cached bounds of `handle`, skipping and tracing stale handles
    pub(crate) fn live_bounds(&self, handle: H) -> Option<&Aabb> {
        let bounds = self.bounds.get(&handle);
        if bounds.is_none() {
            trace!("Skipping stale handle {handle:?}");
        }
        bounds
    }
}

impl<H: Eq + Hash> SpatialIndex<H> {
    /// Is a rebuild pending?
    pub fn is_dirty(&self) -> bool {
        self.pending_rebuild
    }

    /// Is `handle` tracked?
    pub fn contains(&self, handle: &H) -> bool {
        self.bounds.contains_key(handle)
    }

    /// Cached world AABB of `handle`
    pub fn cached_bounds(&self, handle: &H) -> Option<&Aabb> {
        self.bounds.get(handle)
    }

    /// The last built hierarchy
    pub fn tree(&self) -> &Lbvh<H> {
        &self.tree
    }

    /// Number of nodes in the last build
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// Objects in the last build
    pub fn object_count(&self) -> usize {
        self.tree.object_count()
    }

    /// Objects with a cached AABB
    pub fn tracked_count(&self) -> usize {
        self.bounds.len()
    }

    /// `ceil(log2(node_count + 1))`
    pub fn max_occupied_depth(&self) -> usize {
        self.tree.max_occupied_depth()
    }

    /// Root bounds of the last build
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.tree.bounds()
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> SpatialIndexStats {
        SpatialIndexStats {
            tracked: self.tracked_count(),
            built: self.object_count(),
            nodes: self.node_count(),
            max_occupied_depth: self.max_occupied_depth(),
            dirty: self.pending_rebuild,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn cube(x: f32) -> Aabb {
        Aabb::from_center_extents(Vec3::new(x, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_update_marks_dirty_until_flush() {
        let mut index = SpatialIndex::new(&SpatialConfig::default());
        assert!(!index.is_dirty());

        index.update(1_u32, cube(0.0));
        assert!(index.is_dirty());
        assert_eq!(index.object_count(), 0);
        assert_eq!(index.tracked_count(), 1);

        assert!(index.flush_rebuild());
        assert!(!index.is_dirty());
        assert_eq!(index.object_count(), 1);
        assert!(!index.flush_rebuild());
    }

    #[test]
    fn test_remove_unknown_keeps_clean() {
        let mut index: SpatialIndex<u32> = SpatialIndex::default();
        assert!(!index.remove(3));
        assert!(!index.is_dirty());
    }

    #[test]
    fn test_bulk_load_builds_immediately() {
        let mut index = SpatialIndex::new(&SpatialConfig::default());
        index.bulk_load((0..10_u32).map(|i| (i, cube(i as f32 * 2.0))));
        assert!(!index.is_dirty());
        assert_eq!(index.object_count(), 10);
        assert_eq!(index.world_bounds().map(|b| b.max.x), Some(18.5));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut index = SpatialIndex::new(&SpatialConfig::default());
        index.bulk_load([(1_u32, cube(0.0)), (2, cube(3.0))]);
        index.update(3, cube(6.0));
        index.clear();

        let stats = index.stats();
        assert_eq!(stats, SpatialIndexStats::default());
        assert!(index.world_bounds().is_none());
    }

    #[test]
    fn test_stats_after_build() {
        let config = SpatialConfig::default().with_max_leaf_size(1);
        let mut index = SpatialIndex::new(&config);
        index.bulk_load((0..4_u32).map(|i| (i, cube(i as f32))));
        let stats = index.stats();
        assert_eq!(stats.nodes, 7);
        assert_eq!(stats.max_occupied_depth, 3);
        assert_eq!(stats.tracked, 4);
        index.debug_dump();
    }
}
