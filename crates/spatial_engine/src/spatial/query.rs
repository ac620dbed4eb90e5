//! Read-only traversals over the last built hierarchy
//!
//! Queries never touch the dirty flag or the tree. Handles whose cached
//! bounds are gone (removed since the build) are skipped silently.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::hash::Hash;

use crate::physics::collision::{Aabb, BoundingSphere, Obb, Ray};
use super::frustum::{Containment, Frustum};
use super::lbvh::LbvhNodeKind;
use super::spatial_index::SpatialIndex;

/// A query volume that can be tested against AABBs
pub trait QueryVolume {
    /// Does the volume touch `aabb`?
    fn intersects_aabb(&self, aabb: &Aabb) -> bool;
}

impl QueryVolume for Aabb {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects(aabb)
    }
}

impl QueryVolume for Obb {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        Obb::intersects_aabb(self, aabb)
    }
}

impl QueryVolume for BoundingSphere {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        aabb.intersects_sphere(self)
    }
}

/// Heap entry ordered so the smallest entry distance pops first
#[derive(Debug, Clone, Copy)]
struct NodeCandidate {
    t_min: f32,
    node: usize,
}

impl PartialEq for NodeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeCandidate {}

impl PartialOrd for NodeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .t_min
            .total_cmp(&self.t_min)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<H: Copy + Eq + Hash + Ord + std::fmt::Debug> SpatialIndex<H> {
    /// Report every object whose cached bounds is visible in `frustum`
    ///
    /// A root fully inside the frustum reports every object of the last build
    /// that is still tracked, without descending. Objects added since the
    /// build are not in the tree and are not reported until the next rebuild.
    pub fn query_frustum<F: FnMut(H)>(&self, frustum: &Frustum, mut visible: F) {
        let Some(root) = self.tree.root() else {
            return;
        };

        match frustum.classify_aabb(&root.bounds) {
            Containment::Outside => return,
            Containment::Inside => {
                for &handle in self.tree.objects() {
                    if self.live_bounds(handle).is_some() {
                        visible(handle);
                    }
                }
                return;
            }
            Containment::Intersecting => {}
        }

        let mut stack = vec![0_usize];
        while let Some(index) = stack.pop() {
            let node = &self.tree.nodes()[index];
            match node.kind {
                LbvhNodeKind::Internal { left, right } => {
                    for child in [left, right] {
                        if frustum.is_aabb_visible(&self.tree.nodes()[child].bounds) {
                            stack.push(child);
                        }
                    }
                }
                LbvhNodeKind::Leaf { .. } => {
                    for &handle in self.tree.leaf_objects(node) {
                        if self.live_bounds(handle).is_some_and(|b| frustum.is_aabb_visible(b)) {
                            visible(handle);
                        }
                    }
                }
            }
        }
    }

    /// Collect the visible handles
    pub fn visible_objects(&self, frustum: &Frustum) -> Vec<H> {
        let mut out = Vec::new();
        self.query_frustum(frustum, |h| out.push(h));
        out
    }

    /// Closest object hit by `ray`
    ///
    /// `hit_test` returns the exact hit distance for one object, or `None`.
    /// `max_distance` seeds the best distance (a far clip plane, say); only
    /// hits strictly closer than it are accepted. A non-finite or
    /// non-positive seed means unbounded.
    pub fn query_nearest_ray<F>(&self, ray: &Ray, max_distance: f32, mut hit_test: F) -> Option<(H, f32)>
    where
        F: FnMut(H, &Ray) -> Option<f32>,
    {
        let mut best_t = if max_distance.is_finite() && max_distance > 0.0 {
            max_distance
        } else {
            f32::INFINITY
        };
        let mut best: Option<(H, f32)> = None;

        let root = self.tree.root()?;
        let epsilon = self.ray.prune_epsilon;
        let slab = |aabb: &Aabb| aabb.slab_test(ray, self.ray.parallel_epsilon);

        let (root_t, _) = slab(&root.bounds)?;
        let mut heap = BinaryHeap::new();
        heap.push(NodeCandidate { t_min: root_t, node: 0 });

        while let Some(candidate) = heap.pop() {
            if best.is_some() && candidate.t_min > best_t + epsilon {
                break;
            }

            let node = &self.tree.nodes()[candidate.node];
            match node.kind {
                LbvhNodeKind::Leaf { .. } => {
                    for &handle in self.tree.leaf_objects(node) {
                        let Some(bounds) = self.live_bounds(handle) else {
                            continue;
                        };
                        let Some((t_min, _)) = slab(bounds) else {
                            continue;
                        };
                        if best.is_some() && t_min > best_t + epsilon {
                            continue;
                        }
                        if let Some(t) = hit_test(handle, ray) {
                            if t < best_t {
                                best_t = t;
                                best = Some((handle, t));
                            }
                        }
                    }
                }
                LbvhNodeKind::Internal { left, right } => {
                    for child in [left, right] {
                        if let Some((t_min, _)) = slab(&self.tree.nodes()[child].bounds) {
                            if best.is_none() || t_min <= best_t + epsilon {
                                heap.push(NodeCandidate { t_min, node: child });
                            }
                        }
                    }
                }
            }
        }

        best
    }

    /// Every object passing `object_test` under nodes passing `node_test`
    ///
    /// The result holds each handle once, in traversal order.
    pub fn query_intersecting<N, O>(&self, mut node_test: N, mut object_test: O) -> Vec<H>
    where
        N: FnMut(&Aabb) -> bool,
        O: FnMut(H, &Aabb) -> bool,
    {
        let mut found = Vec::new();
        let Some(root) = self.tree.root() else {
            return found;
        };
        if !node_test(&root.bounds) {
            return found;
        }

        let mut seen = HashSet::new();
        let mut stack = vec![0_usize];
        while let Some(index) = stack.pop() {
            let node = &self.tree.nodes()[index];
            match node.kind {
                LbvhNodeKind::Internal { left, right } => {
                    for child in [left, right] {
                        if node_test(&self.tree.nodes()[child].bounds) {
                            stack.push(child);
                        }
                    }
                }
                LbvhNodeKind::Leaf { .. } => {
                    for &handle in self.tree.leaf_objects(node) {
                        let Some(bounds) = self.live_bounds(handle) else {
                            continue;
                        };
                        if object_test(handle, bounds) && seen.insert(handle) {
                            found.push(handle);
                        }
                    }
                }
            }
        }

        found
    }

    /// Objects whose cached AABB touches `volume`
    pub fn query_volume<V: QueryVolume>(&self, volume: &V) -> Vec<H> {
        self.query_intersecting(|node| volume.intersects_aabb(node), |_, bounds| volume.intersects_aabb(bounds))
    }
}
