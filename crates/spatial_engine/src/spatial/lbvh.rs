//! Linear bounding volume hierarchy
//!
//! Objects are sorted along a Morton curve and the sorted array is split at
//! its index midpoint until runs fit in a leaf. Nodes live in one flat array
//! in preorder; the whole array is replaced on every build.

use crate::physics::collision::Aabb;
use super::morton::morton_code;

/// Child links or object run of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LbvhNodeKind {
    /// Interior node with two children
    Internal {
        /// Index of the left child
        left: usize,
        /// Index of the right child
        right: usize,
    },
    /// Leaf covering `objects[first..first + count]`
    Leaf {
        /// Start of the run in the sorted object array
        first: usize,
        /// Run length
        count: usize,
    },
}

/// A hierarchy node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LbvhNode {
    /// Union of everything below this node
    pub bounds: Aabb,
    /// Children or object run
    pub kind: LbvhNodeKind,
}

impl LbvhNode {
    /// Is this a leaf?
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, LbvhNodeKind::Leaf { .. })
    }
}

/// Built hierarchy over handles of type `H`
#[derive(Debug, Clone)]
pub struct Lbvh<H> {
    nodes: Vec<LbvhNode>,
    objects: Vec<H>,
    codes: Vec<u32>,
}

impl<H> Default for Lbvh<H> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            objects: Vec::new(),
            codes: Vec::new(),
        }
    }
}

impl<H: Copy + Ord> Lbvh<H> {
    /// Build from `(handle, bounds)` pairs
    ///
    /// Ties in Morton code are broken by handle so the same input always
    /// yields the same tree. A `max_leaf_size` of zero is treated as one.
    pub fn build(items: &[(H, Aabb)], max_leaf_size: usize) -> Self {
        let Some(((_, first), rest)) = items.split_first() else {
            return Self::default();
        };

        let scene = rest.iter().fold(*first, |acc, (_, b)| acc.union(b));

        let mut sorted: Vec<(u32, H, Aabb)> = items
            .iter()
            .map(|(handle, bounds)| (morton_code(bounds.center(), &scene), *handle, *bounds))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let mut tree = Self {
            nodes: Vec::with_capacity(2 * items.len()),
            objects: sorted.iter().map(|(_, h, _)| *h).collect(),
            codes: sorted.iter().map(|(code, _, _)| *code).collect(),
        };
        let bounds: Vec<Aabb> = sorted.iter().map(|(_, _, b)| *b).collect();
        tree.build_range(&bounds, 0, bounds.len(), max_leaf_size.max(1));
        tree
    }

    fn build_range(&mut self, bounds: &[Aabb], start: usize, end: usize, max_leaf_size: usize) -> usize {
        let index = self.nodes.len();
        let count = end - start;

        if count <= max_leaf_size {
            let leaf_bounds = bounds[start + 1..end]
                .iter()
                .fold(bounds[start], |acc, b| acc.union(b));
            self.nodes.push(LbvhNode {
                bounds: leaf_bounds,
                kind: LbvhNodeKind::Leaf { first: start, count },
            });
            return index;
        }

        // Placeholder until both children exist
        self.nodes.push(LbvhNode {
            bounds: Aabb::default(),
            kind: LbvhNodeKind::Leaf { first: start, count: 0 },
        });

        let mid = start + count / 2;
        let left = self.build_range(bounds, start, mid, max_leaf_size);
        let right = self.build_range(bounds, mid, end, max_leaf_size);

        self.nodes[index] = LbvhNode {
            bounds: self.nodes[left].bounds.union(&self.nodes[right].bounds),
            kind: LbvhNodeKind::Internal { left, right },
        };
        index
    }
}

impl<H> Lbvh<H> {
    /// All nodes in preorder; the root is at index 0
    pub fn nodes(&self) -> &[LbvhNode] {
        &self.nodes
    }

    /// Root node, if any
    pub fn root(&self) -> Option<&LbvhNode> {
        self.nodes.first()
    }

    /// Handles in Morton order
    pub fn objects(&self) -> &[H] {
        &self.objects
    }

    /// Morton codes parallel to [`Self::objects`]
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Handles of a leaf's run (empty for internal nodes)
    pub fn leaf_objects(&self, node: &LbvhNode) -> &[H] {
        match node.kind {
            LbvhNodeKind::Leaf { first, count } => &self.objects[first..first + count],
            LbvhNodeKind::Internal { .. } => &[],
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of objects in the build
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// True when built from nothing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Scene bounds (root bounds)
    pub fn bounds(&self) -> Option<Aabb> {
        self.root().map(|n| n.bounds)
    }

    /// Depth a balanced tree with this many nodes would occupy
    pub fn max_occupied_depth(&self) -> usize {
        let n = self.nodes.len();
        if n == 0 {
            return 0;
        }
        // ceil(log2(n + 1)) for integers
        (usize::BITS - n.leading_zeros()) as usize
    }

    /// Actual depth of the deepest leaf (root = 1)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = Vec::new();
        if !self.nodes.is_empty() {
            stack.push((0, 1));
        }
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let LbvhNodeKind::Internal { left, right } = self.nodes[index].kind {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_items(rng: &mut StdRng, count: usize) -> Vec<(u32, Aabb)> {
        (0..count)
            .map(|i| {
                let center = Vec3::new(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                );
                let half = Vec3::new(rng.gen_range(0.0..5.0), rng.gen_range(0.0..5.0), rng.gen_range(0.0..5.0));
                (i as u32, Aabb::from_center_extents(center, half))
            })
            .collect()
    }

    fn assert_containment(tree: &Lbvh<u32>, items: &[(u32, Aabb)]) {
        for node in tree.nodes() {
            match node.kind {
                LbvhNodeKind::Internal { left, right } => {
                    assert!(node.bounds.contains(&tree.nodes()[left].bounds));
                    assert!(node.bounds.contains(&tree.nodes()[right].bounds));
                }
                LbvhNodeKind::Leaf { .. } => {
                    for handle in tree.leaf_objects(node) {
                        let (_, bounds) = items.iter().find(|(h, _)| h == handle).unwrap();
                        assert!(node.bounds.contains(bounds));
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_build() {
        let tree = Lbvh::<u32>::build(&[], 4);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.max_occupied_depth(), 0);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_single_object_is_one_leaf() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let tree = Lbvh::build(&[(7_u32, aabb)], 4);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.nodes()[0].is_leaf());
        assert_eq!(tree.bounds(), Some(aabb));
        assert_eq!(tree.leaf_objects(&tree.nodes()[0]), &[7]);
    }

    #[test]
    fn test_containment_invariant_random() {
        let mut rng = StdRng::seed_from_u64(42);
        for count in [1, 2, 5, 17, 64, 300] {
            for leaf in [1, 2, 4, 8] {
                let items = random_items(&mut rng, count);
                let tree = Lbvh::build(&items, leaf);
                assert_containment(&tree, &items);
                assert_eq!(tree.object_count(), count);
            }
        }
    }

    #[test]
    fn test_every_object_in_exactly_one_leaf() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = random_items(&mut rng, 123);
        let tree = Lbvh::build(&items, 3);

        let mut seen: Vec<u32> = tree
            .nodes()
            .iter()
            .flat_map(|n| tree.leaf_objects(n).iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..123).collect::<Vec<_>>());
        assert!(tree
            .nodes()
            .iter()
            .all(|n| !n.is_leaf() || tree.leaf_objects(n).len() <= 3));
    }

    #[test]
    fn test_codes_sorted() {
        let mut rng = StdRng::seed_from_u64(9);
        let tree = Lbvh::build(&random_items(&mut rng, 200), 4);
        assert!(tree.codes().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_build_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let items = random_items(&mut rng, 150);
        let mut shuffled = items.clone();
        shuffled.reverse();

        let a = Lbvh::build(&items, 4);
        let b = Lbvh::build(&shuffled, 4);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.objects(), b.objects());
    }

    #[test]
    fn test_index_median_keeps_tree_balanced() {
        // All objects stacked at one point still split evenly by index
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let items: Vec<(u32, Aabb)> = (0..64).map(|i| (i, aabb)).collect();
        let tree = Lbvh::build(&items, 1);
        assert_eq!(tree.node_count(), 127);
        assert_eq!(tree.depth(), 7);
        assert_eq!(tree.max_occupied_depth(), 7);
    }

    #[test]
    fn test_zero_leaf_size_treated_as_one() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let tree = Lbvh::build(&[(1_u32, aabb), (2, aabb)], 0);
        assert_eq!(tree.node_count(), 3);
    }
}
