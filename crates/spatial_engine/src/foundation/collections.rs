//! Specialized collection types

use std::collections::HashSet;
use std::hash::Hash;

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to an object registered with the collision world.
    ///
    /// Keys carry a version, so a handle to a destroyed object never aliases
    /// a newer one; lookups through a stale handle simply miss.
    pub struct ObjectHandle;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<ObjectHandle, T>;

/// Unordered pair of handles.
///
/// Always stores the smaller handle first, so `(a, b)` and `(b, a)` hash and
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey<H> {
    /// Smaller handle
    pub first: H,
    /// Larger handle
    pub second: H,
}

impl<H: Ord> PairKey<H> {
    /// Create a pair key, normalizing the order
    pub fn new(a: H, b: H) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Per-tick set of pairs that have already been notified.
///
/// Cleared at the start of every tick. Both members of a pair detect the
/// same transition; only the first one to claim the pair fires callbacks.
#[derive(Debug, Clone)]
pub struct NotifiedPairs<H> {
    pairs: HashSet<PairKey<H>>,
}

impl<H: Copy + Eq + Hash + Ord> NotifiedPairs<H> {
    /// Create an empty guard
    pub fn new() -> Self {
        Self { pairs: HashSet::new() }
    }

    /// Forget every pair (start of tick)
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Claim a pair; returns `true` only the first time in this tick
    pub fn claim(&mut self, a: H, b: H) -> bool {
        self.pairs.insert(PairKey::new(a, b))
    }

    /// Whether the pair was already claimed this tick
    pub fn contains(&self, a: H, b: H) -> bool {
        self.pairs.contains(&PairKey::new(a, b))
    }

    /// Number of pairs claimed this tick
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing was claimed this tick
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<H: Copy + Eq + Hash + Ord> Default for NotifiedPairs<H> {
    fn default() -> Self {
        Self::new()
    }
}
