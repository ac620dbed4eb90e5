//! Overlap state tracking and event delivery
//!
//! Each object keeps the set of objects it overlapped last tick and the set it
//! overlaps now. Diffing the two yields begin and end transitions.

use std::collections::HashSet;
use std::hash::Hash;

/// Per-object overlap sets
#[derive(Debug, Clone)]
pub struct OverlapSets<H> {
    now: HashSet<H>,
    previous: HashSet<H>,
}

impl<H> Default for OverlapSets<H> {
    fn default() -> Self {
        Self {
            now: HashSet::new(),
            previous: HashSet::new(),
        }
    }
}

impl<H: Copy + Eq + Hash> OverlapSets<H> {
    /// Create empty sets
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the current set into `previous` and start an empty current set
    pub fn begin_tick(&mut self) {
        self.previous = std::mem::take(&mut self.now);
    }

    /// Record an overlap for this tick
    pub fn insert(&mut self, other: H) {
        self.now.insert(other);
    }

    /// Objects overlapping this tick
    pub fn current(&self) -> &HashSet<H> {
        &self.now
    }

    /// Is `other` overlapping this tick?
    pub fn contains(&self, other: H) -> bool {
        self.now.contains(&other)
    }

    /// Present now but not last tick
    pub fn began(&self) -> impl Iterator<Item = H> + '_ {
        self.now.difference(&self.previous).copied()
    }

    /// Present last tick but not now
    pub fn ended(&self) -> impl Iterator<Item = H> + '_ {
        self.previous.difference(&self.now).copied()
    }
}

/// Kind of overlap transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapEventKind {
    /// Pair started overlapping
    Begin,
    /// Pair stopped overlapping
    End,
    /// Blocking pair started overlapping
    Hit,
}

/// A single delivered notification, from the point of view of `this`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlapEvent<H> {
    /// Transition kind
    pub kind: OverlapEventKind,
    /// Object receiving the notification
    pub this: H,
    /// The other object of the pair
    pub other: H,
}

/// Receives overlap notifications
///
/// Each transition is delivered to both objects, so a begin between A and B
/// produces `on_begin_overlap(A, B)` and `on_begin_overlap(B, A)`.
pub trait OverlapListener<H> {
    /// Pair started overlapping
    fn on_begin_overlap(&mut self, _this: H, _other: H) {}

    /// Pair stopped overlapping
    fn on_end_overlap(&mut self, _this: H, _other: H) {}

    /// Blocking pair started overlapping
    fn on_hit(&mut self, _this: H, _other: H) {}
}

/// Listener that ignores everything
impl<H> OverlapListener<H> for () {}

/// Records every notification in delivery order
#[derive(Debug, Clone)]
pub struct OverlapEventLog<H> {
    events: Vec<OverlapEvent<H>>,
}

impl<H> Default for OverlapEventLog<H> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<H: Copy + Eq> OverlapEventLog<H> {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events
    pub fn events(&self) -> &[OverlapEvent<H>] {
        &self.events
    }

    /// Number of events of `kind`
    pub fn count(&self, kind: OverlapEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Number of events of `kind` delivered to `this` about `other`
    pub fn count_for(&self, kind: OverlapEventKind, this: H, other: H) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == kind && e.this == this && e.other == other)
            .count()
    }

    /// Take the recorded events, leaving the log empty
    pub fn drain(&mut self) -> Vec<OverlapEvent<H>> {
        std::mem::take(&mut self.events)
    }

    /// Forget all events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Is the log empty?
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push(&mut self, kind: OverlapEventKind, this: H, other: H) {
        self.events.push(OverlapEvent { kind, this, other });
    }
}

impl<H: Copy + Eq> OverlapListener<H> for OverlapEventLog<H> {
    fn on_begin_overlap(&mut self, this: H, other: H) {
        self.push(OverlapEventKind::Begin, this, other);
    }

    fn on_end_overlap(&mut self, this: H, other: H) {
        self.push(OverlapEventKind::End, this, other);
    }

    fn on_hit(&mut self, this: H, other: H) {
        self.push(OverlapEventKind::Hit, this, other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_end_diff() {
        let mut sets = OverlapSets::new();
        sets.begin_tick();
        sets.insert(1_u32);
        sets.insert(2);
        assert_eq!(sets.began().count(), 2);
        assert_eq!(sets.ended().count(), 0);

        sets.begin_tick();
        sets.insert(2);
        assert_eq!(sets.began().count(), 0);
        assert_eq!(sets.ended().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_steady_state_produces_nothing() {
        let mut sets = OverlapSets::new();
        for _ in 0..5 {
            sets.begin_tick();
            sets.insert(7_u32);
        }
        assert_eq!(sets.began().count(), 0);
        assert_eq!(sets.ended().count(), 0);
        assert!(sets.contains(7));
    }

    #[test]
    fn test_event_log_counts() {
        let mut log = OverlapEventLog::new();
        log.on_begin_overlap(1_u32, 2);
        log.on_begin_overlap(2, 1);
        log.on_hit(1, 2);
        assert_eq!(log.count(OverlapEventKind::Begin), 2);
        assert_eq!(log.count_for(OverlapEventKind::Hit, 1, 2), 1);
        assert_eq!(log.drain().len(), 3);
        assert!(log.is_empty());
    }
}
