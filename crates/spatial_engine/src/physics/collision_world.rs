//! Collision world
//!
//! Owns the object registry and the broad-phase index. The per-tick
//! notified-pair guard belongs to the caller and is handed to each overlap
//! tick. A frame looks like:
//!
//! 1. objects move: [`CollisionWorld::set_transform`] refreshes their AABB in
//!    the index and marks it dirty
//! 2. [`CollisionWorld::flush_rebuild`] rebuilds the hierarchy once
//! 3. read-only queries: [`CollisionWorld::cull`], [`CollisionWorld::pick`],
//!    [`CollisionWorld::query_aabb`] and friends
//! 4. [`CollisionWorld::update_overlaps`] diffs this tick's overlaps against
//!    the last tick's, claims each changed pair in the guard and notifies a
//!    listener

use std::collections::HashSet;

use bitflags::bitflags;

use crate::config::SpatialConfig;
use crate::foundation::collections::{HandleMap, NotifiedPairs, ObjectHandle};
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::Transform;
use crate::spatial::{Frustum, SpatialIndex};
use super::collision::{Aabb, BoundingSphere, CollisionShape, Obb, Ray, RayHit};
use super::collision_layers::{CollisionLayers, CollisionResponse};
use super::narrow_phase::NarrowPhase;
use super::overlap::{OverlapListener, OverlapSets};

bitflags! {
    /// Lifecycle and behaviour flags of a collision object
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        /// Takes part in queries and overlap tests
        const ACTIVE = 1 << 0;
        /// Scheduled for destruction; treated as gone
        const PENDING_DESTROY = 1 << 1;
        /// Produces begin/end/hit notifications
        const GENERATE_OVERLAP_EVENTS = 1 << 2;
        /// Can be returned by ray picking
        const PICKABLE = 1 << 3;
    }
}

impl Default for ObjectFlags {
    fn default() -> Self {
        Self::ACTIVE | Self::GENERATE_OVERLAP_EVENTS | Self::PICKABLE
    }
}

/// Everything needed to spawn a collision object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionObjectDesc {
    /// Model-space shape
    pub shape: CollisionShape,
    /// Initial world transform
    pub transform: Transform,
    /// Layers the object belongs to
    pub layer: CollisionLayers,
    /// Layers the object accepts
    pub mask: CollisionLayers,
    /// Overlap or block
    pub response: CollisionResponse,
    /// Initial flags
    pub flags: ObjectFlags,
}

impl CollisionObjectDesc {
    /// Active, overlap-generating object on the default layer that accepts everything
    pub fn new(shape: CollisionShape, transform: Transform) -> Self {
        Self {
            shape,
            transform,
            layer: CollisionLayers::default(),
            mask: CollisionLayers::all(),
            response: CollisionResponse::default(),
            flags: ObjectFlags::default(),
        }
    }

    /// Set layer and mask
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Set the collision response
    pub fn with_response(mut self, response: CollisionResponse) -> Self {
        self.response = response;
        self
    }

    /// Replace the flags
    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A registered shape-bearing object
#[derive(Debug, Clone)]
pub struct CollisionObject {
    shape: CollisionShape,
    transform: Transform,
    layer: CollisionLayers,
    mask: CollisionLayers,
    response: CollisionResponse,
    flags: ObjectFlags,
    generation: u64,
    cached_bounds: Option<(Aabb, u64)>,
    overlaps: OverlapSets<ObjectHandle>,
    visible: bool,
}

impl CollisionObject {
    fn from_desc(desc: CollisionObjectDesc) -> Self {
        Self {
            shape: desc.shape,
            transform: desc.transform,
            layer: desc.layer,
            mask: desc.mask,
            response: desc.response,
            flags: desc.flags,
            generation: 0,
            cached_bounds: None,
            overlaps: OverlapSets::new(),
            visible: false,
        }
    }

    /// Model-space shape
    pub fn shape(&self) -> &CollisionShape {
        &self.shape
    }

    /// Current world transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Layers the object belongs to
    pub fn layer(&self) -> CollisionLayers {
        self.layer
    }

    /// Layers the object accepts
    pub fn mask(&self) -> CollisionLayers {
        self.mask
    }

    /// Overlap or block
    pub fn response(&self) -> CollisionResponse {
        self.response
    }

    /// Current flags
    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// Active and not pending destruction
    pub fn is_alive(&self) -> bool {
        self.flags.contains(ObjectFlags::ACTIVE) && !self.flags.contains(ObjectFlags::PENDING_DESTROY)
    }

    /// Takes part in this tick's overlap evaluation
    pub fn generates_overlap_events(&self) -> bool {
        self.is_alive() && self.flags.contains(ObjectFlags::GENERATE_OVERLAP_EVENTS)
    }

    /// Can be picked by rays
    pub fn is_pickable(&self) -> bool {
        self.is_alive() && self.flags.contains(ObjectFlags::PICKABLE)
    }

    /// Set by the last [`CollisionWorld::cull`]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Bumped on every transform change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cached world AABB if it is still current
    pub fn world_bounds(&self) -> Option<Aabb> {
        match self.cached_bounds {
            Some((bounds, generation)) if generation == self.generation => Some(bounds),
            _ => None,
        }
    }

    /// World AABB, recomputed only when the transform changed since the last call
    pub fn refresh_bounds(&mut self) -> Aabb {
        if let Some(bounds) = self.world_bounds() {
            return bounds;
        }
        let bounds = self.shape.world_aabb(&self.transform);
        self.cached_bounds = Some((bounds, self.generation));
        bounds
    }

    /// Objects overlapping this one as of the last tick
    pub fn current_overlaps(&self) -> &HashSet<ObjectHandle> {
        self.overlaps.current()
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Registry of collision objects plus the broad-phase index
#[derive(Debug)]
pub struct CollisionWorld {
    objects: HandleMap<CollisionObject>,
    index: SpatialIndex<ObjectHandle>,
    narrow_phase: NarrowPhase,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(&SpatialConfig::default())
    }
}

impl CollisionWorld {
    /// Create an empty world
    pub fn new(config: &SpatialConfig) -> Self {
        Self {
            objects: HandleMap::with_key(),
            index: SpatialIndex::new(config),
            narrow_phase: NarrowPhase::new(&config.narrow_phase),
        }
    }

    /// Register an object; it enters the index at the next rebuild
    pub fn spawn(&mut self, desc: CollisionObjectDesc) -> ObjectHandle {
        let handle = self.objects.insert(CollisionObject::from_desc(desc));
        self.sync_index(handle);
        handle
    }

    /// Register many objects and rebuild immediately
    pub fn bulk_spawn<I: IntoIterator<Item = CollisionObjectDesc>>(&mut self, descs: I) -> Vec<ObjectHandle> {
        let mut handles = Vec::new();
        let mut items = Vec::new();
        for desc in descs {
            let mut object = CollisionObject::from_desc(desc);
            let bounds = object.refresh_bounds();
            let alive = object.is_alive();
            let handle = self.objects.insert(object);
            if alive {
                items.push((handle, bounds));
            }
            handles.push(handle);
        }
        debug!("Bulk spawning {} objects ({} alive)", handles.len(), items.len());
        self.index.bulk_load(items);
        handles
    }

    /// Move an object; returns `false` for a stale handle
    pub fn set_transform(&mut self, handle: ObjectHandle, transform: Transform) -> bool {
        let Some(object) = self.objects.get_mut(handle) else {
            return false;
        };
        object.set_transform(transform);
        self.sync_index(handle);
        true
    }

    /// Activate or deactivate an object
    pub fn set_active(&mut self, handle: ObjectHandle, active: bool) -> bool {
        self.set_flag(handle, ObjectFlags::ACTIVE, active)
    }

    /// Toggle overlap notifications for an object
    pub fn set_generate_overlap_events(&mut self, handle: ObjectHandle, enabled: bool) -> bool {
        self.set_flag(handle, ObjectFlags::GENERATE_OVERLAP_EVENTS, enabled)
    }

    /// Toggle ray picking for an object
    pub fn set_pickable(&mut self, handle: ObjectHandle, pickable: bool) -> bool {
        self.set_flag(handle, ObjectFlags::PICKABLE, pickable)
    }

    /// Schedule an object for destruction
    ///
    /// It leaves the index right away; its pairs end at the next
    /// [`Self::update_overlaps`], with both sides notified.
    pub fn mark_pending_destroy(&mut self, handle: ObjectHandle) -> bool {
        self.set_flag(handle, ObjectFlags::PENDING_DESTROY, true)
    }

    /// Remove an object from the registry
    ///
    /// Surviving partners receive their end notification at the next
    /// [`Self::update_overlaps`]; the destroyed object receives nothing.
    pub fn destroy(&mut self, handle: ObjectHandle) -> Option<CollisionObject> {
        let object = self.objects.remove(handle)?;
        self.index.remove(handle);
        Some(object)
    }

    fn set_flag(&mut self, handle: ObjectHandle, flag: ObjectFlags, value: bool) -> bool {
        let Some(object) = self.objects.get_mut(handle) else {
            return false;
        };
        object.flags.set(flag, value);
        self.sync_index(handle);
        true
    }

    /// Push the object's current AABB into the index, or drop it from the
    /// index when it is inactive or pending destruction
    fn sync_index(&mut self, handle: ObjectHandle) {
        let Some(object) = self.objects.get_mut(handle) else {
            return;
        };
        if object.is_alive() {
            let bounds = object.refresh_bounds();
            self.index.update(handle, bounds);
        } else {
            self.index.remove(handle);
        }
    }

    /// Rebuild the hierarchy if anything moved; returns whether it rebuilt
    pub fn flush_rebuild(&mut self) -> bool {
        self.index.flush_rebuild()
    }

    /// Set each object's visibility flag from `frustum`; returns the visible handles
    pub fn cull(&mut self, frustum: &Frustum) -> Vec<ObjectHandle> {
        for (_, object) in &mut self.objects {
            object.visible = false;
        }

        let mut visible = Vec::new();
        let objects = &mut self.objects;
        self.index.query_frustum(frustum, |handle| {
            if let Some(object) = objects.get_mut(handle) {
                object.visible = true;
                visible.push(handle);
            }
        });
        visible
    }

    /// Closest pickable object along `ray`, using exact shape geometry
    ///
    /// `max_distance` seeds the search (a far clip plane, say); a non-positive
    /// or non-finite value means unbounded.
    pub fn pick(&self, ray: &Ray, max_distance: f32) -> Option<RayHit<ObjectHandle>> {
        let (handle, distance) = self.index.query_nearest_ray(ray, max_distance, |handle, ray| {
            let object = self.objects.get(handle)?;
            if !object.is_pickable() {
                return None;
            }
            object.shape.to_world_space(&object.transform).intersect_ray(ray)
        })?;

        Some(RayHit {
            handle,
            distance,
            point: ray.point_at(distance),
        })
    }

    /// Objects whose AABB touches `aabb`
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<ObjectHandle> {
        self.index.query_volume(aabb)
    }

    /// Objects whose AABB touches `obb`
    pub fn query_obb(&self, obb: &Obb) -> Vec<ObjectHandle> {
        self.index.query_volume(obb)
    }

    /// Objects whose AABB touches `sphere`
    pub fn query_sphere(&self, sphere: &BoundingSphere) -> Vec<ObjectHandle> {
        self.index.query_volume(sphere)
    }

    /// Run one overlap tick and notify `listener` of every transition
    ///
    /// Rebuilds first if the index is dirty. Each pair is tested once; each
    /// transition is delivered to both objects, and at most once per tick.
    /// `notified` is the tick's pair guard: it is cleared on entry and holds
    /// every pair that changed state on return, which is also the count
    /// returned.
    pub fn update_overlaps<L: OverlapListener<ObjectHandle>>(
        &mut self,
        notified: &mut NotifiedPairs<ObjectHandle>,
        listener: &mut L,
    ) -> usize {
        self.index.flush_rebuild();
        notified.clear();

        for (_, object) in &mut self.objects {
            object.overlaps.begin_tick();
        }

        let participants: Vec<(ObjectHandle, Aabb)> = self
            .objects
            .iter()
            .filter(|(_, object)| object.generates_overlap_events())
            .filter_map(|(handle, _)| self.index.cached_bounds(&handle).map(|b| (handle, *b)))
            .collect();

        let mut pairs = Vec::new();
        for (handle, bounds) in &participants {
            let Some(object) = self.objects.get(*handle) else {
                continue;
            };
            for other_handle in self.index.query_volume(bounds) {
                // Each unordered pair is tested from its smaller handle only
                if other_handle <= *handle {
                    continue;
                }
                let Some(other) = self.objects.get(other_handle) else {
                    continue;
                };
                if !other.generates_overlap_events()
                    || !CollisionLayers::should_collide(object.layer, object.mask, other.layer, other.mask)
                {
                    continue;
                }
                if self.narrow_phase.overlaps(&object.shape, &object.transform, &other.shape, &other.transform) {
                    pairs.push((*handle, other_handle));
                }
            }
        }

        for (a, b) in pairs {
            if let Some(object) = self.objects.get_mut(a) {
                object.overlaps.insert(b);
            }
            if let Some(object) = self.objects.get_mut(b) {
                object.overlaps.insert(a);
            }
        }

        let mut began = Vec::new();
        let mut ended = Vec::new();
        for (handle, object) in &self.objects {
            for other in object.overlaps.began() {
                if notified.claim(handle, other) {
                    began.push((handle, other));
                }
            }
            for other in object.overlaps.ended() {
                if notified.claim(handle, other) {
                    ended.push((handle, other));
                }
            }
        }

        for &(a, b) in &began {
            trace!("Overlap began between {a:?} and {b:?}");
            self.notify_both(a, b, |l, this, other| l.on_begin_overlap(this, other), listener);
            if self.is_blocking_pair(a, b) {
                self.notify_both(a, b, |l, this, other| l.on_hit(this, other), listener);
            }
        }
        for &(a, b) in &ended {
            trace!("Overlap ended between {a:?} and {b:?}");
            self.notify_both(a, b, |l, this, other| l.on_end_overlap(this, other), listener);
        }

        began.len() + ended.len()
    }

    /// Deliver to each side of the pair that still exists
    fn notify_both<L, F>(&self, a: ObjectHandle, b: ObjectHandle, mut notify: F, listener: &mut L)
    where
        L: OverlapListener<ObjectHandle>,
        F: FnMut(&mut L, ObjectHandle, ObjectHandle),
    {
        if self.objects.contains_key(a) {
            notify(listener, a, b);
        }
        if self.objects.contains_key(b) {
            notify(listener, b, a);
        }
    }

    fn is_blocking_pair(&self, a: ObjectHandle, b: ObjectHandle) -> bool {
        match (self.objects.get(a), self.objects.get(b)) {
            (Some(a), Some(b)) => CollisionResponse::is_blocking_pair(a.response, b.response),
            _ => false,
        }
    }

    /// Were `a` and `b` overlapping at the last tick?
    pub fn is_overlapping(&self, a: ObjectHandle, b: ObjectHandle) -> bool {
        self.objects.get(a).is_some_and(|object| object.overlaps.contains(b))
    }

    /// Objects overlapping `handle` at the last tick
    pub fn overlapping_with(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.objects
            .get(handle)
            .map(|object| object.current_overlaps().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Current world AABB of an object, recomputed only if it moved
    pub fn world_bounds(&mut self, handle: ObjectHandle) -> Option<Aabb> {
        self.objects.get_mut(handle).map(CollisionObject::refresh_bounds)
    }

    /// Look up an object
    pub fn get(&self, handle: ObjectHandle) -> Option<&CollisionObject> {
        self.objects.get(handle)
    }

    /// Is `handle` registered?
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(handle)
    }

    /// Iterate registered objects
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &CollisionObject)> {
        self.objects.iter()
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The broad-phase index
    pub fn index(&self) -> &SpatialIndex<ObjectHandle> {
        &self.index
    }
}
