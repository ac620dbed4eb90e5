//! Collision layer filtering and response
//!
//! Every object carries the layers it belongs to and a mask of the layers it
//! accepts. A pair is only tested when each side accepts the other.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct CollisionLayers: u32 {
        /// Static world geometry
        const WORLD_STATIC = 1 << 0;
        /// Moving world geometry
        const WORLD_DYNAMIC = 1 << 1;
        /// Player or AI controlled characters
        const PAWN = 1 << 2;
        /// Projectiles
        const PROJECTILE = 1 << 3;
        /// Trigger volumes
        const TRIGGER = 1 << 4;
        /// Pickups and collectibles
        const PICKUP = 1 << 5;
        /// Loose physics debris
        const DEBRIS = 1 << 6;
        /// Vehicles
        const VEHICLE = 1 << 7;

        // Bits 8-31 are free for game-specific layers
        const _ = !0;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::WORLD_DYNAMIC
    }
}

impl CollisionLayers {
    /// Check if two objects should collide based on their layers and masks
    ///
    /// # Example
    /// ```
    /// use spatial_engine::physics::CollisionLayers;
    ///
    /// let accepts_pawns = CollisionLayers::PAWN;
    /// assert!(CollisionLayers::should_collide(
    ///     CollisionLayers::TRIGGER, accepts_pawns,
    ///     CollisionLayers::PAWN, CollisionLayers::all(),
    /// ));
    /// ```
    pub fn should_collide(
        layer_a: CollisionLayers,
        mask_a: CollisionLayers,
        layer_b: CollisionLayers,
        mask_b: CollisionLayers,
    ) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

/// How an object reacts when another object overlaps it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionResponse {
    /// Report begin/end overlap only
    #[default]
    Overlap,
    /// Also report a hit when the other side blocks too
    Block,
}

impl CollisionResponse {
    /// A pair blocks only when both sides block
    pub fn is_blocking_pair(a: CollisionResponse, b: CollisionResponse) -> bool {
        a == CollisionResponse::Block && b == CollisionResponse::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutual_acceptance_required() {
        let layer_a = CollisionLayers::PROJECTILE;
        let mask_a = CollisionLayers::PAWN;
        let layer_b = CollisionLayers::PAWN;

        assert!(CollisionLayers::should_collide(layer_a, mask_a, layer_b, CollisionLayers::all()));
        assert!(!CollisionLayers::should_collide(layer_a, mask_a, layer_b, CollisionLayers::TRIGGER));
    }

    #[test]
    fn test_empty_mask_collides_with_nothing() {
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PAWN,
            CollisionLayers::empty(),
            CollisionLayers::PAWN,
            CollisionLayers::all(),
        ));
    }

    #[test]
    fn test_custom_bits_are_retained() {
        let custom = CollisionLayers::from_bits_retain(1 << 20);
        assert!(CollisionLayers::should_collide(custom, custom, custom, custom));
    }

    #[test]
    fn test_blocking_pair() {
        assert!(CollisionResponse::is_blocking_pair(CollisionResponse::Block, CollisionResponse::Block));
        assert!(!CollisionResponse::is_blocking_pair(CollisionResponse::Block, CollisionResponse::Overlap));
    }
}
