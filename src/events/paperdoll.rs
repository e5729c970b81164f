//! Paper-doll refresh events.
//!
//! After [`refresh_paperdolls`](crate::systems::paperdoll::refresh_paperdolls)
//! swaps the sprite grid of an entity, a [`PaperDollRefreshedEvent`] is
//! triggered carrying the hash of the composite now shown.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<PaperDollRefreshedEvent>| {
//!     log::info!("{:?} now wears {}", trigger.event().entity, trigger.event().hash);
//! });
//! ```

use bevy_ecs::prelude::*;

/// Event emitted when a paper doll gets a new sprite grid.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct PaperDollRefreshedEvent {
    /// The entity whose paper doll changed.
    pub entity: Entity,
    /// Composite hash of the new grid.
    pub hash: String,
}
