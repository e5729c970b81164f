//! Paper-doll refresh system.
//!
//! Rebuilds the sprite grid of every entity whose
//! [`Appearance`](crate::components::appearance::Appearance) was added or
//! changed since the last run (`Changed` also matches newly added ones).
//!
//! # Flow
//!
//! 1. The appearance is resolved against the [`LayerStore`] into a composite
//! 2. The [`CompositeCache`] hands back a grid for it (composing on a miss)
//! 3. The new grid replaces the one held by the [`PaperDoll`]; the old
//!    handle is released
//! 4. A [`PaperDollRefreshedEvent`] is triggered for the entity
//!
//! # Related
//!
//! - [`crate::components::paperdoll::PaperDoll`] – per-entity grid holder
//! - [`crate::resources::compositecache::CompositeCache`] – the grid pool

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::appearance::Appearance;
use crate::components::paperdoll::PaperDoll;
use crate::events::paperdoll::PaperDollRefreshedEvent;
use crate::resources::compositecache::CompositeCache;
use crate::resources::layerstore::LayerStore;

/// Refresh paper dolls whose appearance changed.
///
/// Contract
/// - Reads [`LayerStore`] and [`CompositeCache`].
/// - Mutates [`PaperDoll::grid`] only when the composite hash differs.
/// - Triggers [`PaperDollRefreshedEvent`] for each swapped grid.
pub fn refresh_paperdolls(
    mut query: Query<(Entity, &Appearance, &mut PaperDoll), Changed<Appearance>>,
    store: Res<LayerStore>,
    cache: Res<CompositeCache>,
    mut commands: Commands,
) {
    for (entity, appearance, mut doll) in query.iter_mut() {
        let composite = appearance.resolve(&store);
        let hash = composite.hash();
        if doll.hash() == Some(hash.as_str()) {
            continue;
        }

        let grid = cache.get(&composite);
        debug!("Paper doll {:?} now uses '{}'", entity, hash);
        doll.set_grid(grid);
        commands.trigger(PaperDollRefreshedEvent { entity, hash });
    }
}
