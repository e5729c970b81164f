//! Paper-doll rendering component.
//!
//! Holds the sprite grid currently used to draw an entity and how frames
//! are picked from it. The grid handle is kept alive for as long as the
//! component exists; replacing or dropping it gives the reference back to
//! the [`CompositeCache`](crate::resources::compositecache::CompositeCache).

use bevy_ecs::prelude::Component;

use crate::resources::spritegrid::{FrameRect, SpriteGrid};
use crate::selection::{AnimState, CharacterSelection, Direction, StatueSelection};

/// How frames are selected from the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperDollKind {
    /// One still frame per direction.
    Statue,
    /// Idle frame plus a looping walk cycle.
    Character { frames_per_second: f32 },
}

#[derive(Component, Debug)]
pub struct PaperDoll {
    pub kind: PaperDollKind,
    pub grid: Option<SpriteGrid>,
}

impl PaperDoll {
    pub fn statue() -> Self {
        Self {
            kind: PaperDollKind::Statue,
            grid: None,
        }
    }

    pub fn character(frames_per_second: f32) -> Self {
        Self {
            kind: PaperDollKind::Character { frames_per_second },
            grid: None,
        }
    }

    /// Hash of the composite currently shown, if any.
    pub fn hash(&self) -> Option<&str> {
        self.grid.as_ref().map(|g| g.key())
    }

    /// Swap in a new grid, releasing the previous one.
    pub fn set_grid(&mut self, grid: SpriteGrid) {
        self.grid = Some(grid);
    }

    /// Frame to draw `elapsed` seconds into `state`, facing `direction`.
    /// Statues ignore the state and elapsed time.
    pub fn frame_rect(&self, state: AnimState, direction: Direction, elapsed: f32) -> Option<FrameRect> {
        let grid = self.grid.as_ref()?;
        let cell = match self.kind {
            PaperDollKind::Statue => StatueSelection.frame(direction),
            PaperDollKind::Character { frames_per_second } => {
                CharacterSelection::new(frames_per_second).frame_at(state, direction, elapsed)
            }
        };
        Some(grid.frame_rect(cell))
    }
}
