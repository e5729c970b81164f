//! Pooled sprite grid handles.
//!
//! A [`SpriteGrid`] is a ref-counted handle onto one composed, bleed-fixed
//! sheet owned by the [`CompositeCache`]. Every handle for the same
//! composite hash shares the same [`GridShared`] wrapper and bitmap.
//! Dropping a handle (or calling [`SpriteGrid::release`]) gives its
//! reference back to the cache; cloning takes a new one.
//!
//! [`CompositeCache`]: crate::resources::compositecache::CompositeCache

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;

use crate::bitmap::{Bitmap, BitmapHandle, Rgba};
use crate::compose::{BLEED_GAP, FRAME_HEIGHT, FRAME_WIDTH};
use crate::resources::compositecache::CacheInner;
use crate::selection::{AnimState, CharacterSelection, Direction, FrameCell, StatueSelection};

/// Vertical distance between two grid rows in the bleed-fixed sheet.
pub const ROW_STRIDE: u32 = FRAME_HEIGHT + BLEED_GAP;

/// Pixel rectangle of one frame inside the grid bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The part of a grid shared by every handle of one cache entry.
#[derive(Debug)]
pub struct GridShared {
    key: String,
    bitmap: BitmapHandle,
    pixels_per_unit: f32,
}

impl GridShared {
    pub(crate) fn new(key: String, bitmap: BitmapHandle, pixels_per_unit: f32) -> Self {
        Self {
            key,
            bitmap,
            pixels_per_unit,
        }
    }
}

/// A handle onto a pooled sprite grid.
pub struct SpriteGrid {
    shared: Arc<GridShared>,
    generation: u64,
    cache: Weak<Mutex<CacheInner>>,
}

impl SpriteGrid {
    pub(crate) fn attached(
        shared: Arc<GridShared>,
        generation: u64,
        cache: Weak<Mutex<CacheInner>>,
    ) -> Self {
        Self {
            shared,
            generation,
            cache,
        }
    }

    /// Composite hash this grid was built from.
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Cache entry generation this handle belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The bleed-fixed 128×200 sheet.
    pub fn bitmap(&self) -> &Bitmap {
        &self.shared.bitmap
    }

    pub fn pixels_per_unit(&self) -> f32 {
        self.shared.pixels_per_unit
    }

    /// Whether two handles point at the same pooled grid.
    pub fn same_grid(&self, other: &SpriteGrid) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Whether releasing this handle still reaches a cache entry.
    pub fn is_attached(&self) -> bool {
        self.cache.strong_count() > 0
    }

    /// Pixel rectangle of `cell`.
    pub fn frame_rect(&self, cell: FrameCell) -> FrameRect {
        FrameRect {
            x: cell.column * FRAME_WIDTH,
            y: cell.row * ROW_STRIDE,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        }
    }

    /// Copy of the pixels of `cell`.
    pub fn frame_pixels(&self, cell: FrameCell) -> Bitmap {
        let rect = self.frame_rect(cell);
        let bitmap = self.bitmap();
        let mut out = Bitmap::new(rect.width, rect.height).with_format(bitmap.format());
        for y in 0..rect.height {
            for x in 0..rect.width {
                let px = bitmap
                    .get((rect.x + x) as i64, (rect.y + y) as i64)
                    .unwrap_or(Rgba::TRANSPARENT);
                out.set(x, y, px);
            }
        }
        out
    }

    /// Frame of a statue facing `direction`.
    pub fn statue_frame(&self, direction: Direction) -> FrameRect {
        self.frame_rect(StatueSelection.frame(direction))
    }

    /// Frame of a character `elapsed` seconds into `state`.
    pub fn character_frame(
        &self,
        selection: &CharacterSelection,
        state: AnimState,
        direction: Direction,
        elapsed: f32,
    ) -> FrameRect {
        self.frame_rect(selection.frame_at(state, direction, elapsed))
    }

    /// Give this handle's reference back to the cache.
    pub fn release(self) {
        drop(self);
    }
}

impl Clone for SpriteGrid {
    fn clone(&self) -> Self {
        let retained = match self.cache.upgrade() {
            Some(inner) => CacheInner::retain(&inner, self.key(), self.generation),
            None => false,
        };
        Self {
            shared: Arc::clone(&self.shared),
            generation: self.generation,
            cache: if retained {
                self.cache.clone()
            } else {
                Weak::new()
            },
        }
    }
}

impl Drop for SpriteGrid {
    fn drop(&mut self) {
        if let Some(inner) = self.cache.upgrade() {
            CacheInner::release(&inner, &self.shared.key, self.generation);
        }
    }
}

impl fmt::Debug for SpriteGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteGrid")
            .field("key", &self.shared.key)
            .field("generation", &self.generation)
            .field("pixels_per_unit", &self.shared.pixels_per_unit)
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detached(bitmap: Bitmap) -> SpriteGrid {
        let shared = Arc::new(GridShared::new("k".into(), bitmap.into_handle(), 32.0));
        SpriteGrid::attached(shared, 1, Weak::new())
    }

    #[test]
    fn test_frame_rect_uses_row_stride() {
        let grid = detached(Bitmap::new(128, 200));
        let rect = grid.frame_rect(FrameCell::new(2, 3));
        assert_eq!(
            rect,
            FrameRect {
                x: 64,
                y: 150,
                width: 32,
                height: 48
            }
        );
    }

    #[test]
    fn test_statue_frames_per_direction() {
        let grid = detached(Bitmap::new(128, 200));
        assert_eq!(grid.statue_frame(Direction::Up).y, 0);
        assert_eq!(grid.statue_frame(Direction::Left).y, 50);
        assert_eq!(grid.statue_frame(Direction::Right).y, 100);
        assert_eq!(grid.statue_frame(Direction::Down).y, 150);
    }

    #[test]
    fn test_frame_pixels_copies_cell() {
        let mut bmp = Bitmap::new(128, 200);
        bmp.fill_rect(32, 50, 32, 48, Rgba::opaque(5, 6, 7));
        let grid = detached(bmp);
        let px = grid.frame_pixels(FrameCell::new(1, 1));
        assert_eq!(px.size(), (32, 48));
        assert!(px.pixels().iter().all(|p| *p == Rgba::opaque(5, 6, 7)));
        let other = grid.frame_pixels(FrameCell::new(0, 1));
        assert!(other.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_detached_handle_clone_and_drop_are_noops() {
        let grid = detached(Bitmap::new(128, 200));
        assert!(!grid.is_attached());
        let copy = grid.clone();
        assert!(copy.same_grid(&grid));
        copy.release();
        grid.release();
    }
}
