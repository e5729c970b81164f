//! Composite texture cache.
//!
//! Memoizes composed sheets by [`Composite::hash`] and hands out
//! ref-counted [`SpriteGrid`] handles onto them. When the last handle of a
//! key is released the entry is not destroyed right away: it moves to a
//! bounded FIFO grace queue from which a later `get` can resurrect it.
//! When the queue is full, the oldest graced entry is destroyed to make
//! room.
//!
//! All bookkeeping lives behind one mutex. Composition itself runs
//! outside the lock; if two callers race on the same miss, the first
//! insert wins and the other bitmap is discarded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::bitmap::PixelFormat;
use crate::compose::{ComposePath, DirectionMasks, compose_sheet};
use crate::composite::{Composite, SimpleComposite, StandardComposite};
use crate::resources::cacheconfig::CacheConfig;
use crate::resources::spritegrid::{GridShared, SpriteGrid};

/// Counters describing cache activity since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// `get` calls served from an existing entry (live or graced).
    pub hits: u64,
    /// `get` calls that composed a new sheet.
    pub misses: u64,
    /// Hits that pulled an entry back out of the grace queue.
    pub resurrections: u64,
    /// Graced entries destroyed because the queue was full.
    pub evictions: u64,
    /// Bitmaps destroyed for any reason.
    pub destroyed: u64,
}

impl CacheStats {
    /// Hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Live { refs: usize },
    Graced,
}

#[derive(Debug)]
struct Entry {
    generation: u64,
    grid: Arc<GridShared>,
    state: EntryState,
}

/// Mutable cache state shared with every handle.
#[derive(Debug, Default)]
pub struct CacheInner {
    entries: FxHashMap<String, Entry>,
    grace: VecDeque<String>,
    capacity: usize,
    next_generation: u64,
    stats: CacheStats,
}

fn lock(inner: &Mutex<CacheInner>) -> MutexGuard<'_, CacheInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CacheInner {
    /// Take one more reference on a live entry. Returns false for stale
    /// generations or entries that are not live.
    pub(crate) fn retain(inner: &Mutex<CacheInner>, key: &str, generation: u64) -> bool {
        let mut state = lock(inner);
        match state.entries.get_mut(key) {
            Some(Entry {
                generation: g,
                state: EntryState::Live { refs },
                ..
            }) if *g == generation => {
                *refs += 1;
                true
            }
            _ => {
                warn!("Ignoring retain of stale sprite grid '{}' (gen {})", key, generation);
                false
            }
        }
    }

    /// Give back one reference. At zero refs the entry is graced, or
    /// destroyed when the grace queue has no capacity.
    pub(crate) fn release(inner: &Mutex<CacheInner>, key: &str, generation: u64) {
        let mut state = lock(inner);
        let refs = match state.entries.get_mut(key) {
            Some(Entry {
                generation: g,
                state: EntryState::Live { refs },
                ..
            }) if *g == generation => {
                *refs -= 1;
                *refs
            }
            _ => {
                warn!("Ignoring release of stale sprite grid '{}' (gen {})", key, generation);
                return;
            }
        };
        if refs > 0 {
            return;
        }

        if state.capacity == 0 {
            state.entries.remove(key);
            state.stats.destroyed += 1;
            debug!("Destroyed composite '{}' (no grace queue)", key);
            return;
        }

        if state.grace.len() >= state.capacity
            && let Some(oldest) = state.grace.pop_front()
        {
            state.entries.remove(&oldest);
            state.stats.evictions += 1;
            state.stats.destroyed += 1;
            debug!("Evicted composite '{}'", oldest);
        }

        if let Some(entry) = state.entries.get_mut(key) {
            entry.state = EntryState::Graced;
        }
        state.grace.push_back(key.to_string());
        debug!("Composite '{}' entered grace queue", key);
    }

    fn acquire(&mut self, key: &str) -> Option<(Arc<GridShared>, u64)> {
        let entry = self.entries.get_mut(key)?;
        match entry.state {
            EntryState::Live { ref mut refs } => *refs += 1,
            EntryState::Graced => {
                entry.state = EntryState::Live { refs: 1 };
                if let Some(pos) = self.grace.iter().position(|k| k == key) {
                    self.grace.remove(pos);
                }
                self.stats.resurrections += 1;
                debug!("Resurrected composite '{}'", key);
            }
        }
        self.stats.hits += 1;
        Some((Arc::clone(&entry.grid), entry.generation))
    }
}

/// Hash-keyed pool of composed sprite grids.
#[derive(Resource, Debug)]
pub struct CompositeCache {
    inner: Arc<Mutex<CacheInner>>,
    masks: DirectionMasks,
    pixels_per_unit: f32,
    path: ComposePath,
    format: PixelFormat,
}

impl Default for CompositeCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl CompositeCache {
    /// Cache with the given grace queue size (negative sizes behave like 0)
    /// and default settings otherwise.
    pub fn new(grace_queue_size: i32) -> Self {
        Self::from_config(&CacheConfig {
            grace_queue_size,
            ..CacheConfig::default()
        })
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::from_config_with_masks(config, DirectionMasks::standard())
    }

    /// Cache composing with custom direction masks. The masks are fixed for
    /// the cache's lifetime since they are not part of the entry key.
    pub fn from_config_with_masks(config: &CacheConfig, masks: DirectionMasks) -> Self {
        let inner = CacheInner {
            capacity: config.grace_capacity(),
            ..Default::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            masks,
            pixels_per_unit: config.pixels_per_unit,
            path: config.compose_path(),
            format: config.output_format,
        }
    }

    /// Get a handle onto the grid for `composite`, composing it on a miss.
    pub fn get(&self, composite: &Composite) -> SpriteGrid {
        let key = composite.hash();

        if let Some((grid, generation)) = lock(&self.inner).acquire(&key) {
            debug!("Cache hit for '{}'", key);
            return self.handle(grid, generation);
        }

        let bitmap = compose_sheet(composite, &self.masks, self.path, self.format);

        let mut state = lock(&self.inner);
        if let Some((grid, generation)) = state.acquire(&key) {
            debug!("Discarding duplicate composition of '{}'", key);
            drop(state);
            return self.handle(grid, generation);
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        let grid = Arc::new(GridShared::new(
            key.clone(),
            bitmap.into_handle(),
            self.pixels_per_unit,
        ));
        state.entries.insert(
            key.clone(),
            Entry {
                generation,
                grid: Arc::clone(&grid),
                state: EntryState::Live { refs: 1 },
            },
        );
        state.stats.misses += 1;
        drop(state);
        debug!("Composed '{}' (gen {})", key, generation);

        self.handle(grid, generation)
    }

    pub fn get_simple(&self, composite: SimpleComposite) -> SpriteGrid {
        self.get(&Composite::Simple(composite))
    }

    pub fn get_standard(&self, composite: StandardComposite) -> SpriteGrid {
        self.get(&Composite::Standard(composite))
    }

    fn handle(&self, grid: Arc<GridShared>, generation: u64) -> SpriteGrid {
        SpriteGrid::attached(grid, generation, Arc::downgrade(&self.inner))
    }

    /// Destroy every pooled bitmap, live or graced. Outstanding handles
    /// stay readable; releasing them afterwards does nothing.
    pub fn shutdown(&self) {
        let mut state = lock(&self.inner);
        let count = state.entries.len();
        state.entries.clear();
        state.grace.clear();
        state.stats.destroyed += count as u64;
        info!("Composite cache shut down, destroyed {} entries", count);
    }

    pub fn stats(&self) -> CacheStats {
        lock(&self.inner).stats
    }

    /// Entries with at least one outstanding handle.
    pub fn live_count(&self) -> usize {
        lock(&self.inner)
            .entries
            .values()
            .filter(|e| matches!(e.state, EntryState::Live { .. }))
            .count()
    }

    /// Entries waiting in the grace queue.
    pub fn graced_count(&self) -> usize {
        lock(&self.inner).grace.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.inner).entries.contains_key(key)
    }

    /// Outstanding handles for `key`; 0 when graced or absent.
    pub fn ref_count(&self, key: &str) -> usize {
        match lock(&self.inner).entries.get(key).map(|e| e.state) {
            Some(EntryState::Live { refs }) => refs,
            _ => 0,
        }
    }

    pub fn grace_capacity(&self) -> usize {
        lock(&self.inner).capacity
    }

    pub fn pixels_per_unit(&self) -> f32 {
        self.pixels_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, LayerSource, Rgba};
    use crate::composite::BaseTraits;
    use crate::traits::Trait;

    fn body(id: &str) -> SimpleComposite {
        let layer = LayerSource::new(Bitmap::filled(128, 192, Rgba::opaque(9, 9, 9)).into_handle());
        SimpleComposite {
            base: BaseTraits {
                body: Some(Trait::new(id, layer)),
                ..Default::default()
            },
            cloth: None,
        }
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = CompositeCache::new(4);
        let a = cache.get_simple(body("a"));
        let b = cache.get_simple(body("a"));
        assert!(a.same_grid(&b));
        assert_eq!(cache.ref_count(a.key()), 2);
        let stats = cache.stats();
        assert_eq!((stats.misses, stats.hits), (1, 1));
        assert_eq!(a.bitmap().size(), (128, 200));
    }

    #[test]
    fn test_release_moves_to_grace() {
        let cache = CompositeCache::new(4);
        let a = cache.get_simple(body("a"));
        let key = a.key().to_string();
        a.release();
        assert!(cache.contains(&key));
        assert_eq!(cache.graced_count(), 1);
        assert_eq!(cache.live_count(), 0);
        assert_eq!(cache.ref_count(&key), 0);
    }

    #[test]
    fn test_zero_capacity_destroys_immediately() {
        let cache = CompositeCache::new(0);
        let a = cache.get_simple(body("a"));
        let key = a.key().to_string();
        drop(a);
        assert!(!cache.contains(&key));
        assert_eq!(cache.stats().destroyed, 1);
    }

    #[test]
    fn test_negative_capacity_behaves_like_zero() {
        let cache = CompositeCache::new(-3);
        assert_eq!(cache.grace_capacity(), 0);
        let a = cache.get_simple(body("a"));
        let key = a.key().to_string();
        drop(a);
        assert!(!cache.contains(&key));
    }

    #[test]
    fn test_clone_takes_reference() {
        let cache = CompositeCache::new(2);
        let a = cache.get_simple(body("a"));
        let b = a.clone();
        assert_eq!(cache.ref_count(a.key()), 2);
        drop(b);
        assert_eq!(cache.ref_count(a.key()), 1);
    }

    #[test]
    fn test_release_after_shutdown_is_noop() {
        let cache = CompositeCache::new(2);
        let a = cache.get_simple(body("a"));
        cache.shutdown();
        assert_eq!(cache.stats().destroyed, 1);
        assert_eq!(a.bitmap().size(), (128, 200));
        a.release();
        assert_eq!(cache.graced_count(), 0);
        assert_eq!(cache.stats().destroyed, 1);
    }

    #[test]
    fn test_stale_handle_does_not_touch_new_entry() {
        let cache = CompositeCache::new(2);
        let old = cache.get_simple(body("a"));
        cache.shutdown();
        let fresh = cache.get_simple(body("a"));
        assert_ne!(old.generation(), fresh.generation());
        drop(old);
        assert_eq!(cache.ref_count(fresh.key()), 1);
    }

    #[test]
    fn test_custom_masks_apply_to_every_composition() {
        let blank = || Bitmap::new(128, 192);
        let masks = DirectionMasks::new(blank(), blank(), blank(), blank()).unwrap();
        let cache = CompositeCache::from_config_with_masks(&CacheConfig::default(), masks);
        let layer = LayerSource::new(Bitmap::filled(128, 192, Rgba::opaque(9, 9, 9)).into_handle());
        let cloaked = StandardComposite {
            cloak: Some(Trait::new("k", layer)),
            ..Default::default()
        };
        let with_standard_masks = Composite::Standard(cloaked.clone());

        let first = cache.get_standard(cloaked.clone());
        assert!(first.bitmap().pixels().iter().all(|p| p.a == 0));
        first.release();
        let again = cache.get_standard(cloaked);
        assert!(again.bitmap().pixels().iter().all(|p| p.a == 0));
        assert_eq!(cache.stats().resurrections, 1);

        let standard = CompositeCache::new(2);
        let cloaked = standard.get(&with_standard_masks);
        assert!(cloaked.bitmap().pixels().iter().any(|p| p.a == 255));
    }

    #[test]
    fn test_handles_outlive_cache() {
        let cache = CompositeCache::new(2);
        let a = cache.get_simple(body("a"));
        drop(cache);
        assert!(!a.is_attached());
        assert_eq!(a.bitmap().size(), (128, 200));
    }
}
