//! Paper-doll sprite-sheet compositor.
//!
//! Composes layered, multi-directional character sprite sheets (body, hair,
//! clothing, held items) into a single sheet in a fixed z-order, caches the
//! results by composite identity and exposes them as pooled sprite grids.
//!
//! # Layout
//!
//! - [`bitmap`] – RGBA bitmaps, shared handles and layer sources
//! - [`traits`] – identity + layer pairs for one body part
//! - [`composite`] – the simple and standard composite shapes and their hash
//! - [`compose`] – paste plan, direction masks, blending and bleed-fix
//! - [`selection`] – frame tables for statues and walking characters
//! - [`components`] – ECS components (appearance selection, paper doll)
//! - [`events`] – events triggered when a paper doll is refreshed
//! - [`resources`] – ECS resources (layer catalog, cache, configuration)
//! - [`systems`] – ECS systems keeping paper dolls in sync
//! - [`demo`] – synthetic layer catalog for tools and tests

pub mod bitmap;
pub mod components;
pub mod compose;
pub mod composite;
pub mod demo;
pub mod events;
pub mod resources;
pub mod selection;
pub mod systems;
pub mod traits;
