//! ECS resources made available to systems.
//!
//! Overview
//! - `cacheconfig` – INI-backed settings of the composite cache
//! - `compositecache` – hash-keyed pool of composed sprite sheets
//! - `layerstore` – catalog of body, add-on and item layers
//! - `spritegrid` – ref-counted handles onto pooled sheets
pub mod cacheconfig;
pub mod compositecache;
pub mod layerstore;
pub mod spritegrid;
