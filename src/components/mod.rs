//! ECS components for paper-doll entities.
//!
//! Submodules overview:
//! - [`appearance`] – editable part selection resolved into composites
//! - [`paperdoll`] – the sprite grid currently drawn for an entity

pub mod appearance;
pub mod paperdoll;
