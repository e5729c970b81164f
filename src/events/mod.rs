//! Event types triggered by the paper-doll systems.
//!
//! Submodules:
//! - [`paperdoll`] – a paper doll switched to a new sprite grid

pub mod paperdoll;
