//! Paper-doll systems.
//!
//! Submodules overview
//! - [`paperdoll`] – rebuild sprite grids when appearances change

pub mod paperdoll;
