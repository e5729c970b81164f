//! Appearance traits.
//!
//! A [`Trait`] pairs a stable identity string with the layer(s) that draw
//! it. Two traits with the same identity are interchangeable: the
//! identity, not the bitmap, is what the composite hash is built from.

use std::fmt;
use std::sync::Arc;

use crate::bitmap::LayerSource;

/// An immutable identity + layer(s) pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Trait {
    identity: Arc<str>,
    front: LayerSource,
    back: Option<LayerSource>,
}

impl Trait {
    /// A single-layer trait.
    pub fn new(identity: impl Into<Arc<str>>, front: LayerSource) -> Self {
        Self {
            identity: identity.into(),
            front,
            back: None,
        }
    }

    /// A hair trait with an optional tail drawn behind the body. Only the
    /// hair slot of a composite ever draws the back layer.
    pub fn hair(identity: impl Into<Arc<str>>, front: LayerSource, back: Option<LayerSource>) -> Self {
        Self {
            identity: identity.into(),
            front,
            back,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn front(&self) -> &LayerSource {
        &self.front
    }

    pub fn back(&self) -> Option<&LayerSource> {
        self.back.as_ref()
    }
}

impl fmt::Debug for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trait")
            .field("identity", &self.identity)
            .field("offset", &self.front.offset)
            .field("has_back", &self.back.is_some())
            .finish()
    }
}
