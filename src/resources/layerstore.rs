//! Layer catalog.
//!
//! Registry of the decoded sprite-sheet layers a game ships with, keyed by
//! sex, part category, style index and color. Appearances are resolved
//! against it; a missing layer just leaves its slot unset.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::bitmap::LayerSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn name(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

/// Skin tones of the body layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyColor {
    Black,
    Blue,
    Green,
    Orange,
    Purple,
    Red,
    #[default]
    White,
    Yellow,
}

impl BodyColor {
    pub const ALL: [BodyColor; 8] = [
        BodyColor::Black,
        BodyColor::Blue,
        BodyColor::Green,
        BodyColor::Orange,
        BodyColor::Purple,
        BodyColor::Red,
        BodyColor::White,
        BodyColor::Yellow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BodyColor::Black => "Black",
            BodyColor::Blue => "Blue",
            BodyColor::Green => "Green",
            BodyColor::Orange => "Orange",
            BodyColor::Purple => "Purple",
            BodyColor::Red => "Red",
            BodyColor::White => "White",
            BodyColor::Yellow => "Yellow",
        }
    }
}

/// Color variations available for every add-on style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddOnColor {
    #[default]
    Black,
    Blue,
    DarkBrown,
    Green,
    LightBrown,
    Pink,
    Purple,
    Red,
    White,
    Yellow,
}

impl AddOnColor {
    pub const ALL: [AddOnColor; 10] = [
        AddOnColor::Black,
        AddOnColor::Blue,
        AddOnColor::DarkBrown,
        AddOnColor::Green,
        AddOnColor::LightBrown,
        AddOnColor::Pink,
        AddOnColor::Purple,
        AddOnColor::Red,
        AddOnColor::White,
        AddOnColor::Yellow,
    ];

    /// Name used in trait identities.
    pub fn name(&self) -> &'static str {
        match self {
            AddOnColor::Black => "Black",
            AddOnColor::Blue => "Blue",
            AddOnColor::DarkBrown => "DarkBrown",
            AddOnColor::Green => "Green",
            AddOnColor::LightBrown => "LightBrown",
            AddOnColor::Pink => "Pink",
            AddOnColor::Purple => "Purple",
            AddOnColor::Red => "Red",
            AddOnColor::White => "White",
            AddOnColor::Yellow => "Yellow",
        }
    }

    /// Short name used in asset file names.
    pub fn short_name(&self) -> &'static str {
        match self {
            AddOnColor::Black => "black",
            AddOnColor::Blue => "blue",
            AddOnColor::DarkBrown => "dbrown",
            AddOnColor::Green => "green",
            AddOnColor::LightBrown => "lbrown",
            AddOnColor::Pink => "pink",
            AddOnColor::Purple => "purple",
            AddOnColor::Red => "red",
            AddOnColor::White => "white",
            AddOnColor::Yellow => "yellow",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        AddOnColor::ALL
            .into_iter()
            .find(|c| c.short_name() == name)
    }
}

/// Colored add-on categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddOnType {
    Boots,
    Pants,
    Shirt,
    Chest,
    LongShirt,
    Arms,
    Waist,
    Shoulder,
    Cloth,
    Hair,
    HairTail,
    Hat,
    Cloak,
}

/// Colorless item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Necklace,
    SkilledHandItem,
    DumbHandItem,
}

impl ItemType {
    /// Identity prefix of items of this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            ItemType::Necklace => "nkl",
            ItemType::SkilledHandItem => "shi",
            ItemType::DumbHandItem => "dhi",
        }
    }
}

/// Registry of catalog layers.
#[derive(Resource, Debug, Default)]
pub struct LayerStore {
    bodies: FxHashMap<(Sex, BodyColor), LayerSource>,
    add_ons: FxHashMap<(Sex, AddOnType, u16, AddOnColor), LayerSource>,
    items: FxHashMap<(ItemType, u16), LayerSource>,
}

impl LayerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_body(&mut self, sex: Sex, color: BodyColor, layer: LayerSource) {
        self.bodies.insert((sex, color), layer);
    }

    pub fn insert_add_on(
        &mut self,
        sex: Sex,
        kind: AddOnType,
        index: u16,
        color: AddOnColor,
        layer: LayerSource,
    ) {
        self.add_ons.insert((sex, kind, index, color), layer);
    }

    pub fn insert_item(&mut self, kind: ItemType, index: u16, layer: LayerSource) {
        self.items.insert((kind, index), layer);
    }

    pub fn body(&self, sex: Sex, color: BodyColor) -> Option<&LayerSource> {
        self.bodies.get(&(sex, color))
    }

    pub fn add_on(
        &self,
        sex: Sex,
        kind: AddOnType,
        index: u16,
        color: AddOnColor,
    ) -> Option<&LayerSource> {
        self.add_ons.get(&(sex, kind, index, color))
    }

    pub fn item(&self, kind: ItemType, index: u16) -> Option<&LayerSource> {
        self.items.get(&(kind, index))
    }

    /// Highest style index registered for an add-on category.
    pub fn max_add_on_index(&self, sex: Sex, kind: AddOnType) -> u16 {
        self.add_ons
            .keys()
            .filter(|(s, k, _, _)| *s == sex && *k == kind)
            .map(|(_, _, i, _)| *i)
            .max()
            .unwrap_or(0)
    }

    /// Highest index registered for an item category.
    pub fn max_item_index(&self, kind: ItemType) -> u16 {
        self.items
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, i)| *i)
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.bodies.len() + self.add_ons.len() + self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all registered layers.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.add_ons.clear();
        self.items.clear();
    }
}
