//! Appearance selection component.
//!
//! An [`Appearance`] is the editable description of a character: sex, skin
//! tone and one (style index, color) choice per part. It is resolved
//! against the [`LayerStore`] into a [`Composite`] whenever the character
//! needs to be (re)drawn. Index [`EMPTY`] means "nothing in this slot"
//! (a hair index of 0 makes the character bald).
//!
//! Partial updates go through [`AppearancePatch`], which changes only the
//! fields it carries so a whole outfit swap triggers a single refresh.

use bevy_ecs::prelude::Component;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::composite::{BaseTraits, Composite, SimpleComposite, StandardComposite};
use crate::resources::layerstore::{AddOnColor, AddOnType, BodyColor, ItemType, LayerStore, Sex};
use crate::traits::Trait;

/// Index meaning "no part selected".
pub const EMPTY: u16 = 0;

/// Style index + color of a colored part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PartSelection {
    pub index: u16,
    pub color: AddOnColor,
}

impl PartSelection {
    pub const NONE: PartSelection = PartSelection {
        index: EMPTY,
        color: AddOnColor::Black,
    };

    pub fn new(index: u16, color: AddOnColor) -> Self {
        Self { index, color }
    }

    pub fn is_empty(&self) -> bool {
        self.index == EMPTY
    }
}

/// Clothing of the standard shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardOutfit {
    pub boots: PartSelection,
    pub pants: PartSelection,
    pub shirt: PartSelection,
    pub chest: PartSelection,
    pub waist: PartSelection,
    pub arms: PartSelection,
    pub long_shirt: PartSelection,
    pub shoulder: PartSelection,
    pub cloak: PartSelection,
    pub boots_over_pants: bool,
    pub necklace_over_long_shirt: bool,
}

/// Which composite shape an appearance resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutfitShape {
    Simple,
    Standard,
}

/// Clothing, in one of the two composite shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outfit {
    Simple { cloth: PartSelection },
    Standard(StandardOutfit),
}

impl Default for Outfit {
    fn default() -> Self {
        Outfit::Simple {
            cloth: PartSelection::NONE,
        }
    }
}

impl Outfit {
    pub fn shape(&self) -> OutfitShape {
        match self {
            Outfit::Simple { .. } => OutfitShape::Simple,
            Outfit::Standard(_) => OutfitShape::Standard,
        }
    }

    /// An empty outfit of `shape`.
    pub fn empty(shape: OutfitShape) -> Self {
        match shape {
            OutfitShape::Simple => Outfit::default(),
            OutfitShape::Standard => Outfit::Standard(StandardOutfit::default()),
        }
    }
}

/// Character appearance selection.
#[derive(Component, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub sex: Sex,
    pub body_color: BodyColor,
    pub hair: PartSelection,
    pub hat: PartSelection,
    pub necklace: u16,
    pub skilled_hand_item: u16,
    pub dumb_hand_item: u16,
    pub outfit: Outfit,
}

/// Bulk change to an [`Appearance`]. `None` fields are left alone.
///
/// Standard clothing fields only apply to standard outfits and `cloth`
/// only to simple ones; set `shape` to switch shapes first (the new
/// outfit starts empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearancePatch {
    pub sex: Option<Sex>,
    pub body_color: Option<BodyColor>,
    pub hair: Option<PartSelection>,
    pub hat: Option<PartSelection>,
    pub necklace: Option<u16>,
    pub skilled_hand_item: Option<u16>,
    pub dumb_hand_item: Option<u16>,
    pub shape: Option<OutfitShape>,
    pub cloth: Option<PartSelection>,
    pub boots: Option<PartSelection>,
    pub pants: Option<PartSelection>,
    pub shirt: Option<PartSelection>,
    pub chest: Option<PartSelection>,
    pub waist: Option<PartSelection>,
    pub arms: Option<PartSelection>,
    pub long_shirt: Option<PartSelection>,
    pub shoulder: Option<PartSelection>,
    pub cloak: Option<PartSelection>,
    pub boots_over_pants: Option<bool>,
    pub necklace_over_long_shirt: Option<bool>,
}

fn set<T: PartialEq>(field: &mut T, value: Option<T>, changed: &mut bool) {
    if let Some(value) = value
        && *field != value
    {
        *field = value;
        *changed = true;
    }
}

impl Appearance {
    pub fn new(sex: Sex, body_color: BodyColor) -> Self {
        Self {
            sex,
            body_color,
            ..Default::default()
        }
    }

    pub fn with_outfit(mut self, outfit: Outfit) -> Self {
        self.outfit = outfit;
        self
    }

    /// Apply every field `patch` carries. Returns whether anything changed.
    pub fn apply(&mut self, patch: &AppearancePatch) -> bool {
        let mut changed = false;
        set(&mut self.sex, patch.sex, &mut changed);
        set(&mut self.body_color, patch.body_color, &mut changed);
        set(&mut self.hair, patch.hair, &mut changed);
        set(&mut self.hat, patch.hat, &mut changed);
        set(&mut self.necklace, patch.necklace, &mut changed);
        set(&mut self.skilled_hand_item, patch.skilled_hand_item, &mut changed);
        set(&mut self.dumb_hand_item, patch.dumb_hand_item, &mut changed);

        if let Some(shape) = patch.shape
            && self.outfit.shape() != shape
        {
            self.outfit = Outfit::empty(shape);
            changed = true;
        }

        match &mut self.outfit {
            Outfit::Simple { cloth } => {
                set(cloth, patch.cloth, &mut changed);
            }
            Outfit::Standard(o) => {
                set(&mut o.boots, patch.boots, &mut changed);
                set(&mut o.pants, patch.pants, &mut changed);
                set(&mut o.shirt, patch.shirt, &mut changed);
                set(&mut o.chest, patch.chest, &mut changed);
                set(&mut o.waist, patch.waist, &mut changed);
                set(&mut o.arms, patch.arms, &mut changed);
                set(&mut o.long_shirt, patch.long_shirt, &mut changed);
                set(&mut o.shoulder, patch.shoulder, &mut changed);
                set(&mut o.cloak, patch.cloak, &mut changed);
                set(&mut o.boots_over_pants, patch.boots_over_pants, &mut changed);
                set(
                    &mut o.necklace_over_long_shirt,
                    patch.necklace_over_long_shirt,
                    &mut changed,
                );
            }
        }
        changed
    }

    /// Body trait, identity `"{Sex}{BodyColor}"`.
    pub fn body_trait(&self, store: &LayerStore) -> Option<Trait> {
        let identity = format!("{}{}", self.sex.name(), self.body_color.name());
        match store.body(self.sex, self.body_color) {
            Some(layer) => Some(Trait::new(identity, layer.clone())),
            None => {
                debug!("Missing body layer '{}'", identity);
                None
            }
        }
    }

    /// Hair trait, front from the hair category and back from the tail.
    pub fn hair_trait(&self, store: &LayerStore) -> Option<Trait> {
        let sel = self.hair;
        if sel.is_empty() {
            return None;
        }
        let identity = add_on_identity(self.sex, sel);
        let Some(front) = store.add_on(self.sex, AddOnType::Hair, sel.index, sel.color) else {
            debug!("Missing hair layer '{}'", identity);
            return None;
        };
        let back = store
            .add_on(self.sex, AddOnType::HairTail, sel.index, sel.color)
            .cloned();
        Some(Trait::hair(identity, front.clone(), back))
    }

    /// Trait of a colored add-on, identity `"{Sex}{index}{Color}"`.
    pub fn trait_for(&self, store: &LayerStore, kind: AddOnType, sel: PartSelection) -> Option<Trait> {
        if kind == AddOnType::Hair {
            return Appearance {
                hair: sel,
                ..self.clone()
            }
            .hair_trait(store);
        }
        if sel.is_empty() {
            return None;
        }
        let identity = add_on_identity(self.sex, sel);
        match store.add_on(self.sex, kind, sel.index, sel.color) {
            Some(layer) => Some(Trait::new(identity, layer.clone())),
            None => {
                debug!("Missing {:?} layer '{}'", kind, identity);
                None
            }
        }
    }

    /// Trait of a colorless item, identity `"{prefix}{index}"`.
    pub fn item_trait(&self, store: &LayerStore, kind: ItemType, index: u16) -> Option<Trait> {
        if index == EMPTY {
            return None;
        }
        let identity = format!("{}{}", kind.prefix(), index);
        match store.item(kind, index) {
            Some(layer) => Some(Trait::new(identity, layer.clone())),
            None => {
                debug!("Missing {:?} layer '{}'", kind, identity);
                None
            }
        }
    }

    fn base_traits(&self, store: &LayerStore) -> BaseTraits {
        BaseTraits {
            body: self.body_trait(store),
            hair: self.hair_trait(store),
            necklace: self.item_trait(store, ItemType::Necklace, self.necklace),
            hat: self.trait_for(store, AddOnType::Hat, self.hat),
            skilled_hand_item: self.item_trait(
                store,
                ItemType::SkilledHandItem,
                self.skilled_hand_item,
            ),
            dumb_hand_item: self.item_trait(store, ItemType::DumbHandItem, self.dumb_hand_item),
        }
    }

    /// Resolve this selection into a composite.
    pub fn resolve(&self, store: &LayerStore) -> Composite {
        let base = self.base_traits(store);
        match &self.outfit {
            Outfit::Simple { cloth } => Composite::Simple(SimpleComposite {
                base,
                cloth: self.trait_for(store, AddOnType::Cloth, *cloth),
            }),
            Outfit::Standard(o) => Composite::Standard(StandardComposite {
                base,
                boots: self.trait_for(store, AddOnType::Boots, o.boots),
                pants: self.trait_for(store, AddOnType::Pants, o.pants),
                shirt: self.trait_for(store, AddOnType::Shirt, o.shirt),
                chest: self.trait_for(store, AddOnType::Chest, o.chest),
                waist: self.trait_for(store, AddOnType::Waist, o.waist),
                arms: self.trait_for(store, AddOnType::Arms, o.arms),
                long_shirt: self.trait_for(store, AddOnType::LongShirt, o.long_shirt),
                shoulder: self.trait_for(store, AddOnType::Shoulder, o.shoulder),
                cloak: self.trait_for(store, AddOnType::Cloak, o.cloak),
                boots_over_pants: o.boots_over_pants,
                necklace_over_long_shirt: o.necklace_over_long_shirt,
            }),
        }
    }

    /// A random selection drawn from what `store` holds.
    pub fn random(rng: &mut fastrand::Rng, store: &LayerStore, shape: OutfitShape) -> Self {
        let sex = Sex::ALL[rng.usize(..Sex::ALL.len())];
        let body_color = BodyColor::ALL[rng.usize(..BodyColor::ALL.len())];
        let mut pick = |kind: AddOnType| {
            let max = store.max_add_on_index(sex, kind);
            PartSelection {
                index: rng.u16(0..=max),
                color: AddOnColor::ALL[rng.usize(..AddOnColor::ALL.len())],
            }
        };
        let hair = pick(AddOnType::Hair);
        let hat = pick(AddOnType::Hat);
        let outfit = match shape {
            OutfitShape::Simple => Outfit::Simple {
                cloth: pick(AddOnType::Cloth),
            },
            OutfitShape::Standard => Outfit::Standard(StandardOutfit {
                boots: pick(AddOnType::Boots),
                pants: pick(AddOnType::Pants),
                shirt: pick(AddOnType::Shirt),
                chest: pick(AddOnType::Chest),
                waist: pick(AddOnType::Waist),
                arms: pick(AddOnType::Arms),
                long_shirt: pick(AddOnType::LongShirt),
                shoulder: pick(AddOnType::Shoulder),
                cloak: pick(AddOnType::Cloak),
                boots_over_pants: false,
                necklace_over_long_shirt: false,
            }),
        };
        let mut item = |kind: ItemType| rng.u16(0..=store.max_item_index(kind));
        let necklace = item(ItemType::Necklace);
        let skilled_hand_item = item(ItemType::SkilledHandItem);
        let dumb_hand_item = item(ItemType::DumbHandItem);
        let mut appearance = Self {
            sex,
            body_color,
            hair,
            hat,
            necklace,
            skilled_hand_item,
            dumb_hand_item,
            outfit,
        };
        if let Outfit::Standard(o) = &mut appearance.outfit {
            o.boots_over_pants = rng.bool();
            o.necklace_over_long_shirt = rng.bool();
        }
        appearance
    }
}

fn add_on_identity(sex: Sex, sel: PartSelection) -> String {
    format!("{}{}{}", sex.name(), sel.index, sel.color.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, LayerSource};
    use crate::composite::Slot;

    fn layer() -> LayerSource {
        LayerSource::new(Bitmap::new(1, 1).into_handle())
    }

    fn store() -> LayerStore {
        let mut s = LayerStore::new();
        s.insert_body(Sex::Male, BodyColor::White, layer());
        s.insert_add_on(Sex::Male, AddOnType::Hair, 3, AddOnColor::Black, layer());
        s.insert_add_on(Sex::Male, AddOnType::HairTail, 3, AddOnColor::Black, layer());
        s.insert_add_on(Sex::Male, AddOnType::Cloth, 1, AddOnColor::Red, layer());
        s.insert_add_on(Sex::Male, AddOnType::Pants, 2, AddOnColor::Blue, layer());
        s.insert_item(ItemType::SkilledHandItem, 2, layer());
        s
    }

    #[test]
    fn test_resolve_simple_identities() {
        let a = Appearance {
            hair: PartSelection::new(3, AddOnColor::Black),
            skilled_hand_item: 2,
            outfit: Outfit::Simple {
                cloth: PartSelection::new(1, AddOnColor::Red),
            },
            ..Appearance::new(Sex::Male, BodyColor::White)
        };
        let c = a.resolve(&store());
        assert_eq!(c.hash(), "MaleWhite:Male3Black:::shi2::Male1Red");
        assert!(c.layer(Slot::HairTail).is_some());
    }

    #[test]
    fn test_missing_layers_leave_slots_unset() {
        let a = Appearance {
            hair: PartSelection::new(9, AddOnColor::Pink),
            necklace: 4,
            ..Appearance::new(Sex::Female, BodyColor::Green)
        };
        let c = a.resolve(&store());
        assert!(c.base().body.is_none());
        assert!(c.base().hair.is_none());
        assert!(c.base().necklace.is_none());
    }

    #[test]
    fn test_standard_pants_resolve_without_boots() {
        let a = Appearance::new(Sex::Male, BodyColor::White).with_outfit(Outfit::Standard(
            StandardOutfit {
                pants: PartSelection::new(2, AddOnColor::Blue),
                ..Default::default()
            },
        ));
        let Composite::Standard(c) = a.resolve(&store()) else {
            panic!("expected a standard composite");
        };
        assert!(c.boots.is_none());
        assert_eq!(c.pants.as_ref().map(|t| t.identity()), Some("Male2Blue"));
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut a = Appearance::default();
        assert!(!a.apply(&AppearancePatch::default()));
        let patch = AppearancePatch {
            necklace: Some(3),
            ..Default::default()
        };
        assert!(a.apply(&patch));
        assert!(!a.apply(&patch));
        assert_eq!(a.necklace, 3);
    }

    #[test]
    fn test_apply_switches_shape_then_sets_pieces() {
        let mut a = Appearance::default();
        let patch = AppearancePatch {
            shape: Some(OutfitShape::Standard),
            boots: Some(PartSelection::new(1, AddOnColor::Red)),
            boots_over_pants: Some(true),
            cloth: Some(PartSelection::new(5, AddOnColor::Red)),
            ..Default::default()
        };
        assert!(a.apply(&patch));
        let Outfit::Standard(o) = a.outfit else {
            panic!("expected a standard outfit");
        };
        assert_eq!(o.boots.index, 1);
        assert!(o.boots_over_pants);
    }

    #[test]
    fn test_patch_from_json() {
        let patch: AppearancePatch =
            serde_json::from_str(r#"{"sex":"Female","hair":{"index":2,"color":"Red"}}"#).unwrap();
        assert_eq!(patch.sex, Some(Sex::Female));
        assert_eq!(patch.hair, Some(PartSelection::new(2, AddOnColor::Red)));
        assert!(patch.hat.is_none());
    }

    #[test]
    fn test_random_stays_within_store() {
        let store = store();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..20 {
            let a = Appearance::random(&mut rng, &store, OutfitShape::Standard);
            assert!(matches!(a.outfit, Outfit::Standard(_)));
            assert!(a.skilled_hand_item <= 2);
            assert!(a.necklace == 0);
        }
    }
}
