//! Composite character descriptions.
//!
//! A [`Composite`] is the set of traits worn by one character. It comes in
//! two shapes: [`SimpleComposite`] with a single full-body cloth, and
//! [`StandardComposite`] with nine separate clothing slots plus two
//! stacking toggles. Both expose their layers through [`Slot`] and a
//! combined identity through [`Composite::hash`].

use crate::bitmap::LayerSource;
use crate::traits::Trait;

/// A named layer slot of a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Body,
    Hair,
    HairTail,
    Necklace,
    Hat,
    SkilledHandItem,
    DumbHandItem,
    Cloth,
    Boots,
    Pants,
    Shirt,
    Chest,
    Waist,
    Arms,
    LongShirt,
    Shoulder,
    Cloak,
}

/// Slots shared by both composite shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseTraits {
    pub body: Option<Trait>,
    pub hair: Option<Trait>,
    pub necklace: Option<Trait>,
    pub hat: Option<Trait>,
    pub skilled_hand_item: Option<Trait>,
    pub dumb_hand_item: Option<Trait>,
}

impl BaseTraits {
    fn layer(&self, slot: Slot) -> Option<&LayerSource> {
        match slot {
            Slot::Body => self.body.as_ref().map(Trait::front),
            Slot::Hair => self.hair.as_ref().map(Trait::front),
            Slot::HairTail => self.hair.as_ref().and_then(Trait::back),
            Slot::Necklace => self.necklace.as_ref().map(Trait::front),
            Slot::Hat => self.hat.as_ref().map(Trait::front),
            Slot::SkilledHandItem => self.skilled_hand_item.as_ref().map(Trait::front),
            Slot::DumbHandItem => self.dumb_hand_item.as_ref().map(Trait::front),
            _ => None,
        }
    }

    fn push_identities<'a>(&'a self, fields: &mut Vec<Option<&'a str>>) {
        for t in [
            &self.body,
            &self.hair,
            &self.necklace,
            &self.hat,
            &self.skilled_hand_item,
            &self.dumb_hand_item,
        ] {
            fields.push(identity_of(t));
        }
    }
}

/// Body + accessories + one full-body cloth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleComposite {
    pub base: BaseTraits,
    pub cloth: Option<Trait>,
}

/// Body + accessories + nine clothing slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardComposite {
    pub base: BaseTraits,
    pub boots: Option<Trait>,
    pub pants: Option<Trait>,
    pub shirt: Option<Trait>,
    pub chest: Option<Trait>,
    pub waist: Option<Trait>,
    pub arms: Option<Trait>,
    pub long_shirt: Option<Trait>,
    pub shoulder: Option<Trait>,
    pub cloak: Option<Trait>,
    /// Draw the boots after (over) the pants.
    pub boots_over_pants: bool,
    /// Draw the necklace after (over) the long shirt.
    pub necklace_over_long_shirt: bool,
}

/// Either composite shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composite {
    Simple(SimpleComposite),
    Standard(StandardComposite),
}

impl From<SimpleComposite> for Composite {
    fn from(value: SimpleComposite) -> Self {
        Composite::Simple(value)
    }
}

impl From<StandardComposite> for Composite {
    fn from(value: StandardComposite) -> Self {
        Composite::Standard(value)
    }
}

impl Composite {
    pub fn base(&self) -> &BaseTraits {
        match self {
            Composite::Simple(c) => &c.base,
            Composite::Standard(c) => &c.base,
        }
    }

    /// Layer drawn for `slot`, if the slot exists in this shape and is set.
    pub fn layer(&self, slot: Slot) -> Option<&LayerSource> {
        match self {
            Composite::Simple(c) => match slot {
                Slot::Cloth => c.cloth.as_ref().map(Trait::front),
                _ => c.base.layer(slot),
            },
            Composite::Standard(c) => {
                let cloth = match slot {
                    Slot::Boots => &c.boots,
                    Slot::Pants => &c.pants,
                    Slot::Shirt => &c.shirt,
                    Slot::Chest => &c.chest,
                    Slot::Waist => &c.waist,
                    Slot::Arms => &c.arms,
                    Slot::LongShirt => &c.long_shirt,
                    Slot::Shoulder => &c.shoulder,
                    Slot::Cloak => &c.cloak,
                    _ => return c.base.layer(slot),
                };
                cloth.as_ref().map(Trait::front)
            }
        }
    }

    /// The stacking toggles `(boots_over_pants, necklace_over_long_shirt)`.
    /// Simple composites have none and report `(false, false)`.
    pub fn toggles(&self) -> (bool, bool) {
        match self {
            Composite::Simple(_) => (false, false),
            Composite::Standard(c) => (c.boots_over_pants, c.necklace_over_long_shirt),
        }
    }

    /// Cache identity of this composite.
    ///
    /// Trait identities (empty for unset slots) are escaped and joined with
    /// `:` in fixed slot order; standard composites append both toggles.
    /// A set slot whose identity is empty is written as `\=`, which no
    /// escaped identity can produce. Equal hashes imply equal slot
    /// identities and toggles.
    pub fn hash(&self) -> String {
        let mut fields: Vec<Option<&str>> = Vec::with_capacity(17);
        self.base().push_identities(&mut fields);
        match self {
            Composite::Simple(c) => fields.push(identity_of(&c.cloth)),
            Composite::Standard(c) => {
                for t in [
                    &c.boots,
                    &c.pants,
                    &c.shirt,
                    &c.chest,
                    &c.waist,
                    &c.arms,
                    &c.long_shirt,
                    &c.shoulder,
                    &c.cloak,
                ] {
                    fields.push(identity_of(t));
                }
                fields.push(bool_field(c.boots_over_pants));
                fields.push(bool_field(c.necklace_over_long_shirt));
            }
        }

        let mut out = String::with_capacity(fields.iter().map(|f| f.map_or(0, str::len) + 1).sum());
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            match field {
                None => {}
                Some("") => out.push_str(EMPTY_IDENTITY),
                Some(identity) => escape_into(identity, &mut out),
            }
        }
        out
    }
}

/// Hash field of a set slot with an empty identity.
const EMPTY_IDENTITY: &str = "\\=";

fn identity_of(t: &Option<Trait>) -> Option<&str> {
    t.as_ref().map(Trait::identity)
}

fn bool_field(v: bool) -> Option<&'static str> {
    Some(if v { "true" } else { "false" })
}

fn escape_into(field: &str, out: &mut String) {
    for ch in field.chars() {
        if ch == '\\' || ch == ':' {
            out.push('\\');
        }
        out.push(ch);
    }
}
