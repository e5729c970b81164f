//! Synthetic layer catalog.
//!
//! Builds a [`LayerStore`] out of flat-colored shapes so the compositor can
//! be exercised without decoding real artwork. Every layer paints one
//! rectangle per frame, at a position that depends on the part so the
//! z-order is visible in the output.

use crate::bitmap::{Bitmap, LayerSource, Rgba};
use crate::compose::{FRAME_HEIGHT, FRAME_WIDTH, TEXTURE_HEIGHT, TEXTURE_WIDTH};
use crate::resources::layerstore::{AddOnColor, AddOnType, BodyColor, ItemType, LayerStore, Sex};

/// Style indices registered for every add-on category.
pub const DEMO_STYLES: u16 = 3;
/// Indices registered for every item category.
pub const DEMO_ITEMS: u16 = 2;

/// Rectangle inside a 32×48 frame: (x, y, width, height).
type FrameArea = (u32, u32, u32, u32);

fn sheet(area: FrameArea, color: Rgba) -> LayerSource {
    let mut bitmap = Bitmap::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
    let (x, y, w, h) = area;
    for row in 0..TEXTURE_HEIGHT / FRAME_HEIGHT {
        for col in 0..TEXTURE_WIDTH / FRAME_WIDTH {
            bitmap.fill_rect(col * FRAME_WIDTH + x, row * FRAME_HEIGHT + y, w, h, color);
        }
    }
    LayerSource::new(bitmap.into_handle())
}

fn body_rgba(color: BodyColor) -> Rgba {
    match color {
        BodyColor::Black => Rgba::opaque(40, 30, 25),
        BodyColor::Blue => Rgba::opaque(70, 90, 200),
        BodyColor::Green => Rgba::opaque(70, 160, 80),
        BodyColor::Orange => Rgba::opaque(230, 140, 60),
        BodyColor::Purple => Rgba::opaque(140, 70, 170),
        BodyColor::Red => Rgba::opaque(190, 60, 50),
        BodyColor::White => Rgba::opaque(240, 210, 180),
        BodyColor::Yellow => Rgba::opaque(230, 210, 90),
    }
}

fn add_on_rgba(color: AddOnColor) -> Rgba {
    match color {
        AddOnColor::Black => Rgba::opaque(20, 20, 20),
        AddOnColor::Blue => Rgba::opaque(30, 60, 180),
        AddOnColor::DarkBrown => Rgba::opaque(80, 50, 20),
        AddOnColor::Green => Rgba::opaque(30, 140, 40),
        AddOnColor::LightBrown => Rgba::opaque(160, 110, 60),
        AddOnColor::Pink => Rgba::opaque(240, 150, 190),
        AddOnColor::Purple => Rgba::opaque(110, 40, 150),
        AddOnColor::Red => Rgba::opaque(200, 30, 30),
        AddOnColor::White => Rgba::opaque(250, 250, 250),
        AddOnColor::Yellow => Rgba::opaque(240, 220, 40),
    }
}

fn add_on_area(kind: AddOnType, style: u16) -> FrameArea {
    let grow = style as u32;
    match kind {
        AddOnType::Hair => (9, 4, 14, 6 + grow),
        AddOnType::HairTail => (11, 8, 10, 10 + grow),
        AddOnType::Hat => (8, 1, 16, 4 + grow),
        AddOnType::Cloth => (9, 16, 14, 22 + grow),
        AddOnType::Boots => (10, 40, 12, 6),
        AddOnType::Pants => (10, 30, 12, 12 + grow),
        AddOnType::Shirt => (9, 16, 14, 12),
        AddOnType::Chest => (11, 18, 10, 6 + grow),
        AddOnType::LongShirt => (9, 16, 14, 20 + grow),
        AddOnType::Arms => (6, 18, 20, 4),
        AddOnType::Waist => (9, 28, 14, 2 + grow),
        AddOnType::Shoulder => (7, 15, 18, 3),
        AddOnType::Cloak => (7, 14, 18, 26 + grow),
    }
}

fn item_layer(kind: ItemType, index: u16) -> LayerSource {
    let shade = 80 + (index as u8).saturating_mul(60);
    match kind {
        ItemType::Necklace => sheet((13, 15, 6, 2), Rgba::opaque(shade, shade, 0)),
        ItemType::SkilledHandItem => sheet((24, 14, 3, 24), Rgba::opaque(shade, shade, shade)),
        ItemType::DumbHandItem => sheet((3, 20, 6, 10), Rgba::opaque(0, shade / 2, shade)),
    }
}

const DEMO_ADD_ONS: [AddOnType; 13] = [
    AddOnType::Boots,
    AddOnType::Pants,
    AddOnType::Shirt,
    AddOnType::Chest,
    AddOnType::LongShirt,
    AddOnType::Arms,
    AddOnType::Waist,
    AddOnType::Shoulder,
    AddOnType::Cloth,
    AddOnType::Hair,
    AddOnType::HairTail,
    AddOnType::Hat,
    AddOnType::Cloak,
];

/// A catalog with every body color, [`DEMO_STYLES`] styles × 10 colors per
/// add-on category for both sexes, and [`DEMO_ITEMS`] items per category.
pub fn demo_layer_store() -> LayerStore {
    let mut store = LayerStore::new();
    for sex in Sex::ALL {
        for color in BodyColor::ALL {
            store.insert_body(sex, color, sheet((10, 6, 12, 40), body_rgba(color)));
        }
        for kind in DEMO_ADD_ONS {
            for style in 1..=DEMO_STYLES {
                for color in AddOnColor::ALL {
                    let layer = sheet(add_on_area(kind, style), add_on_rgba(color));
                    store.insert_add_on(sex, kind, style, color, layer);
                }
            }
        }
    }
    for kind in [
        ItemType::Necklace,
        ItemType::SkilledHandItem,
        ItemType::DumbHandItem,
    ] {
        for index in 1..=DEMO_ITEMS {
            store.insert_item(kind, index, item_layer(kind, index));
        }
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_store_contents() {
        let store = demo_layer_store();
        assert!(store.body(Sex::Female, BodyColor::Orange).is_some());
        assert!(store.add_on(Sex::Male, AddOnType::Cloak, 3, AddOnColor::Pink).is_some());
        assert!(store.add_on(Sex::Male, AddOnType::Cloak, 4, AddOnColor::Pink).is_none());
        assert_eq!(store.max_item_index(ItemType::Necklace), DEMO_ITEMS);
        assert_eq!(store.len(), 2 * 8 + 2 * 13 * 3 * 10 + 3 * 2);
    }

    #[test]
    fn test_sheet_paints_every_frame() {
        let layer = sheet((0, 0, 1, 1), Rgba::opaque(1, 1, 1));
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(layer.sample(col * 32, row * 48), Rgba::opaque(1, 1, 1));
            }
        }
        assert_eq!(layer.sample(1, 1), Rgba::TRANSPARENT);
    }
}
