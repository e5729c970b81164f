//! Compositing integration tests: z-order, directional masking and the
//! bleed-fixed layout of the sheets produced by the cache.

use paperdoll::bitmap::{Bitmap, LayerSource, Rgba};
use paperdoll::compose::{DirectionMasks, compose, fix_bleed};
use paperdoll::composite::{BaseTraits, Composite, SimpleComposite, StandardComposite};
use paperdoll::resources::compositecache::CompositeCache;
use paperdoll::selection::{AnimState, CharacterSelection, Direction, FrameCell};
use paperdoll::traits::Trait;

const BOOTS: Rgba = Rgba::opaque(120, 60, 10);
const PANTS: Rgba = Rgba::opaque(10, 10, 160);
const BODY: Rgba = Rgba::opaque(230, 200, 170);

fn solid(color: Rgba) -> LayerSource {
    LayerSource::new(Bitmap::filled(128, 192, color).into_handle())
}

fn t(id: &str, color: Rgba) -> Option<Trait> {
    Some(Trait::new(id, solid(color)))
}

fn legs(boots_over_pants: bool) -> Composite {
    Composite::Standard(StandardComposite {
        base: BaseTraits {
            body: t("body", BODY),
            ..Default::default()
        },
        boots: t("boots", BOOTS),
        pants: t("pants", PANTS),
        boots_over_pants,
        ..Default::default()
    })
}

// =============================================================================
// Z-order
// =============================================================================

#[test]
fn boots_over_pants_toggle_swaps_the_pair() {
    let masks = DirectionMasks::standard();
    let under = compose(&legs(false), &masks);
    let over = compose(&legs(true), &masks);
    assert!(under.pixels().iter().all(|p| *p == PANTS));
    assert!(over.pixels().iter().all(|p| *p == BOOTS));
}

#[test]
fn necklace_over_long_shirt_toggle_swaps_the_pair() {
    let necklace = Rgba::opaque(250, 250, 0);
    let shirt = Rgba::opaque(0, 120, 0);
    let build = |necklace_over_long_shirt| {
        Composite::Standard(StandardComposite {
            base: BaseTraits {
                necklace: t("nkl1", necklace),
                ..Default::default()
            },
            long_shirt: t("Male1Green", shirt),
            necklace_over_long_shirt,
            ..Default::default()
        })
    };
    let masks = DirectionMasks::standard();
    assert_eq!(compose(&build(false), &masks).get(0, 0), Some(shirt));
    assert_eq!(compose(&build(true), &masks).get(0, 0), Some(necklace));
}

#[test]
fn hat_is_drawn_over_hair() {
    let hair = Rgba::opaque(20, 20, 20);
    let hat = Rgba::opaque(200, 0, 0);
    let c = Composite::Simple(SimpleComposite {
        base: BaseTraits {
            hair: t("Male1Black", hair),
            hat: t("Male1Red", hat),
            ..Default::default()
        },
        cloth: None,
    });
    let out = compose(&c, &DirectionMasks::standard());
    assert!(out.pixels().iter().all(|p| *p == hat));
}

#[test]
fn translucent_cloth_blends_over_body() {
    let c = Composite::Simple(SimpleComposite {
        base: BaseTraits {
            body: t("body", Rgba::opaque(0, 0, 0)),
            ..Default::default()
        },
        cloth: t("cloth", Rgba::new(255, 255, 255, 128)),
    });
    let out = compose(&c, &DirectionMasks::standard());
    let px = out.get(10, 10).unwrap();
    assert_eq!(px.a, 255);
    assert!(px.r > 120 && px.r < 136, "got {px:?}");
}

// =============================================================================
// Directional masking
// =============================================================================

#[test]
fn skilled_hand_item_covers_hat_only_facing_down() {
    // Drawn at up, sides and down masked steps; only the down step comes
    // after the hat.
    let item = Rgba::opaque(180, 180, 180);
    let hat = Rgba::opaque(5, 5, 5);
    let c = Composite::Simple(SimpleComposite {
        base: BaseTraits {
            skilled_hand_item: t("shi1", item),
            hat: t("Male1Black", hat),
            ..Default::default()
        },
        cloth: None,
    });
    let out = compose(&c, &DirectionMasks::standard());
    // Down band: item painted after the hat.
    assert_eq!(out.get(0, 3 * 48 + 5), Some(item));
    // Up, left and right bands: item painted before the hat.
    for band in 0..3 {
        assert_eq!(out.get(0, band * 48 + 5), Some(hat), "band {band}");
    }
}

#[test]
fn hair_tail_goes_behind_body_except_facing_away() {
    let tail = Rgba::opaque(90, 40, 0);
    let body = Rgba::opaque(250, 220, 200);
    let hair_front = Bitmap::new(128, 192).into_handle();
    let c = Composite::Simple(SimpleComposite {
        base: BaseTraits {
            body: t("body", body),
            hair: Some(Trait::hair(
                "Female2Red",
                LayerSource::new(hair_front),
                Some(solid(tail)),
            )),
            ..Default::default()
        },
        cloth: None,
    });
    let out = compose(&c, &DirectionMasks::standard());
    // Down band: tail drawn before the body.
    assert_eq!(out.get(16, 3 * 48 + 20), Some(body));
    // Other bands: tail drawn after the body.
    for band in 0..3 {
        assert_eq!(out.get(16, band * 48 + 20), Some(tail), "band {band}");
    }
}

#[test]
fn layer_offset_selects_sheet_inside_atlas() {
    let mut atlas = Bitmap::new(256, 192);
    atlas.fill_rect(128, 0, 128, 192, Rgba::opaque(0, 255, 0));
    let layer = LayerSource::new(atlas.into_handle()).with_offset(128, 0);
    let c = Composite::Simple(SimpleComposite {
        base: BaseTraits {
            body: Some(Trait::new("atlas", layer)),
            ..Default::default()
        },
        cloth: None,
    });
    let out = compose(&c, &DirectionMasks::standard());
    assert!(out.pixels().iter().all(|p| *p == Rgba::opaque(0, 255, 0)));
}

// =============================================================================
// Bleed-fix layout
// =============================================================================

#[test]
fn bleed_fixed_bands_keep_their_pixels() {
    let mut sheet = Bitmap::new(128, 192);
    let colors = [
        Rgba::opaque(255, 0, 0),
        Rgba::opaque(0, 255, 0),
        Rgba::opaque(0, 0, 255),
        Rgba::opaque(255, 255, 0),
    ];
    for (band, color) in colors.iter().enumerate() {
        sheet.fill_rect(0, band as u32 * 48, 128, 48, *color);
    }
    let fixed = fix_bleed(&sheet).unwrap();
    assert_eq!(fixed.size(), (128, 200));
    for (band, color) in colors.iter().enumerate() {
        let top = band as u32 * 50;
        assert!(fixed.row(top).iter().all(|p| p == color));
        assert!(fixed.row(top + 47).iter().all(|p| p == color));
        assert!(fixed.row(top + 48).iter().all(|p| *p == Rgba::TRANSPARENT));
        assert!(fixed.row(top + 49).iter().all(|p| *p == Rgba::TRANSPARENT));
    }
}

#[test]
fn cached_grid_frames_match_composed_sheet() {
    let c = legs(false);
    let sheet = compose(&c, &DirectionMasks::standard());
    let cache = CompositeCache::new(2);
    let grid = cache.get(&c);

    let selection = CharacterSelection::new(4.0);
    for direction in Direction::ALL {
        for (i, cell) in selection
            .frames(AnimState::Moving, direction)
            .into_iter()
            .enumerate()
        {
            assert_eq!(cell, FrameCell::new(i as u32, direction.row()));
            let frame = grid.frame_pixels(cell);
            for y in 0..48 {
                for x in 0..32 {
                    let src = sheet
                        .get((cell.column * 32 + x) as i64, (cell.row * 48 + y) as i64)
                        .unwrap();
                    assert_eq!(frame.get(x as i64, y as i64), Some(src));
                }
            }
        }
    }
}
