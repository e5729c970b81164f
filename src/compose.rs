//! Layer compositing.
//!
//! Turns a [`Composite`] into a single 128×192 sprite sheet by pasting its
//! layers in a fixed z-order, some of them restricted to a subset of the
//! four direction bands through [`DirectionMasks`]. [`fix_bleed`] then
//! inserts a transparent gap after every band so texture filtering at
//! frame edges never samples a neighbouring direction.
//!
//! # Sheet layout
//!
//! The sheet is 4 columns × 4 rows of 32×48 frames. Each row is a
//! direction band, top to bottom: Up, Left, Right, Down (see
//! [`crate::selection`]).

use smallvec::SmallVec;
use thiserror::Error;

use crate::bitmap::{Bitmap, LayerSource, PixelFormat, Rgba};
use crate::composite::{Composite, Slot};

pub const TEXTURE_WIDTH: u32 = 128;
pub const TEXTURE_HEIGHT: u32 = 192;
pub const FRAME_WIDTH: u32 = 32;
pub const FRAME_HEIGHT: u32 = 48;
/// Number of direction bands (rows) in a sheet.
pub const BAND_COUNT: u32 = 4;
/// Transparent rows appended after each band by [`fix_bleed`].
pub const BLEED_GAP: u32 = 2;
/// Height of a bleed-fixed sheet.
pub const FIXED_HEIGHT: u32 = TEXTURE_HEIGHT + BAND_COUNT * BLEED_GAP;

/// Band index of each direction, top to bottom.
pub const BAND_UP: u32 = 0;
pub const BAND_LEFT: u32 = 1;
pub const BAND_RIGHT: u32 = 2;
pub const BAND_DOWN: u32 = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The target buffer does not have the sheet dimensions.
    #[error("target must be {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    TargetSize {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    /// A custom direction mask does not have the sheet dimensions.
    #[error("{mask} mask must be 128x192, got {actual_w}x{actual_h}")]
    MaskSize {
        mask: MaskKind,
        actual_w: u32,
        actual_h: u32,
    },
}

/// Which direction bands a masked paste is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskKind {
    /// Only the down-facing band.
    Down,
    /// Every band except down-facing.
    SidesUp,
    /// Left and right bands.
    Sides,
    /// Only the up-facing band.
    Up,
}

impl MaskKind {
    fn bands(&self) -> &'static [u32] {
        match self {
            MaskKind::Down => &[BAND_DOWN],
            MaskKind::SidesUp => &[BAND_UP, BAND_LEFT, BAND_RIGHT],
            MaskKind::Sides => &[BAND_LEFT, BAND_RIGHT],
            MaskKind::Up => &[BAND_UP],
        }
    }
}

impl std::fmt::Display for MaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MaskKind::Down => "down",
            MaskKind::SidesUp => "sides+up",
            MaskKind::Sides => "sides",
            MaskKind::Up => "up",
        };
        f.write_str(name)
    }
}

/// The four alpha stencils used to restrict pastes to direction bands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionMasks {
    down: Bitmap,
    sides_up: Bitmap,
    sides: Bitmap,
    up: Bitmap,
}

impl DirectionMasks {
    /// Masks covering whole bands, fully opaque inside and fully
    /// transparent outside.
    pub fn standard() -> Self {
        Self {
            down: band_mask(MaskKind::Down),
            sides_up: band_mask(MaskKind::SidesUp),
            sides: band_mask(MaskKind::Sides),
            up: band_mask(MaskKind::Up),
        }
    }

    /// Custom stencils; each must be exactly 128×192. Only the alpha
    /// channel is used.
    pub fn new(
        down: Bitmap,
        sides_up: Bitmap,
        sides: Bitmap,
        up: Bitmap,
    ) -> Result<Self, ComposeError> {
        for (kind, mask) in [
            (MaskKind::Down, &down),
            (MaskKind::SidesUp, &sides_up),
            (MaskKind::Sides, &sides),
            (MaskKind::Up, &up),
        ] {
            if mask.size() != (TEXTURE_WIDTH, TEXTURE_HEIGHT) {
                return Err(ComposeError::MaskSize {
                    mask: kind,
                    actual_w: mask.width(),
                    actual_h: mask.height(),
                });
            }
        }
        Ok(Self {
            down,
            sides_up,
            sides,
            up,
        })
    }

    pub fn get(&self, kind: MaskKind) -> &Bitmap {
        match kind {
            MaskKind::Down => &self.down,
            MaskKind::SidesUp => &self.sides_up,
            MaskKind::Sides => &self.sides,
            MaskKind::Up => &self.up,
        }
    }
}

impl Default for DirectionMasks {
    fn default() -> Self {
        Self::standard()
    }
}

fn band_mask(kind: MaskKind) -> Bitmap {
    let mut mask = Bitmap::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
    for &band in kind.bands() {
        mask.fill_rect(
            0,
            band * FRAME_HEIGHT,
            TEXTURE_WIDTH,
            FRAME_HEIGHT,
            Rgba::new(255, 255, 255, 255),
        );
    }
    mask
}

/// One step of the paste plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasteStep {
    pub slot: Slot,
    pub mask: Option<MaskKind>,
}

impl PasteStep {
    const fn full(slot: Slot) -> Self {
        Self { slot, mask: None }
    }

    const fn masked(slot: Slot, mask: MaskKind) -> Self {
        Self {
            slot,
            mask: Some(mask),
        }
    }
}

/// Bottom-to-top paste steps for `composite`, including steps whose slot
/// is unset (they are skipped when painting).
pub fn paste_plan(composite: &Composite) -> SmallVec<[PasteStep; 24]> {
    use MaskKind::*;
    let mut plan = SmallVec::new();

    plan.push(PasteStep::masked(Slot::SkilledHandItem, Up));
    plan.push(PasteStep::masked(Slot::DumbHandItem, SidesUp));
    plan.push(PasteStep::masked(Slot::HairTail, Down));

    match composite {
        Composite::Simple(_) => {
            plan.push(PasteStep::full(Slot::Body));
            plan.push(PasteStep::full(Slot::Cloth));
            plan.push(PasteStep::full(Slot::Necklace));
            plan.push(PasteStep::full(Slot::Hair));
            plan.push(PasteStep::masked(Slot::SkilledHandItem, Sides));
        }
        Composite::Standard(c) => {
            plan.push(PasteStep::masked(Slot::Cloak, Down));
            plan.push(PasteStep::full(Slot::Body));
            if c.boots_over_pants {
                plan.push(PasteStep::full(Slot::Pants));
                plan.push(PasteStep::full(Slot::Boots));
            } else {
                plan.push(PasteStep::full(Slot::Boots));
                plan.push(PasteStep::full(Slot::Pants));
            }
            plan.push(PasteStep::full(Slot::Shirt));
            plan.push(PasteStep::full(Slot::Chest));
            if c.necklace_over_long_shirt {
                plan.push(PasteStep::full(Slot::LongShirt));
                plan.push(PasteStep::full(Slot::Necklace));
            } else {
                plan.push(PasteStep::full(Slot::Necklace));
                plan.push(PasteStep::full(Slot::LongShirt));
            }
            plan.push(PasteStep::full(Slot::Shoulder));
            plan.push(PasteStep::full(Slot::Waist));
            plan.push(PasteStep::full(Slot::Arms));
            plan.push(PasteStep::full(Slot::Hair));
            plan.push(PasteStep::masked(Slot::SkilledHandItem, Sides));
            plan.push(PasteStep::masked(Slot::Cloak, SidesUp));
        }
    }

    plan.push(PasteStep::masked(Slot::HairTail, SidesUp));
    plan.push(PasteStep::full(Slot::Hat));
    plan.push(PasteStep::masked(Slot::DumbHandItem, Down));
    plan.push(PasteStep::masked(Slot::SkilledHandItem, Down));
    plan
}

/// How the sheet is painted before being read back as a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposePath {
    /// Paint straight into the output bitmap.
    #[default]
    Cpu,
    /// Paint into a scratch render target, then read it back into a
    /// bitmap of the output format.
    RenderTarget,
}

impl ComposePath {
    pub fn from_hardware_flag(use_hardware_acceleration: bool) -> Self {
        if use_hardware_acceleration {
            ComposePath::RenderTarget
        } else {
            ComposePath::Cpu
        }
    }
}

/// Paint `composite` into `target`, which must be exactly 128×192.
///
/// The target is cleared first. Returns [`ComposeError::TargetSize`]
/// without touching the target when its size is wrong.
pub fn compose_into(
    target: &mut Bitmap,
    composite: &Composite,
    masks: &DirectionMasks,
) -> Result<(), ComposeError> {
    if target.size() != (TEXTURE_WIDTH, TEXTURE_HEIGHT) {
        return Err(ComposeError::TargetSize {
            expected_w: TEXTURE_WIDTH,
            expected_h: TEXTURE_HEIGHT,
            actual_w: target.width(),
            actual_h: target.height(),
        });
    }

    paint(target, composite, masks);
    Ok(())
}

/// Clear `target` and paste every layer of `composite` in plan order.
/// The caller guarantees the target is sheet sized.
fn paint(target: &mut Bitmap, composite: &Composite, masks: &DirectionMasks) {
    target.clear();
    for step in paste_plan(composite) {
        let Some(layer) = composite.layer(step.slot) else {
            continue;
        };
        paste(target, layer, step.mask.map(|kind| masks.get(kind)));
    }
}

/// Compose a fresh 128×192 sheet through the CPU path.
pub fn compose(composite: &Composite, masks: &DirectionMasks) -> Bitmap {
    compose_with(composite, masks, ComposePath::Cpu, PixelFormat::default())
}

/// Compose a fresh 128×192 sheet through `path`, tagged with `format`.
pub fn compose_with(
    composite: &Composite,
    masks: &DirectionMasks,
    path: ComposePath,
    format: PixelFormat,
) -> Bitmap {
    let mut target = Bitmap::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
    paint(&mut target, composite, masks);
    match path {
        ComposePath::Cpu => target.with_format(format),
        ComposePath::RenderTarget => read_back(&target, format),
    }
}

/// Copy a render target into a new bitmap of `format`, row by row.
fn read_back(render_target: &Bitmap, format: PixelFormat) -> Bitmap {
    let mut out = Bitmap::new(render_target.width(), render_target.height()).with_format(format);
    let width = render_target.width() as usize;
    for y in 0..render_target.height() {
        let start = y as usize * width;
        out.pixels_mut()[start..start + width].copy_from_slice(render_target.row(y));
    }
    out
}

fn paste(target: &mut Bitmap, layer: &LayerSource, mask: Option<&Bitmap>) {
    let width = target.width();
    let height = target.height();
    for y in 0..height {
        for x in 0..width {
            let mut src = layer.sample(x, y);
            if let Some(mask) = mask {
                let coverage = mask.get(x as i64, y as i64).map(|m| m.a).unwrap_or(0);
                src = src.masked(coverage);
            }
            if src.a == 0 {
                continue;
            }
            let idx = y as usize * width as usize + x as usize;
            let dst = target.pixels()[idx];
            target.pixels_mut()[idx] = src.over(dst);
        }
    }
}

/// Insert a transparent [`BLEED_GAP`]-row gap after each direction band.
///
/// Band `b` (rows `48b..48b+48`) lands at rows `50b..50b+48` of the
/// 128×200 output; rows `50b+48` and `50b+49` are fully transparent.
pub fn fix_bleed(source: &Bitmap) -> Result<Bitmap, ComposeError> {
    if source.size() != (TEXTURE_WIDTH, TEXTURE_HEIGHT) {
        return Err(ComposeError::TargetSize {
            expected_w: TEXTURE_WIDTH,
            expected_h: TEXTURE_HEIGHT,
            actual_w: source.width(),
            actual_h: source.height(),
        });
    }

    Ok(bleed_fixed(source))
}

/// Compose `composite` through `path` and bleed-fix the result: the
/// 128×200 bitmap the cache stores.
pub fn compose_sheet(
    composite: &Composite,
    masks: &DirectionMasks,
    path: ComposePath,
    format: PixelFormat,
) -> Bitmap {
    bleed_fixed(&compose_with(composite, masks, path, format))
}

fn bleed_fixed(source: &Bitmap) -> Bitmap {
    let mut fixed = Bitmap::new(TEXTURE_WIDTH, FIXED_HEIGHT).with_format(source.format());
    let band_len = (TEXTURE_WIDTH * FRAME_HEIGHT) as usize;
    let fixed_stride = (TEXTURE_WIDTH * (FRAME_HEIGHT + BLEED_GAP)) as usize;
    for band in 0..BAND_COUNT as usize {
        let src = &source.pixels()[band * band_len..(band + 1) * band_len];
        let dst_start = band * fixed_stride;
        fixed.pixels_mut()[dst_start..dst_start + band_len].copy_from_slice(src);
    }
    fixed
}
