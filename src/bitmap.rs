//! Decoded bitmaps and layer sources.
//!
//! A [`Bitmap`] is a plain RGBA8 pixel buffer with rows stored top-down.
//! Bitmaps are shared between traits through [`BitmapHandle`]s; a
//! [`LayerSource`] points at one of them together with the offset of the
//! sprite sheet inside it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared, immutable bitmap.
pub type BitmapHandle = Arc<Bitmap>;

/// A straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Paint `self` over `dst` using straight alpha.
    ///
    /// Fully transparent sources keep the destination and fully opaque
    /// sources replace it, so solid layers stack without rounding drift.
    pub fn over(self, dst: Rgba) -> Rgba {
        let sa = self.a as u32;
        if sa == 0 {
            return dst;
        }
        if sa == 255 {
            return self;
        }
        let da = dst.a as u32;
        let dst_weight = (da * (255 - sa) + 127) / 255;
        let out_a = sa + dst_weight;
        if out_a == 0 {
            return Rgba::TRANSPARENT;
        }
        let blend = |s: u8, d: u8| -> u8 {
            let num = s as u32 * sa + d as u32 * dst_weight;
            ((num + out_a / 2) / out_a).min(255) as u8
        };
        Rgba {
            r: blend(self.r, dst.r),
            g: blend(self.g, dst.g),
            b: blend(self.b, dst.b),
            a: out_a.min(255) as u8,
        }
    }

    /// Scale the alpha channel by a mask coverage value (0-255).
    pub fn masked(self, coverage: u8) -> Rgba {
        let a = (self.a as u32 * coverage as u32 + 127) / 255;
        Rgba { a: a as u8, ..self }
    }
}

/// Byte layout used when a bitmap is exported as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Rgba32,
    Argb32,
    Bgra32,
}

impl PixelFormat {
    /// Parse the names used in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rgba32" | "rgba" => Some(PixelFormat::Rgba32),
            "argb32" | "argb" => Some(PixelFormat::Argb32),
            "bgra32" | "bgra" => Some(PixelFormat::Bgra32),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Rgba32 => "rgba32",
            PixelFormat::Argb32 => "argb32",
            PixelFormat::Bgra32 => "bgra32",
        }
    }

    fn encode(&self, px: Rgba) -> [u8; 4] {
        match self {
            PixelFormat::Rgba32 => [px.r, px.g, px.b, px.a],
            PixelFormat::Argb32 => [px.a, px.r, px.g, px.b],
            PixelFormat::Bgra32 => [px.b, px.g, px.r, px.a],
        }
    }
}

/// A decoded RGBA bitmap, rows top-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<Rgba>,
}

impl Bitmap {
    /// Create a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Create a bitmap where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::default(),
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Wrap already decoded pixels. Returns `None` when the pixel count
    /// does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            format: PixelFormat::default(),
            pixels,
        })
    }

    /// Same pixels, tagged with another export format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn get(&self, x: i64, y: i64) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Set the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    /// One row of pixels.
    pub fn row(&self, y: u32) -> &[Rgba] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Fill a rectangle, clipped to the bitmap.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for yy in y..y_end {
            for xx in x..x_end {
                self.pixels[yy as usize * self.width as usize + xx as usize] = color;
            }
        }
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    /// Raw bytes in this bitmap's [`PixelFormat`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            out.extend_from_slice(&self.format.encode(*px));
        }
        out
    }

    /// Convenience to move the bitmap into a shared handle.
    pub fn into_handle(self) -> BitmapHandle {
        Arc::new(self)
    }
}

/// A sprite sheet inside a shared bitmap.
///
/// `offset` is the origin of the sheet inside `bitmap`: target pixel
/// `(x, y)` samples `(x + offset.0, y + offset.1)`.
#[derive(Debug, Clone)]
pub struct LayerSource {
    pub bitmap: BitmapHandle,
    pub offset: (i32, i32),
}

impl LayerSource {
    pub fn new(bitmap: BitmapHandle) -> Self {
        Self {
            bitmap,
            offset: (0, 0),
        }
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = (x, y);
        self
    }

    /// Sample the layer at a target coordinate; transparent outside.
    pub fn sample(&self, x: u32, y: u32) -> Rgba {
        self.bitmap
            .get(x as i64 + self.offset.0 as i64, y as i64 + self.offset.1 as i64)
            .unwrap_or(Rgba::TRANSPARENT)
    }
}

impl PartialEq for LayerSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bitmap, &other.bitmap) && self.offset == other.offset
    }
}

impl Eq for LayerSource {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_opaque_replaces() {
        let src = Rgba::opaque(10, 20, 30);
        let dst = Rgba::opaque(200, 200, 200);
        assert_eq!(src.over(dst), src);
    }

    #[test]
    fn test_over_transparent_keeps_destination() {
        let dst = Rgba::opaque(200, 100, 50);
        assert_eq!(Rgba::TRANSPARENT.over(dst), dst);
    }

    #[test]
    fn test_over_half_alpha_on_empty_keeps_color() {
        let src = Rgba::new(100, 150, 200, 128);
        let out = src.over(Rgba::TRANSPARENT);
        assert_eq!(out, src);
    }

    #[test]
    fn test_over_half_alpha_on_opaque_mixes() {
        let src = Rgba::new(255, 0, 0, 128);
        let out = src.over(Rgba::opaque(0, 0, 255));
        assert_eq!(out.a, 255);
        assert!(out.r > 120 && out.r < 135);
        assert!(out.b > 120 && out.b < 135);
    }

    #[test]
    fn test_masked_scales_alpha() {
        let c = Rgba::opaque(1, 2, 3);
        assert_eq!(c.masked(255), c);
        assert_eq!(c.masked(0).a, 0);
        assert_eq!(c.masked(0).r, 1);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(Bitmap::from_pixels(2, 2, vec![Rgba::TRANSPARENT; 3]).is_none());
        assert!(Bitmap::from_pixels(2, 2, vec![Rgba::TRANSPARENT; 4]).is_some());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let b = Bitmap::new(4, 4);
        assert!(b.get(-1, 0).is_none());
        assert!(b.get(4, 0).is_none());
        assert_eq!(b.get(3, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut b = Bitmap::new(4, 4);
        b.fill_rect(2, 2, 10, 10, Rgba::opaque(9, 9, 9));
        assert_eq!(b.get(3, 3), Some(Rgba::opaque(9, 9, 9)));
        assert_eq!(b.get(1, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_to_bytes_respects_format() {
        let px = Rgba::new(1, 2, 3, 4);
        let b = Bitmap::filled(1, 1, px);
        assert_eq!(b.to_bytes(), vec![1, 2, 3, 4]);
        let b = b.with_format(PixelFormat::Argb32);
        assert_eq!(b.to_bytes(), vec![4, 1, 2, 3]);
        let b = b.with_format(PixelFormat::Bgra32);
        assert_eq!(b.to_bytes(), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_layer_sample_uses_offset() {
        let mut b = Bitmap::new(8, 8);
        b.set(5, 6, Rgba::opaque(7, 7, 7));
        let layer = LayerSource::new(b.into_handle()).with_offset(5, 6);
        assert_eq!(layer.sample(0, 0), Rgba::opaque(7, 7, 7));
        assert_eq!(layer.sample(10, 10), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_pixel_format_names() {
        assert_eq!(PixelFormat::from_name("ARGB32"), Some(PixelFormat::Argb32));
        assert_eq!(PixelFormat::from_name("nope"), None);
        assert_eq!(PixelFormat::Bgra32.name(), "bgra32");
    }
}
