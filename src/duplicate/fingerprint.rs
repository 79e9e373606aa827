//! Pixel-content fingerprints
//!
//! A fingerprint is the [`Identifier`] of an image's RGB samples. Two images
//! get the same fingerprint when they have the same dimensions and the same
//! red, green and blue value at every coordinate. Alpha is ignored, and so
//! are the filename and the container format the pixels were decoded from.
//!
//! # Serialization
//!
//! Pixels are visited with x in the outer loop and y in the inner loop,
//! from the image's minimum bound up to (but excluding) its maximum bound.
//! Each channel is a 16-bit value written in decimal, and all values are
//! concatenated without separators before hashing. Different digit strings
//! that split into the same concatenation collide; this is accepted.
//!
//! # Example
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use image_dupe::duplicate::fingerprint::fingerprint;
//!
//! let black = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
//! let clear = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
//! assert_eq!(fingerprint(&black), fingerprint(&clear));
//! ```

use super::identifier::{ContentHasher, Identifier};
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use std::fmt::Write;

/// The fingerprint of an image's pixel content
pub type Fingerprint = Identifier;

/// 16-bit RGBA buffer, as produced by [`DynamicImage::to_rgba16`]
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Rectangle of valid pixel coordinates; `max` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds starting at the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_extent(width), clamp_extent(height))
    }

    pub fn width(&self) -> i32 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// The same rectangle moved by `(dx, dy)`, clamped to the `i32` range
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.min_x.saturating_add(dx),
            self.min_y.saturating_add(dy),
            self.max_x.saturating_add(dx),
            self.max_y.saturating_add(dy),
        )
    }
}

fn clamp_extent(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Anything with bounds and 16-bit RGBA pixels.
pub trait PixelSource {
    fn bounds(&self) -> Bounds;

    /// Channels of the pixel at `(x, y)`, which lies inside `bounds()`
    fn rgba(&self, x: i32, y: i32) -> [u16; 4];
}

impl PixelSource for Rgba16Image {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    fn rgba(&self, x: i32, y: i32) -> [u16; 4] {
        self.get_pixel(x as u32, y as u32).0
    }
}

impl PixelSource for RgbaImage {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    /// 8-bit channels are widened so 0xff becomes 0xffff
    fn rgba(&self, x: i32, y: i32) -> [u16; 4] {
        self.get_pixel(x as u32, y as u32).0.map(|c| u16::from(c) * 257)
    }
}

/// A pixel source placed at a different origin.
///
/// Coordinates are shifted by `(dx, dy)`; pixel values are unchanged, so the
/// fingerprint is the same as the inner source's.
#[derive(Debug, Clone)]
pub struct Translated<I> {
    inner: I,
    dx: i32,
    dy: i32,
}

impl<I: PixelSource> Translated<I> {
    pub fn new(inner: I, dx: i32, dy: i32) -> Self {
        Self { inner, dx, dy }
    }
}

impl<I: PixelSource> PixelSource for Translated<I> {
    fn bounds(&self) -> Bounds {
        self.inner.bounds().translate(self.dx, self.dy)
    }

    fn rgba(&self, x: i32, y: i32) -> [u16; 4] {
        self.inner
            .rgba(x.saturating_sub(self.dx), y.saturating_sub(self.dy))
    }
}

/// Visit every `(r, g, b)` sample in traversal order (x outer, y inner).
fn for_each_sample<P, F>(image: &P, mut f: F)
where
    P: PixelSource + ?Sized,
    F: FnMut(u16, u16, u16),
{
    let b = image.bounds();
    for x in b.min_x..b.max_x {
        for y in b.min_y..b.max_y {
            let [r, g, bl, _alpha] = image.rgba(x, y);
            f(r, g, bl);
        }
    }
}

/// The exact byte sequence that gets hashed for `image`
pub fn encode_samples<P: PixelSource + ?Sized>(image: &P) -> Vec<u8> {
    let mut out = String::new();
    for_each_sample(image, |r, g, b| {
        let _ = write!(out, "{}{}{}", r, g, b);
    });
    out.into_bytes()
}

/// Fingerprint any pixel source.
///
/// Streams the encoded samples into the digest instead of building the
/// whole buffer first; the result equals
/// `Identifier::from_bytes(&encode_samples(image))`.
pub fn fingerprint<P: PixelSource + ?Sized>(image: &P) -> Fingerprint {
    let mut hasher = ContentHasher::new();
    let mut scratch = String::with_capacity(18);

    for_each_sample(image, |r, g, b| {
        scratch.clear();
        let _ = write!(scratch, "{}{}{}", r, g, b);
        hasher.update(scratch.as_bytes());
    });

    hasher.finish()
}

/// Fingerprint a decoded image of any pixel format
pub fn fingerprint_image(image: &DynamicImage) -> Fingerprint {
    fingerprint(&image.to_rgba16())
}
