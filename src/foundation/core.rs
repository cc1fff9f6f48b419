use serde::{Deserialize, Serialize};

/// Integer pixel rectangle. The origin may be negative; the extent never is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from origin and extent.
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle at the origin covering `size`.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.w, size.h)
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    fn right(self) -> i64 {
        i64::from(self.x) + i64::from(self.w)
    }

    fn bottom(self) -> i64 {
        i64::from(self.y) + i64::from(self.h)
    }

    /// Overlap of `self` and `other`; an empty rect when they do not meet.
    pub fn intersect(self, other: Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= i64::from(x0) || y1 <= i64::from(y0) {
            return Rect::new(x0, y0, 0, 0);
        }
        Rect::new(
            x0,
            y0,
            (x1 - i64::from(x0)) as u32,
            (y1 - i64::from(y0)) as u32,
        )
    }

    /// True when `self` lies fully inside `bounds`.
    pub fn fits_within(self, bounds: Rect) -> bool {
        self.intersect(bounds) == self && !self.is_empty()
    }
}

/// Width and height of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Size {
    /// Construct a size.
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

/// Pixel layout of backend textures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Packed 32-bit `0xAARRGGBB` pixels in native byte order.
    #[default]
    Argb8888,
    /// Planar 4:2:0 YUV (full-size Y plane followed by quarter-size V and U planes).
    Yv12,
}

impl PixelFormat {
    /// Bytes needed to store a `w` x `h` image, or `None` on overflow.
    pub fn bytes_for(self, w: u32, h: u32) -> Option<usize> {
        let px = (w as usize).checked_mul(h as usize)?;
        match self {
            PixelFormat::Argb8888 => px.checked_mul(4),
            PixelFormat::Yv12 => {
                let chroma = (w as usize).div_ceil(2).checked_mul((h as usize).div_ceil(2))?;
                px.checked_add(chroma.checked_mul(2)?)
            }
        }
    }

    /// Bytes per row of the first (or only) plane.
    pub fn row_bytes(self, w: u32) -> usize {
        match self {
            PixelFormat::Argb8888 => (w as usize) * 4,
            PixelFormat::Yv12 => w as usize,
        }
    }

    /// True for planar YUV layouts.
    pub fn is_planar(self) -> bool {
        matches!(self, PixelFormat::Yv12)
    }
}

/// How the host backend combines a texture with what is already on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Copy source pixels.
    #[default]
    None,
    /// Straight-alpha "over".
    Blend,
    /// Additive.
    Add,
    /// Color modulate.
    Mod,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
