use crate::foundation::core::{Rect, Size};
use crate::foundation::error::{VnError, VnResult};

/// CPU-side ARGB8888 image.
///
/// Pixels are `0xAARRGGBB` words in row-major order with no row padding. This is the format the
/// pixel kernels operate on and the layout uploaded to backend textures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Surface {
    /// A transparent black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// A surface with every pixel set to `argb`.
    pub fn filled(width: u32, height: u32, argb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![argb; (width as usize) * (height as usize)],
        }
    }

    /// Wrap an existing pixel vector; its length must be exactly `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> VnResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| VnError::buffer("surface size overflow"))?;
        if pixels.len() != expected {
            return Err(VnError::buffer(format!(
                "surface expects {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert straight-alpha RGBA8 into ARGB8888.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
            })
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }

    /// Convert back into straight-alpha RGBA8.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(self.width, self.height);
        for (dst, &px) in out.pixels_mut().zip(&self.pixels) {
            dst.0 = [(px >> 16) as u8, (px >> 8) as u8, px as u8, (px >> 24) as u8];
        }
        out
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Rectangle covering the whole surface.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Bytes between the starts of two consecutive rows.
    pub fn row_stride(&self) -> usize {
        (self.width as usize) * 4
    }

    /// Pixels of row `y`. Panics when `y` is out of range.
    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.width as usize;
        let start = (y as usize) * w;
        &self.pixels[start..start + w]
    }

    /// Mutable pixels of row `y`. Panics when `y` is out of range.
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let w = self.width as usize;
        let start = (y as usize) * w;
        &mut self.pixels[start..start + w]
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + (x as usize))
            .copied()
    }

    /// Set the pixel at `(x, y)`. Returns `false` outside the surface.
    pub fn put(&mut self, x: u32, y: u32, argb: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let w = self.width as usize;
        self.pixels[(y as usize) * w + (x as usize)] = argb;
        true
    }

    /// Raw pixel bytes in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Bytes starting at the top-left corner of `rect`, running to the end of the surface.
    ///
    /// Paired with [`Surface::row_stride`] this addresses the sub-image that an upload of
    /// `rect.w` x `rect.h` pixels reads from.
    pub fn region_bytes(&self, rect: Rect) -> VnResult<&[u8]> {
        if !rect.fits_within(self.bounds()) {
            return Err(VnError::buffer(format!(
                "region {rect:?} is outside the {}x{} surface",
                self.width, self.height
            )));
        }
        let offset = (rect.y as usize) * self.row_stride() + (rect.x as usize) * 4;
        Ok(&self.as_bytes()[offset..])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/surface.rs"]
mod tests;
