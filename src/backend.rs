//! Host rendering backend seam.
//!
//! The compositor never touches texture memory itself. It asks a [`TextureBackend`] to create,
//! update and destroy opaque textures and only keeps the handles it is given.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{BlendMode, PixelFormat, Rect, Size};
use crate::foundation::error::BackendError;
use crate::foundation::surface::Surface;

/// In-memory backend for tests and headless tools.
pub mod memory;

/// Parameters of a texture to create.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDesc {
    /// Extent in pixels.
    pub size: Size,
    /// Pixel layout.
    pub format: PixelFormat,
    /// How the backend composites the texture when drawing it.
    pub blend: BlendMode,
}

impl TextureDesc {
    /// A packed ARGB texture.
    pub fn argb(size: Size, blend: BlendMode) -> Self {
        Self {
            size,
            format: PixelFormat::Argb8888,
            blend,
        }
    }

    /// Bytes the texture occupies, or `None` when the size overflows.
    pub fn byte_len(&self) -> Option<usize> {
        self.format.bytes_for(self.size.w, self.size.h)
    }
}

/// Texture storage provided by the host renderer.
///
/// Handles compare by identity. Every handle returned by a `create_*` call must be passed to
/// [`TextureBackend::destroy_texture`] exactly once by whoever owns it.
pub trait TextureBackend {
    /// Opaque texture handle.
    type Texture: Clone + Eq + Debug;

    /// Allocate an uninitialized texture.
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Self::Texture, BackendError>;

    /// Allocate a texture holding a copy of `surface`.
    fn create_texture_from_surface(
        &mut self,
        surface: &Surface,
        blend: BlendMode,
    ) -> Result<Self::Texture, BackendError>;

    /// Upload pixels into `rect` of `texture` (the whole texture when `None`).
    ///
    /// `bytes` starts at the first pixel of the region; consecutive rows are `row_stride` bytes
    /// apart.
    fn update_texture(
        &mut self,
        texture: &Self::Texture,
        rect: Option<Rect>,
        bytes: &[u8],
        row_stride: usize,
    ) -> Result<(), BackendError>;

    /// Release a texture.
    fn destroy_texture(&mut self, texture: Self::Texture);
}
