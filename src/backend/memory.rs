use std::collections::HashMap;

use crate::backend::{TextureBackend, TextureDesc};
use crate::foundation::core::{BlendMode, PixelFormat, Rect, Size};
use crate::foundation::error::BackendError;
use crate::foundation::surface::Surface;

/// Handle of a [`MemoryBackend`] texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    /// Raw id, unique for the lifetime of the backend that issued it.
    pub fn get(self) -> u64 {
        self.0
    }
}

struct MemTexture {
    desc: TextureDesc,
    data: Vec<u8>,
}

/// Software texture store.
///
/// Textures are plain byte buffers. An optional byte budget makes creation fail once exceeded,
/// which stands in for a device running out of memory. Counters record every create and destroy
/// so callers can check ownership behaviour.
#[derive(Default)]
pub struct MemoryBackend {
    budget: Option<usize>,
    used_bytes: usize,
    next_id: u64,
    textures: HashMap<TextureId, MemTexture>,
    created: u64,
    destroyed: u64,
}

impl MemoryBackend {
    /// Backend without a memory limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose live textures may use at most `bytes` in total.
    pub fn with_budget(bytes: usize) -> Self {
        Self {
            budget: Some(bytes),
            ..Self::default()
        }
    }

    /// Number of textures currently alive.
    pub fn live(&self) -> usize {
        self.textures.len()
    }

    /// Textures created since construction.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Textures destroyed since construction.
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Bytes held by live textures.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Whether `id` names a live texture.
    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Descriptor of a live texture.
    pub fn desc(&self, id: TextureId) -> Option<TextureDesc> {
        self.textures.get(&id).map(|t| t.desc)
    }

    /// Current contents of a texture.
    pub fn bytes(&self, id: TextureId) -> Option<&[u8]> {
        self.textures.get(&id).map(|t| t.data.as_slice())
    }

    /// Read back an ARGB texture as a surface.
    pub fn read_surface(&self, id: TextureId) -> Option<Surface> {
        let tex = self.textures.get(&id)?;
        if tex.desc.format != PixelFormat::Argb8888 {
            return None;
        }
        let pixels = tex
            .data
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Surface::from_pixels(tex.desc.size.w, tex.desc.size.h, pixels).ok()
    }

    fn insert(&mut self, desc: TextureDesc, data: Vec<u8>) -> Result<TextureId, BackendError> {
        let len = data.len();
        if let Some(budget) = self.budget
            && self.used_bytes.saturating_add(len) > budget
        {
            return Err(BackendError::create(format!(
                "out of texture memory: {len} bytes requested, {} of {budget} in use",
                self.used_bytes
            )));
        }
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.used_bytes += len;
        self.created += 1;
        self.textures.insert(id, MemTexture { desc, data });
        Ok(id)
    }
}

impl TextureBackend for MemoryBackend {
    type Texture = TextureId;

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId, BackendError> {
        let len = desc.byte_len().ok_or_else(|| {
            BackendError::create(format!(
                "texture size {}x{} overflows",
                desc.size.w, desc.size.h
            ))
        })?;
        if let Some(budget) = self.budget
            && len > budget
        {
            // refuse before allocating the buffer
            return Err(BackendError::create(format!(
                "texture of {len} bytes exceeds the {budget} byte budget"
            )));
        }
        self.insert(*desc, vec![0; len])
    }

    fn create_texture_from_surface(
        &mut self,
        surface: &Surface,
        blend: BlendMode,
    ) -> Result<TextureId, BackendError> {
        let desc = TextureDesc::argb(surface.size(), blend);
        self.insert(desc, surface.as_bytes().to_vec())
    }

    fn update_texture(
        &mut self,
        texture: &TextureId,
        rect: Option<Rect>,
        bytes: &[u8],
        row_stride: usize,
    ) -> Result<(), BackendError> {
        let tex = self
            .textures
            .get_mut(texture)
            .ok_or_else(|| BackendError::update(format!("unknown texture {texture:?}")))?;
        let Size { w, h } = tex.desc.size;
        let full = Rect::new(0, 0, w, h);
        let rect = rect.unwrap_or(full);
        if rect.is_empty() {
            return Ok(());
        }
        if !rect.fits_within(full) {
            return Err(BackendError::update(format!(
                "update region {rect:?} is outside the {w}x{h} texture"
            )));
        }

        if tex.desc.format.is_planar() {
            if rect != full {
                return Err(BackendError::update(
                    "planar textures only accept whole-texture updates",
                ));
            }
            let len = tex.data.len();
            if bytes.len() < len {
                return Err(BackendError::update(format!(
                    "planar update needs {len} bytes, got {}",
                    bytes.len()
                )));
            }
            tex.data.copy_from_slice(&bytes[..len]);
            return Ok(());
        }

        let row_bytes = tex.desc.format.row_bytes(rect.w);
        if row_stride < row_bytes {
            return Err(BackendError::update(format!(
                "row stride {row_stride} is shorter than a {row_bytes} byte row"
            )));
        }
        let needed = (rect.h as usize - 1)
            .checked_mul(row_stride)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| {
                BackendError::update(format!(
                    "row stride {row_stride} overflows a {} row update",
                    rect.h
                ))
            })?;
        if bytes.len() < needed {
            return Err(BackendError::update(format!(
                "update needs {needed} bytes, got {}",
                bytes.len()
            )));
        }

        let tex_stride = tex.desc.format.row_bytes(w);
        let x_off = tex.desc.format.row_bytes(rect.x as u32);
        for row in 0..rect.h as usize {
            let dst = (rect.y as usize + row) * tex_stride + x_off;
            let src = row * row_stride;
            tex.data[dst..dst + row_bytes].copy_from_slice(&bytes[src..src + row_bytes]);
        }
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        match self.textures.remove(&texture) {
            Some(tex) => {
                self.used_bytes -= tex.data.len();
                self.destroyed += 1;
            }
            None => tracing::warn!(texture = texture.0, "destroy of unknown texture ignored"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/memory.rs"]
mod tests;
