//! Composited-image pool plus the per-frame visibility and ordering view.
//!
//! A [`Compositor`] owns a [`TextureBackend`] and a pool of slots. Each slot wraps one backend
//! texture with a [`Layer`] key and shown/updated flags, and is addressed through a [`SlotRef`].
//! References are checked on every use: a reference to a freed slot fails with
//! [`crate::VnError::StaleReference`], even after the slot has been handed to a new image.
//!
//! The compositor never draws. Each frame the renderer asks for [`Compositor::draw_list`], which
//! filters the pool by the active types and sprite range and sorts it into draw order.

use crate::backend::{TextureBackend, TextureDesc};
use crate::config::ViewOpts;
use crate::foundation::core::{BlendMode, PixelFormat, Rect, Size};
use crate::foundation::error::VnResult;
use crate::foundation::surface::Surface;

mod layer;
mod slot;
mod view;

pub use layer::{Layer, LayerType, LayerTypes};
pub use slot::SlotRef;
pub use view::DrawEntry;

use slot::SlotPool;
use view::ViewState;

/// Slot manager for composited images backed by `B`.
///
/// Single-owner and single-threaded; callers serialize access. Dropping the compositor destroys
/// every owned texture still in the pool.
pub struct Compositor<B: TextureBackend> {
    backend: B,
    pool: SlotPool<B::Texture>,
    view: ViewState,
}

impl<B: TextureBackend> Compositor<B> {
    /// An empty compositor with every layer type active and no sprite or human restrictions.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pool: SlotPool::default(),
            view: ViewState::default(),
        }
    }

    /// An empty compositor whose view starts from `opts`.
    pub fn with_view_opts(backend: B, opts: &ViewOpts) -> Self {
        let mut c = Self::new(backend);
        c.set_active_types(opts.active_types.iter().copied().collect());
        c.set_active_sprite_range(opts.sprite_range.0, opts.sprite_range.1);
        c.set_human_order(&opts.human_order);
        c
    }

    /// The texture backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create a texture the caller owns.
    #[tracing::instrument(skip(self))]
    pub fn new_image(&mut self, desc: &TextureDesc) -> VnResult<B::Texture> {
        Ok(self.backend.create_texture(desc)?)
    }

    /// Create a caller-owned texture holding a copy of `surface`.
    #[tracing::instrument(skip(self, surface), fields(w = surface.width(), h = surface.height()))]
    pub fn new_image_from(&mut self, surface: &Surface, blend: BlendMode) -> VnResult<B::Texture> {
        Ok(self.backend.create_texture_from_surface(surface, blend)?)
    }

    /// Upload into a caller-owned texture. Returns `false` when the backend rejected the upload;
    /// the texture then keeps its old content.
    ///
    /// Textures wrapped in a composited image should go through [`Compositor::update_composited`]
    /// so the slot's `updated` flag is raised.
    pub fn update_image(
        &mut self,
        texture: &B::Texture,
        rect: Option<Rect>,
        bytes: &[u8],
        row_stride: usize,
    ) -> bool {
        upload(&mut self.backend, texture, rect, bytes, row_stride)
    }

    /// Upload `src_rect` of `surface` (all of it when `None`) into `dst_rect` of `texture`.
    pub fn update_image_from(
        &mut self,
        texture: &B::Texture,
        surface: &Surface,
        src_rect: Option<Rect>,
        dst_rect: Option<Rect>,
    ) -> VnResult<bool> {
        let bytes = source_bytes(surface, src_rect)?;
        Ok(upload(
            &mut self.backend,
            texture,
            dst_rect,
            bytes,
            surface.row_stride(),
        ))
    }

    /// Destroy a caller-owned texture.
    #[tracing::instrument(skip(self))]
    pub fn delete_image(&mut self, texture: B::Texture) {
        self.backend.destroy_texture(texture);
    }

    /// Wrap `texture` in a new composited image. With `owning`, deleting the image (or dropping
    /// the compositor) destroys the texture; otherwise it stays the caller's.
    ///
    /// New images start hidden.
    #[tracing::instrument(skip(self))]
    pub fn new_composited(&mut self, texture: B::Texture, layer: Layer, owning: bool) -> SlotRef {
        self.pool.allocate(texture, layer, owning)
    }

    /// Create a blank texture of `size` and wrap it in an owning composited image.
    #[tracing::instrument(skip(self))]
    pub fn new_composited_sized(
        &mut self,
        size: Size,
        layer: Layer,
        blend: BlendMode,
        planar: bool,
    ) -> VnResult<SlotRef> {
        let format = if planar {
            PixelFormat::Yv12
        } else {
            PixelFormat::Argb8888
        };
        let texture = self.backend.create_texture(&TextureDesc {
            size,
            format,
            blend,
        })?;
        Ok(self.pool.allocate(texture, layer, true))
    }

    /// Copy `surface` into a new texture and wrap it in an owning composited image.
    #[tracing::instrument(skip(self, surface), fields(w = surface.width(), h = surface.height()))]
    pub fn new_composited_from(
        &mut self,
        surface: &Surface,
        layer: Layer,
        blend: BlendMode,
    ) -> VnResult<SlotRef> {
        let texture = self.backend.create_texture_from_surface(surface, blend)?;
        Ok(self.pool.allocate(texture, layer, true))
    }

    /// Upload pixels into a composited image and mark it updated.
    ///
    /// A backend refusal is not an error: it is logged and the old content stays. The image is
    /// still marked updated and the call returns `Ok(false)`.
    pub fn update_composited(
        &mut self,
        r: SlotRef,
        rect: Option<Rect>,
        bytes: &[u8],
        row_stride: usize,
    ) -> VnResult<bool> {
        let slot = self.pool.get_mut(r)?;
        let texture = slot.texture.as_ref().ok_or_else(|| r.stale())?;
        let ok = upload(&mut self.backend, texture, rect, bytes, row_stride);
        slot.updated = true;
        Ok(ok)
    }

    /// Upload `src_rect` of `surface` into `dst_rect` of a composited image.
    pub fn update_composited_from(
        &mut self,
        r: SlotRef,
        surface: &Surface,
        src_rect: Option<Rect>,
        dst_rect: Option<Rect>,
    ) -> VnResult<bool> {
        self.pool.get(r)?;
        let bytes = source_bytes(surface, src_rect)?;
        self.update_composited(r, dst_rect, bytes, surface.row_stride())
    }

    /// Layer key of the image.
    pub fn layer(&self, r: SlotRef) -> VnResult<Layer> {
        Ok(self.pool.get(r)?.layer)
    }

    /// Show or hide the image. Hidden images never reach the draw list.
    pub fn show(&mut self, r: SlotRef, visible: bool) -> VnResult<()> {
        self.pool.get_mut(r)?.shown = visible;
        Ok(())
    }

    /// Whether the image was last shown with [`Compositor::show`].
    pub fn is_shown(&self, r: SlotRef) -> VnResult<bool> {
        Ok(self.pool.get(r)?.shown)
    }

    /// Whether the image changed since the last [`Compositor::clear_updated`].
    pub fn is_updated(&self, r: SlotRef) -> VnResult<bool> {
        Ok(self.pool.get(r)?.updated)
    }

    /// Whether deleting the image destroys its texture.
    pub fn is_owning(&self, r: SlotRef) -> VnResult<bool> {
        Ok(self.pool.get(r)?.owned)
    }

    /// Backend texture wrapped by the image.
    pub fn texture(&self, r: SlotRef) -> VnResult<&B::Texture> {
        self.pool
            .get(r)?
            .texture
            .as_ref()
            .ok_or_else(|| r.stale())
    }

    /// Free a composited image, destroying its texture if the image owns it.
    #[tracing::instrument(skip(self))]
    pub fn delete_composited(&mut self, r: SlotRef) -> VnResult<()> {
        let (texture, owned) = self.pool.release(r)?;
        if owned {
            self.backend.destroy_texture(texture);
        }
        Ok(())
    }

    /// Pool length. Free slots below the highest slot in use still count.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Number of composited images alive.
    pub fn live_count(&self) -> usize {
        self.pool.live()
    }

    /// Replace the set of drawn layer types.
    pub fn set_active_types(&mut self, types: LayerTypes) {
        self.view.active = types;
    }

    /// Draw these layer types as well.
    pub fn add_active_types(&mut self, types: LayerTypes) {
        self.view.active |= types;
    }

    /// Stop drawing these layer types.
    pub fn remove_active_types(&mut self, types: LayerTypes) {
        self.view.active &= !types;
    }

    /// Layer types currently drawn.
    pub fn active_types(&self) -> LayerTypes {
        self.view.active
    }

    /// Only sprites with `first <= ordinal <= last` are drawn.
    pub fn set_active_sprite_range(&mut self, first: u16, last: u16) {
        self.view.sprite_range = (first, last);
    }

    /// Inclusive sprite ordinal range currently drawn.
    pub fn active_sprite_range(&self) -> (u16, u16) {
        self.view.sprite_range
    }

    /// Draw humans with these ordinals first, in this order; unlisted humans follow in ordinal
    /// order. An empty list restores plain ordinal order.
    pub fn set_human_order(&mut self, order: &[u16]) {
        self.view.human_order = order.to_vec();
    }

    /// The human reorder list as last set.
    pub fn human_order(&self) -> &[u16] {
        &self.view.human_order
    }

    /// Whether the image would appear in [`Compositor::draw_list`].
    pub fn is_visible(&self, r: SlotRef) -> VnResult<bool> {
        let slot = self.pool.get(r)?;
        Ok(slot.shown && self.view.admits(slot.layer))
    }

    /// Visible images in draw order.
    ///
    /// Order is by type (background, sprite, human, text), then ordinal, with the human reorder
    /// list taking precedence within humans. Images with equal keys keep creation order.
    pub fn draw_list(&self) -> Vec<DrawEntry<B::Texture>> {
        let mut keyed: Vec<_> = self
            .pool
            .iter_live()
            .filter(|(_, s)| s.shown && self.view.admits(s.layer))
            .filter_map(|(r, s)| {
                let texture = s.texture.clone()?;
                let entry = DrawEntry {
                    slot: r,
                    layer: s.layer,
                    texture,
                    updated: s.updated,
                };
                Some((self.view.sort_key(s.layer, s.seq), entry))
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, e)| e).collect()
    }

    /// Acknowledge a drawn frame: clear every image's `updated` flag.
    pub fn clear_updated(&mut self) {
        for slot in self.pool.iter_live_mut() {
            slot.updated = false;
        }
    }
}

impl<B: TextureBackend> Drop for Compositor<B> {
    fn drop(&mut self) {
        let owned = self.pool.drain_owned();
        if !owned.is_empty() {
            tracing::debug!(count = owned.len(), "destroying owned textures");
        }
        for texture in owned {
            self.backend.destroy_texture(texture);
        }
    }
}

fn source_bytes(surface: &Surface, src_rect: Option<Rect>) -> VnResult<&[u8]> {
    match src_rect {
        Some(rect) => surface.region_bytes(rect),
        None => Ok(surface.as_bytes()),
    }
}

fn upload<B: TextureBackend>(
    backend: &mut B,
    texture: &B::Texture,
    rect: Option<Rect>,
    bytes: &[u8],
    row_stride: usize,
) -> bool {
    match backend.update_texture(texture, rect, bytes, row_stride) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(?texture, ?rect, error = %err, "texture update failed; keeping old content");
            false
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/compositor/compositor.rs"]
mod tests;
