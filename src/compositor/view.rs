use serde::Serialize;

use crate::compositor::layer::{Layer, LayerType, LayerTypes};
use crate::compositor::slot::SlotRef;

/// One image the renderer should draw this frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrawEntry<T> {
    /// Reference to the composited image.
    pub slot: SlotRef,
    /// Its draw position.
    pub layer: Layer,
    /// Texture to draw.
    pub texture: T,
    /// Content changed since the last [`crate::Compositor::clear_updated`].
    pub updated: bool,
}

/// Visibility and ordering state of one compositor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ViewState {
    pub(crate) active: LayerTypes,
    pub(crate) sprite_range: (u16, u16),
    pub(crate) human_order: Vec<u16>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active: LayerTypes::all(),
            sprite_range: (0, u16::MAX),
            human_order: Vec::new(),
        }
    }
}

impl ViewState {
    /// Whether a shown image on `layer` passes the type mask and sprite range.
    pub(crate) fn admits(&self, layer: Layer) -> bool {
        if !self.active.contains(layer.kind.flag()) {
            return false;
        }
        let (first, last) = self.sprite_range;
        layer.kind != LayerType::Sprite || (first..=last).contains(&layer.ordinal)
    }

    /// Draw-order key. Listed humans rank by the first position of their ordinal in the list;
    /// unlisted ones rank after every listed one.
    pub(crate) fn sort_key(&self, layer: Layer, seq: u64) -> (LayerType, usize, u16, u64) {
        let rank = match layer.kind {
            LayerType::Human if !self.human_order.is_empty() => self
                .human_order
                .iter()
                .position(|&n| n == layer.ordinal)
                .unwrap_or(self.human_order.len()),
            _ => 0,
        };
        (layer.kind, rank, layer.ordinal, seq)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/view.rs"]
mod tests;
