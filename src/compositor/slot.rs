use serde::{Deserialize, Serialize};

use crate::compositor::layer::Layer;
use crate::foundation::error::{VnError, VnResult};

/// Handle to a composited image.
///
/// Holds the slot index and the sequence number the slot was given when this image was placed in
/// it. Once the image is deleted the reference stays stale forever, even if the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// Pool index.
    pub index: u32,
    /// Sequence number captured at creation.
    pub seq: u64,
}

impl SlotRef {
    pub(crate) fn stale(self) -> VnError {
        VnError::StaleReference {
            index: self.index,
            seq: self.seq,
        }
    }
}

/// One pool entry. `texture` is `Some` exactly while the slot is in use.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub(crate) texture: Option<T>,
    pub(crate) layer: Layer,
    pub(crate) seq: u64,
    pub(crate) owned: bool,
    pub(crate) shown: bool,
    pub(crate) updated: bool,
}

impl<T> Slot<T> {
    pub(crate) fn in_use(&self) -> bool {
        self.texture.is_some()
    }
}

/// Growable slot pool with sequence-checked references.
///
/// Allocation reuses the lowest free slot; freeing trims trailing free slots so `len` follows the
/// highest slot in use.
#[derive(Debug)]
pub(crate) struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    next_seq: u64,
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> SlotPool<T> {
    pub(crate) fn allocate(&mut self, texture: T, layer: Layer, owned: bool) -> SlotRef {
        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = Slot {
            texture: Some(texture),
            layer,
            seq,
            owned,
            shown: false,
            updated: false,
        };

        let index = match self.slots.iter().position(|s| !s.in_use()) {
            Some(i) => {
                self.slots[i] = slot;
                i
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        tracing::debug!(index, seq, ?layer, owned, "slot allocated");
        SlotRef {
            index: index as u32,
            seq,
        }
    }

    pub(crate) fn get(&self, r: SlotRef) -> VnResult<&Slot<T>> {
        match self.slots.get(r.index as usize) {
            Some(s) if s.in_use() && s.seq == r.seq => Ok(s),
            _ => Err(r.stale()),
        }
    }

    pub(crate) fn get_mut(&mut self, r: SlotRef) -> VnResult<&mut Slot<T>> {
        match self.slots.get_mut(r.index as usize) {
            Some(s) if s.in_use() && s.seq == r.seq => Ok(s),
            _ => Err(r.stale()),
        }
    }

    /// Mark the slot free and hand back its texture and ownership flag.
    pub(crate) fn release(&mut self, r: SlotRef) -> VnResult<(T, bool)> {
        let slot = self.get_mut(r)?;
        let owned = slot.owned;
        let texture = slot.texture.take().ok_or_else(|| r.stale())?;
        slot.shown = false;
        slot.updated = false;

        let before = self.slots.len();
        while self.slots.last().is_some_and(|s| !s.in_use()) {
            self.slots.pop();
        }
        tracing::debug!(
            index = r.index,
            seq = r.seq,
            trimmed = before - self.slots.len(),
            "slot freed"
        );
        Ok((texture, owned))
    }

    /// Pool length, including free slots below the highest one in use.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.in_use()).count()
    }

    pub(crate) fn iter_live(&self) -> impl Iterator<Item = (SlotRef, &Slot<T>)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.in_use().then_some((
                SlotRef {
                    index: i as u32,
                    seq: s.seq,
                },
                s,
            ))
        })
    }

    pub(crate) fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Slot<T>> {
        self.slots.iter_mut().filter(|s| s.in_use())
    }

    /// Empty the pool, yielding every owned texture still in use.
    pub(crate) fn drain_owned(&mut self) -> Vec<T> {
        self.slots
            .drain(..)
            .filter(|s| s.owned)
            .filter_map(|s| s.texture)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/slot.rs"]
mod tests;
