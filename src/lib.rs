//! vnlayers is the compositing core of a visual-novel presentation engine.
//!
//! It has two halves:
//!
//! - Pixel kernels: [`detect`] probes the CPU once, and a [`Kernels`] table binds the fastest
//!   implementation of each pixel operation for that [`Tier`]. Every tier produces the same bytes
//!   as the scalar set.
//! - Composited images: a [`Compositor`] keeps a pool of layered images backed by a host
//!   [`TextureBackend`], hands out sequence-checked [`SlotRef`]s, and produces the filtered,
//!   ordered [`Compositor::draw_list`] a renderer draws each frame.
//!
//! ```
//! use vnlayers::{BlendMode, Compositor, Layer, MemoryBackend, Surface};
//!
//! let mut comp = Compositor::new(MemoryBackend::new());
//! let bg = comp
//!     .new_composited_from(&Surface::filled(4, 4, 0xFF00_0000), Layer::background(0), BlendMode::None)
//!     .unwrap();
//! comp.show(bg, true).unwrap();
//! assert_eq!(comp.draw_list().len(), 1);
//! ```
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Host texture backend seam and the in-memory backend.
pub mod backend;
/// Composited-image pool and draw-order view.
pub mod compositor;
/// Runtime options.
pub mod config;
/// CPU capability probe.
pub mod cpu;
/// Pixel kernels and their dispatch table.
pub mod kernels;

pub use crate::backend::memory::{MemoryBackend, TextureId};
pub use crate::backend::{TextureBackend, TextureDesc};
pub use crate::compositor::{Compositor, DrawEntry, Layer, LayerType, LayerTypes, SlotRef};
pub use crate::config::{KernelOpts, ViewOpts, VnOpts};
pub use crate::cpu::{Family, Tier, detect};
pub use crate::foundation::core::{BlendMode, PixelFormat, Rect, Size};
pub use crate::foundation::error::{BackendError, VnError, VnResult};
pub use crate::foundation::surface::Surface;
pub use crate::kernels::{KernelBindings, Kernels};
