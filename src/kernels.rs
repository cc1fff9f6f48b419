//! Pixel kernels and the per-process dispatch table.
//!
//! Each operation has a scalar reference implementation and, per CPU [`Tier`], an optional
//! faster one. [`Kernels`] binds one implementation per operation; tiers upgrade operations
//! individually, so a host may run a vector `mean` next to a scalar `mask_blend`.
//!
//! All bulk kernels share the same shape: scalar code until the destination reaches the tier's
//! alignment, full vectors through the body, scalar code for the remainder. Results are
//! bit-identical across tiers.

use serde::Serialize;

use crate::config::KernelOpts;
use crate::cpu::{self, Tier};
use crate::foundation::core::Rect;
use crate::foundation::error::{VnError, VnResult};
use crate::foundation::surface::Surface;

pub(crate) mod scalar;
mod swar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod sse2;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod ssse3;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86_common;

/// `out[i] = a[i] / 2 + b[i] / 2`
pub type MeanFn = fn(&[u8], &[u8], &mut [u8]);
/// `dst[i] = dst[i] (+|-) src[i]`, saturating.
pub type SaturatingFn = fn(&mut [u8], &[u8]);
/// Straight-alpha blend of ARGB pixels scaled by a global alpha.
pub type BlendFn = fn(&mut [u32], &[u32], u8);
/// One row of a mask blend: `(dst, s1, s2, mask_row, x0, threshold)`.
pub type MaskRowFn = fn(&mut [u32], &[u32], &[u32], &[u32], usize, u32);

/// The tier each operation of a [`Kernels`] table was bound from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct KernelBindings {
    /// Tier of [`Kernels::mean`].
    pub mean: Tier,
    /// Tier of [`Kernels::accumulate`].
    pub accumulate: Tier,
    /// Tier of [`Kernels::subtract`].
    pub subtract: Tier,
    /// Tier of [`Kernels::blend`].
    pub blend: Tier,
    /// Tier of [`Kernels::mask_blend`].
    pub mask_blend: Tier,
}

impl KernelBindings {
    const BASIC: Self = Self {
        mean: Tier::Null,
        accumulate: Tier::Null,
        subtract: Tier::Null,
        blend: Tier::Null,
        mask_blend: Tier::Null,
    };
}

/// Dispatch table of pixel kernels, all selected once at construction.
///
/// The value is plain data (`Copy`); several tables for different tiers can coexist.
#[derive(Clone, Copy, Debug)]
pub struct Kernels {
    tier: Tier,
    bindings: KernelBindings,
    mean: MeanFn,
    accumulate: SaturatingFn,
    subtract: SaturatingFn,
    blend: BlendFn,
    mask_row: MaskRowFn,
    mask_min_width: u32,
}

impl Default for Kernels {
    fn default() -> Self {
        Self::basic()
    }
}

impl Kernels {
    /// The scalar set; available on every host.
    pub fn basic() -> Self {
        Self {
            tier: Tier::Null,
            bindings: KernelBindings::BASIC,
            mean: scalar::mean,
            accumulate: scalar::accumulate,
            subtract: scalar::subtract,
            blend: scalar::blend,
            mask_row: scalar::mask_row,
            mask_min_width: 1,
        }
    }

    /// Probe the CPU and bind the fastest kernel per operation.
    pub fn accelerated() -> Self {
        Self::with_ceiling(None)
    }

    /// Like [`Kernels::accelerated`], but never above `ceiling` (when it applies to this host).
    pub fn with_ceiling(ceiling: Option<Tier>) -> Self {
        let detected = cpu::detect();
        let tier = ceiling.map_or(detected, |c| detected.capped(c));
        Self::bind(tier)
    }

    /// Table for the configured tier ceiling.
    pub fn from_opts(opts: &KernelOpts) -> Self {
        Self::with_ceiling(opts.max_tier)
    }

    /// Bind exactly `tier`, if this host can run it.
    pub fn for_tier(tier: Tier) -> Option<Self> {
        cpu::detect().includes(tier).then(|| Self::bind(tier))
    }

    /// Every tier this host can run, lowest first.
    pub fn available_tiers() -> Vec<Tier> {
        let detected = cpu::detect();
        Tier::ALL
            .into_iter()
            .filter(|&t| detected.includes(t))
            .collect()
    }

    /// Callers must have checked that the host supports `tier`.
    fn bind(tier: Tier) -> Self {
        let mut k = Self::basic();
        k.tier = tier;

        if tier.includes(Tier::Mmx) {
            k.mean = swar::mean::<8>;
            k.accumulate = swar::accumulate::<8>;
            k.subtract = swar::subtract::<8>;
            k.bindings.mean = Tier::Mmx;
            k.bindings.accumulate = Tier::Mmx;
            k.bindings.subtract = Tier::Mmx;
        }

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if tier.includes(Tier::Sse2) {
                k.mean = sse2::mean;
                k.accumulate = sse2::accumulate;
                k.subtract = sse2::subtract;
                k.blend = sse2::blend;
                k.mask_row = sse2::mask_row;
                k.mask_min_width = sse2::MASK_MIN_WIDTH;
                k.bindings = KernelBindings {
                    mean: Tier::Sse2,
                    accumulate: Tier::Sse2,
                    subtract: Tier::Sse2,
                    blend: Tier::Sse2,
                    mask_blend: Tier::Sse2,
                };
            }
            if tier.includes(Tier::Ssse3) {
                k.blend = ssse3::blend;
                k.mask_row = ssse3::mask_row;
                k.mask_min_width = ssse3::MASK_MIN_WIDTH;
                k.bindings.blend = Tier::Ssse3;
                k.bindings.mask_blend = Tier::Ssse3;
            }
        }

        if tier.includes(Tier::Altivec) {
            k.mean = swar::mean::<16>;
            k.accumulate = swar::accumulate::<16>;
            k.subtract = swar::subtract::<16>;
            k.bindings.mean = Tier::Altivec;
            k.bindings.accumulate = Tier::Altivec;
            k.bindings.subtract = Tier::Altivec;
        }

        tracing::debug!(
            tier = tier.name(),
            mean = k.bindings.mean.name(),
            accumulate = k.bindings.accumulate.name(),
            subtract = k.bindings.subtract.name(),
            blend = k.bindings.blend.name(),
            mask_blend = k.bindings.mask_blend.name(),
            "bound pixel kernels"
        );
        k
    }

    /// Tier the table was built for.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Per-operation tiers actually bound.
    pub fn bindings(&self) -> KernelBindings {
        self.bindings
    }

    /// Narrowest mask [`Kernels::mask_blend`] accepts with this table.
    pub fn mask_min_width(&self) -> u32 {
        self.mask_min_width
    }

    /// `out[i] = a[i] / 2 + b[i] / 2` with each operand's low bit dropped first.
    ///
    /// Not a rounded average: `mean(1, 1) == 0`.
    pub fn mean(&self, a: &[u8], b: &[u8], out: &mut [u8]) -> VnResult<()> {
        if a.len() != out.len() || b.len() != out.len() {
            return Err(VnError::buffer("mean expects equal-length buffers"));
        }
        (self.mean)(a, b, out);
        Ok(())
    }

    /// `dst[i] = min(255, dst[i] + src[i])`
    pub fn accumulate(&self, dst: &mut [u8], src: &[u8]) -> VnResult<()> {
        if dst.len() != src.len() {
            return Err(VnError::buffer("accumulate expects equal-length buffers"));
        }
        (self.accumulate)(dst, src);
        Ok(())
    }

    /// `dst[i] = max(0, dst[i] - src[i])`
    pub fn subtract(&self, dst: &mut [u8], src: &[u8]) -> VnResult<()> {
        if dst.len() != src.len() {
            return Err(VnError::buffer("subtract expects equal-length buffers"));
        }
        (self.subtract)(dst, src);
        Ok(())
    }

    /// Straight-alpha composite of `src` onto `dst`.
    ///
    /// Per pixel the effective alpha is `(src_alpha * alpha) >> 8` and each of red, green and blue
    /// becomes `(src * a + dst * (255 - a)) >> 8`; the destination keeps its alpha byte. An
    /// `alpha` of 0 leaves `dst` untouched and 255 copies the source colour outright.
    pub fn blend(&self, dst: &mut [u32], src: &[u32], alpha: u8) -> VnResult<()> {
        if dst.len() != src.len() {
            return Err(VnError::buffer("blend expects equal-length buffers"));
        }
        match alpha {
            0 => {}
            255 => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = (*d & 0xFF00_0000) | (s & 0x00FF_FFFF);
                }
            }
            _ => (self.blend)(dst, src, alpha),
        }
        Ok(())
    }

    /// Blend `s1` and `s2` into `dst` over `rect`, weighted by a tiling mask.
    ///
    /// For a mask byte `m` (the low byte of the mask pixel at `(x % mask_w, y % mask_h)`), the
    /// second source weighs `clamp(threshold - m, 0, 255)` and the first the rest. `rect` is
    /// clipped to all three surfaces; the output is opaque.
    ///
    /// Returns `false` without touching `dst` when the mask is empty or narrower than this
    /// table's vector width; callers then fall back to [`Kernels::basic`].
    pub fn mask_blend(
        &self,
        dst: &mut Surface,
        s1: &Surface,
        s2: &Surface,
        mask: &Surface,
        rect: Rect,
        threshold: u32,
    ) -> bool {
        if mask.height() == 0 || mask.width() == 0 || mask.width() < self.mask_min_width {
            return false;
        }
        let area = rect
            .intersect(dst.bounds())
            .intersect(s1.bounds())
            .intersect(s2.bounds());
        if area.is_empty() {
            return true;
        }

        let x0 = area.x as usize;
        let x1 = x0 + area.w as usize;
        let y0 = area.y as u32;
        for y in y0..y0 + area.h {
            (self.mask_row)(
                &mut dst.row_mut(y)[x0..x1],
                &s1.row(y)[x0..x1],
                &s2.row(y)[x0..x1],
                mask.row(y % mask.height()),
                x0,
                threshold,
            );
        }
        true
    }

    /// [`Kernels::mask_blend`] with the same weight for every pixel, as if the mask were all
    /// zero: the second source weighs `min(threshold, 255)`. `rect` is clipped the same way.
    pub fn mask_blend_const(
        &self,
        dst: &mut Surface,
        s1: &Surface,
        s2: &Surface,
        rect: Rect,
        threshold: u32,
    ) {
        const FLAT: [u32; 8] = [0; 8];

        let area = rect
            .intersect(dst.bounds())
            .intersect(s1.bounds())
            .intersect(s2.bounds());
        if area.is_empty() {
            return;
        }
        let x0 = area.x as usize;
        let x1 = x0 + area.w as usize;
        let y0 = area.y as u32;
        for y in y0..y0 + area.h {
            (self.mask_row)(
                &mut dst.row_mut(y)[x0..x1],
                &s1.row(y)[x0..x1],
                &s2.row(y)[x0..x1],
                &FLAT,
                x0,
                threshold,
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/kernels/dispatch.rs"]
mod tests;
