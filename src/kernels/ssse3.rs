//! SSSE3 kernels: the SSE2 blend bodies with `pshufb` byte extraction.
//!
//! Safety:
//! - This file is allowed to use `unsafe` for ISA-specific intrinsics.
//! - The safe wrappers are only reachable through [`crate::Kernels`], which binds them after the
//!   probe reported SSSE3 (or the build requires it).

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

pub(crate) use super::sse2::MASK_MIN_WIDTH;

// shuffle index that zeroes the destination byte
const Z: i8 = -128;

pub(super) fn blend(dst: &mut [u32], src: &[u32], alpha: u8) {
    // SAFETY: bound only when SSSE3 is available.
    unsafe { blend_impl(dst, src, alpha) }
}

pub(super) fn mask_row(
    dst: &mut [u32],
    s1: &[u32],
    s2: &[u32],
    mask_row: &[u32],
    x0: usize,
    threshold: u32,
) {
    // SAFETY: bound only when SSSE3 is available.
    unsafe { mask_row_impl(dst, s1, s2, mask_row, x0, threshold) }
}

/// `0x????gg??` -> `0x000000gg`
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn extract_g(v: __m128i) -> __m128i {
    let idx = _mm_setr_epi8(1, Z, Z, Z, 5, Z, Z, Z, 9, Z, Z, Z, 13, Z, Z, Z);
    _mm_shuffle_epi8(v, idx)
}

/// `0x0000gg??` -> `0x00gg00gg`
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn widen_g16(v: __m128i) -> __m128i {
    let idx = _mm_setr_epi8(1, Z, 1, Z, 5, Z, 5, Z, 9, Z, 9, Z, 13, Z, 13, Z);
    _mm_shuffle_epi8(v, idx)
}

super::x86_common::x86_blend_kernels!("ssse3");
