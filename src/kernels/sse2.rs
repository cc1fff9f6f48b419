//! SSE2 kernels (16-byte vectors).
//!
//! Safety:
//! - This file is allowed to use `unsafe` for ISA-specific intrinsics.
//! - The safe wrappers are only reachable through [`crate::Kernels`], which binds them after the
//!   probe reported SSE2 (or the build requires it).

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::scalar;

/// Narrowest mask (in pixels) the vector mask blend accepts.
pub(crate) const MASK_MIN_WIDTH: u32 = 4;

pub(super) fn mean(a: &[u8], b: &[u8], out: &mut [u8]) {
    // SAFETY: bound only when SSE2 is available.
    unsafe { mean_impl(a, b, out) }
}

pub(super) fn accumulate(dst: &mut [u8], src: &[u8]) {
    // SAFETY: bound only when SSE2 is available.
    unsafe { saturating_impl(dst, src, false) }
}

pub(super) fn subtract(dst: &mut [u8], src: &[u8]) {
    // SAFETY: bound only when SSE2 is available.
    unsafe { saturating_impl(dst, src, true) }
}

pub(super) fn blend(dst: &mut [u32], src: &[u32], alpha: u8) {
    // SAFETY: bound only when SSE2 is available.
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
    // SAFETY: bound only when SSE2 is available.
    unsafe { mask_row_impl(dst, s1, s2, mask_row, x0, threshold) }
}

/// # Safety
/// The CPU must support SSE2.
#[target_feature(enable = "sse2")]
unsafe fn mean_impl(a: &[u8], b: &[u8], out: &mut [u8]) {
    let n = out.len().min(a.len()).min(b.len());
    let (a, b, out) = (&a[..n], &b[..n], &mut out[..n]);
    let head = out.as_ptr().align_offset(16).min(n);
    let end = head + (n - head) / 16 * 16;

    scalar::mean(&a[..head], &b[..head], &mut out[..head]);

    // SAFETY: `head..end` is in bounds for all three slices and advances by whole vectors;
    // `out + head` is 16-byte aligned.
    unsafe {
        let low7 = _mm_set1_epi8(0x7F);
        let mut i = head;
        while i < end {
            let x = _mm_loadu_si128(a.as_ptr().add(i).cast());
            let y = _mm_loadu_si128(b.as_ptr().add(i).cast());
            // a 16-bit shift drags the neighbour's low bit into bit 7; the mask drops it
            let x = _mm_and_si128(_mm_srli_epi16(x, 1), low7);
            let y = _mm_and_si128(_mm_srli_epi16(y, 1), low7);
            _mm_store_si128(out.as_mut_ptr().add(i).cast(), _mm_adds_epu8(x, y));
            i += 16;
        }
    }

    scalar::mean(&a[end..], &b[end..], &mut out[end..]);
}

/// # Safety
/// The CPU must support SSE2.
#[target_feature(enable = "sse2")]
unsafe fn saturating_impl(dst: &mut [u8], src: &[u8], sub: bool) {
    let tail = if sub {
        scalar::subtract
    } else {
        scalar::accumulate
    };
    let n = dst.len().min(src.len());
    let (dst, src) = (&mut dst[..n], &src[..n]);
    let head = dst.as_ptr().align_offset(16).min(n);
    let end = head + (n - head) / 16 * 16;

    tail(&mut dst[..head], &src[..head]);

    // SAFETY: `head..end` is in bounds for both slices and advances by whole vectors;
    // `dst + head` is 16-byte aligned.
    unsafe {
        let mut i = head;
        while i < end {
            let s = _mm_loadu_si128(src.as_ptr().add(i).cast());
            let d = _mm_load_si128(dst.as_ptr().add(i).cast());
            let r = if sub {
                _mm_subs_epu8(d, s)
            } else {
                _mm_adds_epu8(d, s)
            };
            _mm_store_si128(dst.as_mut_ptr().add(i).cast(), r);
            i += 16;
        }
    }

    tail(&mut dst[end..], &src[end..]);
}

/// `0x????gg??` -> `0x000000gg`
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn extract_g(v: __m128i) -> __m128i {
    _mm_and_si128(_mm_srli_epi32(v, 8), _mm_set1_epi32(0xFF))
}

/// `0x0000gg??` -> `0x00gg00gg`
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn widen_g16(v: __m128i) -> __m128i {
    let shifted = _mm_srli_epi32(v, 8);
    _mm_or_si128(shifted, _mm_slli_epi32(shifted, 16))
}

super::x86_common::x86_blend_kernels!("sse2");
