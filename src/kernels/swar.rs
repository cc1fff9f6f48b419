//! Byte-wise saturating arithmetic packed into 64-bit words (SIMD within a register).
//!
//! `CHUNK` is the vector width the tier stands in for: 8 bytes for the MMX/SSE tiers and 16 for
//! AltiVec. The destination is brought to a `CHUNK` boundary with scalar code, the body runs a
//! chunk at a time, and the remainder falls back to scalar again.

use super::scalar;

const LO: u64 = 0x7F7F_7F7F_7F7F_7F7F;
const HI: u64 = 0x8080_8080_8080_8080;

#[inline]
fn load(bytes: &[u8]) -> u64 {
    let mut w = [0u8; 8];
    w.copy_from_slice(bytes);
    u64::from_ne_bytes(w)
}

/// Expand each byte's top bit into a full `0xFF` / `0x00` byte.
#[inline]
fn spread(top_bits: u64) -> u64 {
    (top_bits >> 7) * 0xFF
}

#[inline]
pub(crate) fn mean_word(a: u64, b: u64) -> u64 {
    // halves fit in 7 bits, so the sum cannot carry across bytes
    ((a >> 1) & LO) + ((b >> 1) & LO)
}

#[inline]
pub(crate) fn add_sat_word(a: u64, b: u64) -> u64 {
    let sum = ((a & LO) + (b & LO)) ^ ((a ^ b) & HI);
    let carry = ((a & b) | ((a | b) & !sum)) & HI;
    sum | spread(carry)
}

#[inline]
pub(crate) fn sub_sat_word(a: u64, b: u64) -> u64 {
    let diff = ((a | HI) - (b & LO)) ^ ((a ^ !b) & HI);
    let borrow = ((!a & b) | (!(a ^ b) & diff)) & HI;
    diff & !spread(borrow)
}

/// Split `0..n` into the scalar head that aligns `dst` to `CHUNK`, and the end of the chunked body.
#[inline]
fn seams<const CHUNK: usize>(dst: *const u8, n: usize) -> (usize, usize) {
    let head = dst.align_offset(CHUNK).min(n);
    (head, head + (n - head) / CHUNK * CHUNK)
}

pub(crate) fn mean<const CHUNK: usize>(a: &[u8], b: &[u8], out: &mut [u8]) {
    let n = out.len().min(a.len()).min(b.len());
    let (a, b, out) = (&a[..n], &b[..n], &mut out[..n]);
    let (head, end) = seams::<CHUNK>(out.as_ptr(), n);

    scalar::mean(&a[..head], &b[..head], &mut out[..head]);
    for ((o, x), y) in out[head..end]
        .chunks_exact_mut(8)
        .zip(a[head..end].chunks_exact(8))
        .zip(b[head..end].chunks_exact(8))
    {
        o.copy_from_slice(&mean_word(load(x), load(y)).to_ne_bytes());
    }
    scalar::mean(&a[end..], &b[end..], &mut out[end..]);
}

fn saturating<const CHUNK: usize>(
    dst: &mut [u8],
    src: &[u8],
    word: fn(u64, u64) -> u64,
    tail: fn(&mut [u8], &[u8]),
) {
    let n = dst.len().min(src.len());
    let (dst, src) = (&mut dst[..n], &src[..n]);
    let (head, end) = seams::<CHUNK>(dst.as_ptr(), n);

    tail(&mut dst[..head], &src[..head]);
    for (d, s) in dst[head..end]
        .chunks_exact_mut(8)
        .zip(src[head..end].chunks_exact(8))
    {
        let r = word(load(d), load(s));
        d.copy_from_slice(&r.to_ne_bytes());
    }
    tail(&mut dst[end..], &src[end..]);
}

pub(crate) fn accumulate<const CHUNK: usize>(dst: &mut [u8], src: &[u8]) {
    saturating::<CHUNK>(dst, src, add_sat_word, scalar::accumulate);
}

pub(crate) fn subtract<const CHUNK: usize>(dst: &mut [u8], src: &[u8]) {
    saturating::<CHUNK>(dst, src, sub_sat_word, scalar::subtract);
}

#[cfg(test)]
#[path = "../../tests/unit/kernels/swar.rs"]
mod tests;
