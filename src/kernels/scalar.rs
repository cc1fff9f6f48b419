//! Reference kernels. Every other tier must match these bit for bit.

const RB: u32 = 0x00FF_00FF;
const G: u32 = 0x0000_FF00;
const A: u32 = 0xFF00_0000;

/// Halve-then-add: each operand's low bit is dropped before summing, so `mean(1, 1) == 0`.
#[inline]
pub(crate) fn mean_byte(a: u8, b: u8) -> u8 {
    (a >> 1) + (b >> 1)
}

pub(crate) fn mean(a: &[u8], b: &[u8], out: &mut [u8]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = mean_byte(x, y);
    }
}

pub(crate) fn accumulate(dst: &mut [u8], src: &[u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = d.saturating_add(s);
    }
}

pub(crate) fn subtract(dst: &mut [u8], src: &[u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = d.saturating_sub(s);
    }
}

/// Straight-alpha blend of one ARGB pixel; the destination keeps its own alpha byte.
#[inline]
pub(crate) fn blend_pixel(dst: u32, src: u32, alpha: u8) -> u32 {
    let a = ((src >> 24) * u32::from(alpha)) >> 8;
    let ia = 255 - a;
    let rb = (((src & RB) * a + (dst & RB) * ia) >> 8) & RB;
    let g = (((src & G) * a + (dst & G) * ia) >> 8) & G;
    (dst & A) | rb | g
}

pub(crate) fn blend(dst: &mut [u32], src: &[u32], alpha: u8) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = blend_pixel(*d, s, alpha);
    }
}

/// Weight of the second source for a mask byte: `clamp(threshold - mask, 0, 255)`.
#[inline]
pub(crate) fn mask_weight(mask: u32, threshold: u32) -> u32 {
    let t = threshold.min(510) as i32;
    (t - (mask & 0xFF) as i32).clamp(0, 255) as u32
}

#[inline]
pub(crate) fn mask_pixel(s1: u32, s2: u32, mask: u32, threshold: u32) -> u32 {
    let w2 = mask_weight(mask, threshold);
    let w1 = 255 - w2;
    let rb = (((s1 & RB) * w1 + (s2 & RB) * w2) >> 8) & RB;
    let g = (((s1 & G) * w1 + (s2 & G) * w2) >> 8) & G;
    A | rb | g
}

/// One row of a mask blend. `x0` is the absolute column of `dst[0]`, used to tile `mask_row`.
pub(crate) fn mask_row(
    dst: &mut [u32],
    s1: &[u32],
    s2: &[u32],
    mask_row: &[u32],
    x0: usize,
    threshold: u32,
) {
    let mw = mask_row.len();
    if mw == 0 {
        return;
    }
    for (i, ((d, &a), &b)) in dst.iter_mut().zip(s1).zip(s2).enumerate() {
        *d = mask_pixel(a, b, mask_row[(x0 + i) % mw], threshold);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernels/scalar.rs"]
mod tests;
