//! Blend and mask-blend bodies shared by the SSE2 and SSSE3 tiers.
//!
//! [`x86_blend_kernels!`] expands into the invoking module and calls two helpers that module must
//! define for its instruction set:
//! - `extract_g(v)`: `0x????gg??` -> `0x000000gg` per pixel
//! - `widen_g16(v)`: `0x0000gg??` -> `0x00gg00gg` per pixel
//!
//! Both tiers process four pixels per 16-byte vector and produce results identical to
//! `scalar::blend_pixel` and `scalar::mask_pixel`.

macro_rules! x86_blend_kernels {
    ($feature:literal) => {
        /// # Safety
        /// The CPU must support the enabled target feature.
        #[target_feature(enable = $feature)]
        unsafe fn blend_impl(dst: &mut [u32], src: &[u32], alpha: u8) {
            use $crate::kernels::scalar;

            let n = dst.len().min(src.len());
            let (dst, src) = (&mut dst[..n], &src[..n]);
            let head = dst.as_ptr().align_offset(16).min(n);
            let end = head + (n - head) / 4 * 4;

            scalar::blend(&mut dst[..head], &src[..head], alpha);

            // SAFETY: `head..end` is in bounds for both slices and advances by whole vectors;
            // `dst + head` is 16-byte aligned so the aligned load/store is valid.
            unsafe {
                let rb_mask = _mm_set1_epi32(0x00FF_00FF);
                let a_mask = _mm_set1_epi32(0xFF00_0000u32 as i32);
                let scale = _mm_set1_epi32(i32::from(alpha));
                let mut i = head;
                while i < end {
                    let s = _mm_loadu_si128(src.as_ptr().add(i).cast());
                    let d = _mm_load_si128(dst.as_ptr().add(i).cast());

                    // a1 = ((src >> 24) * alpha) >> 8, spread to both 16-bit halves
                    let a1 = widen_g16(_mm_mullo_epi16(scale, _mm_srli_epi32(s, 24)));
                    let a2 = _mm_xor_si128(a1, rb_mask);

                    let rb = _mm_add_epi16(
                        _mm_mullo_epi16(_mm_and_si128(s, rb_mask), a1),
                        _mm_mullo_epi16(_mm_and_si128(d, rb_mask), a2),
                    );
                    let rb = _mm_srli_epi16(rb, 8);
                    let g = _mm_add_epi32(
                        _mm_mullo_epi16(extract_g(s), a1),
                        _mm_mullo_epi16(extract_g(d), a2),
                    );
                    let g = _mm_andnot_si128(rb_mask, g);

                    let out = _mm_or_si128(_mm_or_si128(rb, g), _mm_and_si128(d, a_mask));
                    _mm_store_si128(dst.as_mut_ptr().add(i).cast(), out);
                    i += 4;
                }
            }

            scalar::blend(&mut dst[end..], &src[end..], alpha);
        }

        /// # Safety
        /// The CPU must support the enabled target feature.
        #[target_feature(enable = $feature)]
        unsafe fn mask_row_impl(
            dst: &mut [u32],
            s1: &[u32],
            s2: &[u32],
            mask_row: &[u32],
            x0: usize,
            threshold: u32,
        ) {
            use $crate::kernels::scalar;

            let mw = mask_row.len();
            if mw == 0 {
                return;
            }
            let n = dst.len().min(s1.len()).min(s2.len());
            let (dst, s1, s2) = (&mut dst[..n], &s1[..n], &s2[..n]);
            let head = dst.as_ptr().align_offset(16).min(n);
            let end = head + (n - head) / 4 * 4;

            scalar::mask_row(&mut dst[..head], &s1[..head], &s2[..head], mask_row, x0, threshold);

            // SAFETY: `head..end` is in bounds for all three rows and advances by whole vectors;
            // `dst + head` is 16-byte aligned so the aligned store is valid.
            unsafe {
                let rb_mask = _mm_set1_epi32(0x00FF_00FF);
                let low_byte = _mm_set1_epi32(0xFF);
                let opaque = _mm_set1_epi32(0xFF00_0000u32 as i32);
                let zero = _mm_setzero_si128();
                let thr = _mm_set1_epi32(threshold.min(510) as i32);
                let mut i = head;
                while i < end {
                    let x = x0 + i;
                    let m = _mm_setr_epi32(
                        mask_row[x % mw] as i32,
                        mask_row[(x + 1) % mw] as i32,
                        mask_row[(x + 2) % mw] as i32,
                        mask_row[(x + 3) % mw] as i32,
                    );

                    // w2 = clamp(threshold - mask, 0, 255) via signed then unsigned saturation
                    let w = _mm_sub_epi32(thr, _mm_and_si128(m, low_byte));
                    let w = _mm_packs_epi32(w, w);
                    let w = _mm_packus_epi16(w, w);
                    let w = _mm_unpacklo_epi8(w, zero);
                    let w2 = _mm_unpacklo_epi16(w, w);
                    let w1 = _mm_xor_si128(w2, rb_mask);

                    let a = _mm_loadu_si128(s1.as_ptr().add(i).cast());
                    let b = _mm_loadu_si128(s2.as_ptr().add(i).cast());

                    let rb = _mm_add_epi16(
                        _mm_mullo_epi16(_mm_and_si128(a, rb_mask), w1),
                        _mm_mullo_epi16(_mm_and_si128(b, rb_mask), w2),
                    );
                    let rb = _mm_srli_epi16(rb, 8);
                    let g = _mm_add_epi32(
                        _mm_mullo_epi16(extract_g(a), w1),
                        _mm_mullo_epi16(extract_g(b), w2),
                    );
                    let g = _mm_andnot_si128(rb_mask, g);

                    let out = _mm_or_si128(_mm_or_si128(rb, g), opaque);
                    _mm_store_si128(dst.as_mut_ptr().add(i).cast(), out);
                    i += 4;
                }
            }

            scalar::mask_row(
                &mut dst[end..],
                &s1[end..],
                &s2[end..],
                mask_row,
                x0 + end,
                threshold,
            );
        }
    };
}

pub(super) use x86_blend_kernels;
