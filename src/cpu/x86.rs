//! x86 / x86_64 tier detection via CPUID.
//!
//! Safety:
//! - `unsafe` is limited to the CPUID intrinsic, which older toolchains declare `unsafe`.

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::{__cpuid, has_cpuid};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::__cpuid;

use super::Tier;

// CPUID leaf 1 feature bits
const EDX_MMX: u32 = 1 << 23;
const EDX_SSE: u32 = 1 << 25;
const EDX_SSE2: u32 = 1 << 26;
const ECX_SSSE3: u32 = 1 << 9;

/// Level the build already assumes; the binary cannot run on anything less.
fn compile_time() -> Tier {
    if cfg!(target_feature = "ssse3") {
        Tier::Ssse3
    } else if cfg!(target_feature = "sse2") {
        Tier::Sse2
    } else if cfg!(target_feature = "sse") {
        Tier::Sse
    } else {
        Tier::Null
    }
}

pub(super) fn detect() -> Tier {
    let baseline = compile_time();
    let reported = match leaf1() {
        Some((ecx, edx)) => tier_from_leaf1(ecx, edx),
        None => {
            tracing::debug!("cpuid leaf 1 unavailable; using build baseline");
            Tier::Null
        }
    };
    tracing::debug!(
        baseline = baseline.name(),
        reported = reported.name(),
        "x86 feature probe"
    );
    baseline.max(reported)
}

/// Map CPUID leaf 1 `ecx`/`edx` to the highest tier they advertise.
pub(super) fn tier_from_leaf1(ecx: u32, edx: u32) -> Tier {
    if ecx & ECX_SSSE3 != 0 && edx & EDX_SSE2 != 0 {
        Tier::Ssse3
    } else if edx & EDX_SSE2 != 0 {
        Tier::Sse2
    } else if edx & EDX_SSE != 0 {
        Tier::Sse
    } else if edx & EDX_MMX != 0 {
        Tier::Mmx
    } else {
        Tier::Null
    }
}

#[allow(unused_unsafe)]
fn leaf1() -> Option<(u32, u32)> {
    #[cfg(target_arch = "x86")]
    if !has_cpuid() {
        return None;
    }

    // SAFETY: CPUID is present (always on x86_64, checked above on x86).
    let max_leaf = unsafe { __cpuid(0) }.eax;
    if max_leaf < 1 {
        return None;
    }
    // SAFETY: leaf 1 is within the supported range reported by leaf 0.
    let r = unsafe { __cpuid(1) };
    Some((r.ecx, r.edx))
}
