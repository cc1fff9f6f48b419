//! CPU capability probe.
//!
//! [`detect`] inspects the host once and returns the highest vector [`Tier`] the pixel kernels
//! may use. The probe holds no global state; callers keep the returned value (usually inside a
//! [`crate::Kernels`] table).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::VnError;

#[cfg(any(target_arch = "powerpc", target_arch = "powerpc64"))]
mod power;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

/// Architecture family a [`Tier`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Plain scalar code, runs everywhere.
    Portable,
    /// x86 and x86_64.
    X86,
    /// 32- and 64-bit PowerPC.
    Power,
}

/// Vector instruction capability level.
///
/// Tiers of one family extend each other in declaration order; [`Tier::Null`] sits below all of
/// them. Tiers of different families are never compared by the kernel binder.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No vector extension (scalar kernels only).
    #[default]
    Null,
    /// x86 MMX (64-bit integer vectors).
    Mmx,
    /// x86 SSE. Adds nothing the integer kernels use over MMX.
    Sse,
    /// x86 SSE2 (128-bit integer vectors).
    Sse2,
    /// x86 SSSE3 (byte shuffles).
    Ssse3,
    /// PowerPC AltiVec / VMX.
    Altivec,
}

impl Tier {
    /// Every tier, lowest first within each family.
    pub const ALL: [Tier; 6] = [
        Tier::Null,
        Tier::Mmx,
        Tier::Sse,
        Tier::Sse2,
        Tier::Ssse3,
        Tier::Altivec,
    ];

    /// Architecture family of this tier.
    pub fn family(self) -> Family {
        match self {
            Tier::Null => Family::Portable,
            Tier::Mmx | Tier::Sse | Tier::Sse2 | Tier::Ssse3 => Family::X86,
            Tier::Altivec => Family::Power,
        }
    }

    /// Lowercase name, as accepted by `FromStr` and serde.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Null => "null",
            Tier::Mmx => "mmx",
            Tier::Sse => "sse",
            Tier::Sse2 => "sse2",
            Tier::Ssse3 => "ssse3",
            Tier::Altivec => "altivec",
        }
    }

    /// True when hardware at tier `self` can also run code written for `other`.
    pub fn includes(self, other: Tier) -> bool {
        other == Tier::Null || (self.family() == other.family() && other <= self)
    }

    /// Lower `self` to `ceiling` when the ceiling applies to this tier's family.
    ///
    /// A `Null` ceiling always applies. A ceiling from another family is ignored.
    pub fn capped(self, ceiling: Tier) -> Tier {
        if ceiling == Tier::Null {
            return Tier::Null;
        }
        if ceiling.family() == self.family() {
            return self.min(ceiling);
        }
        if self != Tier::Null {
            tracing::warn!(
                tier = self.name(),
                ceiling = ceiling.name(),
                "tier ceiling belongs to another architecture family; ignoring it"
            );
        }
        self
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = VnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Tier::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| VnError::config(format!("unknown cpu tier '{s}'")))
    }
}

/// Probe the host CPU.
///
/// Never fails: unknown platforms and unreadable capability sources report [`Tier::Null`].
pub fn detect() -> Tier {
    let tier = detect_arch();
    tracing::info!(tier = tier.name(), "cpu probe finished");
    tier
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect_arch() -> Tier {
    x86::detect()
}

#[cfg(any(target_arch = "powerpc", target_arch = "powerpc64"))]
fn detect_arch() -> Tier {
    power::detect()
}

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "powerpc",
    target_arch = "powerpc64"
)))]
fn detect_arch() -> Tier {
    Tier::Null
}

#[cfg(test)]
#[path = "../tests/unit/cpu/probe.rs"]
mod tests;
