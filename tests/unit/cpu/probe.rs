use super::*;

#[test]
fn detect_is_stable_across_calls() {
    assert_eq!(detect(), detect());
}

#[test]
#[cfg(target_arch = "x86_64")]
fn x86_64_has_sse2_baseline() {
    assert!(detect() >= Tier::Sse2);
    assert_eq!(detect().family(), Family::X86);
}

#[test]
#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "powerpc",
    target_arch = "powerpc64"
)))]
fn unknown_platforms_report_null() {
    assert_eq!(detect(), Tier::Null);
}

#[test]
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn leaf1_bits_map_to_highest_tier() {
    use super::x86::tier_from_leaf1;

    assert_eq!(tier_from_leaf1(0, 0), Tier::Null);
    assert_eq!(tier_from_leaf1(0, 1 << 23), Tier::Mmx);
    assert_eq!(tier_from_leaf1(0, (1 << 23) | (1 << 25)), Tier::Sse);
    assert_eq!(tier_from_leaf1(0, (1 << 23) | (1 << 25) | (1 << 26)), Tier::Sse2);
    assert_eq!(
        tier_from_leaf1(1 << 9, (1 << 23) | (1 << 25) | (1 << 26)),
        Tier::Ssse3
    );
}

#[test]
fn tier_names_roundtrip() {
    for t in Tier::ALL {
        assert_eq!(t.name().parse::<Tier>().unwrap(), t);
        assert_eq!(t.to_string(), t.name());
    }
    assert_eq!(" SSE2 ".parse::<Tier>().unwrap(), Tier::Sse2);
    assert!("avx512".parse::<Tier>().is_err());
}

#[test]
fn tiers_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&Tier::Ssse3).unwrap(), "\"ssse3\"");
    let t: Tier = serde_json::from_str("\"altivec\"").unwrap();
    assert_eq!(t, Tier::Altivec);
}

#[test]
fn includes_respects_family() {
    assert!(Tier::Ssse3.includes(Tier::Sse2));
    assert!(Tier::Ssse3.includes(Tier::Null));
    assert!(!Tier::Sse2.includes(Tier::Ssse3));
    assert!(!Tier::Altivec.includes(Tier::Mmx));
    assert!(!Tier::Null.includes(Tier::Mmx));
    assert!(Tier::Null.includes(Tier::Null));
}

#[test]
fn capped_applies_only_within_family() {
    assert_eq!(Tier::Ssse3.capped(Tier::Sse2), Tier::Sse2);
    assert_eq!(Tier::Mmx.capped(Tier::Sse2), Tier::Mmx);
    assert_eq!(Tier::Ssse3.capped(Tier::Null), Tier::Null);
    assert_eq!(Tier::Altivec.capped(Tier::Sse2), Tier::Altivec);
    assert_eq!(Tier::Null.capped(Tier::Ssse3), Tier::Null);
}
