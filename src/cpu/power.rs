//! PowerPC AltiVec detection.
//!
//! Linux and Android expose the capability vector through `/proc/self/auxv`; the BSDs and macOS
//! answer a `sysctl` query instead. Anything unreadable counts as "no AltiVec".

use super::Tier;

pub(super) fn detect() -> Tier {
    if cfg!(target_feature = "altivec") || runtime_altivec() {
        Tier::Altivec
    } else {
        Tier::Null
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn runtime_altivec() -> bool {
    // ELF auxiliary vector entry type and mask (asm/cputable.h)
    const AT_HWCAP: usize = 16;
    const PPC_FEATURE_HAS_ALTIVEC: usize = 0x1000_0000;

    let bytes = match std::fs::read("/proc/self/auxv") {
        Ok(b) => b,
        Err(err) => {
            tracing::debug!(%err, "auxv unreadable");
            return false;
        }
    };
    hwcap_from_auxv(&bytes, AT_HWCAP).is_some_and(|hwcap| hwcap & PPC_FEATURE_HAS_ALTIVEC != 0)
}

/// Find `key` in a native-endian auxv dump of `(usize, usize)` pairs.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn hwcap_from_auxv(bytes: &[u8], key: usize) -> Option<usize> {
    const W: usize = std::mem::size_of::<usize>();
    for entry in bytes.chunks_exact(2 * W) {
        let a_type = usize::from_ne_bytes(entry[..W].try_into().ok()?);
        let a_val = usize::from_ne_bytes(entry[W..].try_into().ok()?);
        if a_type == 0 {
            break;
        }
        if a_type == key {
            return Some(a_val);
        }
    }
    None
}

#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd"))]
#[allow(unsafe_code)]
fn runtime_altivec() -> bool {
    #[cfg(target_os = "macos")]
    const NAME: &std::ffi::CStr = c"hw.optional.altivec";
    #[cfg(target_os = "freebsd")]
    const NAME: &std::ffi::CStr = c"hw.altivec";
    #[cfg(target_os = "netbsd")]
    const NAME: &std::ffi::CStr = c"machdep.altivec";

    let mut present: libc::c_int = 0;
    let mut len: libc::size_t = std::mem::size_of::<libc::c_int>();
    // SAFETY: `present` and `len` are valid for writes and `len` holds the buffer size.
    let rc = unsafe {
        libc::sysctlbyname(
            NAME.as_ptr(),
            (&mut present as *mut libc::c_int).cast(),
            &mut len,
            std::ptr::null(),
            0,
        )
    };
    if rc != 0 {
        tracing::debug!(name = ?NAME, "altivec sysctl failed");
        return false;
    }
    present != 0
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "netbsd"
)))]
fn runtime_altivec() -> bool {
    false
}
