//! checksum — CRC-32 (IEEE) over arbitrary byte ranges with seed chaining.
//!
//! Strategy is picked once at first use:
//! - aarch64 with the `crc` feature detected at runtime — processor CRC
//!   instructions (see `armv8.rs`);
//! - everywhere else — portable table-driven path (`crc32fast`).
//!
//! ENV `VEILKV_CRC32_PORTABLE=1|true|yes|on` forces the portable path.
//!
//! Seed convention is the standard zlib one: pass 0 for a fresh checksum,
//! or a previous result to continue it; `crc32(crc32(0, a), b)` equals
//! `crc32(0, a || b)`. The pre/post complement happens inside.

#[cfg(target_arch = "aarch64")]
use std::sync::OnceLock;

#[cfg(target_arch = "aarch64")]
mod armv8;

/// CRC-32 of `bytes`, continuing from `seed`.
pub fn crc32(seed: u32, bytes: &[u8]) -> u32 {
    #[cfg(target_arch = "aarch64")]
    {
        if hardware_selected() {
            // SAFETY: gated on runtime detection of the crc feature.
            return unsafe { armv8::crc32(seed, bytes) };
        }
    }
    crc32_portable(seed, bytes)
}

/// Portable path, also the oracle the hardware path is verified against.
pub fn crc32_portable(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(seed);
    hasher.update(bytes);
    hasher.finalize()
}

/// Hardware path when this build and machine support it, else None.
/// Exposed so equivalence tests can compare both paths directly.
#[cfg(target_arch = "aarch64")]
pub fn crc32_hardware(seed: u32, bytes: &[u8]) -> Option<u32> {
    if std::arch::is_aarch64_feature_detected!("crc") {
        // SAFETY: feature presence just checked.
        Some(unsafe { armv8::crc32(seed, bytes) })
    } else {
        None
    }
}

#[cfg(not(target_arch = "aarch64"))]
pub fn crc32_hardware(_seed: u32, _bytes: &[u8]) -> Option<u32> {
    None
}

#[cfg(target_arch = "aarch64")]
fn hardware_selected() -> bool {
    static SELECTED: OnceLock<bool> = OnceLock::new();
    *SELECTED.get_or_init(|| {
        !portable_forced() && std::arch::is_aarch64_feature_detected!("crc")
    })
}

#[cfg(target_arch = "aarch64")]
fn portable_forced() -> bool {
    if let Ok(v) = std::env::var("VEILKV_CRC32_PORTABLE") {
        let s = v.trim().to_ascii_lowercase();
        if s == "1" || s == "true" || s == "yes" || s == "on" {
            return true;
        }
    }
    false
}
