//! aarch64 CRC instruction path.
//!
//! Layout: fold up to 7 leading bytes to reach an 8-byte-aligned pointer,
//! run the aligned bulk in 64-byte groups of 8 unrolled 8-byte folds (for
//! instruction-level parallelism), finish remaining 8-byte words singly,
//! then fold the <8 trailing bytes with the same 4/2/1 logic as the
//! prologue. Must stay bit-identical to the portable path for every input
//! and every alignment; `tests/crc32_equivalence.rs` pins that.

use core::arch::aarch64::{__crc32b, __crc32d, __crc32h, __crc32w};

/// Up to 7 bytes, folded word-by-halfword-by-byte. No complement here;
/// callers pass the in-flight (already complemented) crc.
#[target_feature(enable = "crc")]
unsafe fn crc32_small(mut crc: u32, mut ptr: *const u8, mut len: usize) -> u32 {
    if len >= 4 {
        crc = __crc32w(crc, (ptr as *const u32).read_unaligned());
        ptr = ptr.add(4);
        len -= 4;
    }
    if len >= 2 {
        crc = __crc32h(crc, (ptr as *const u16).read_unaligned());
        ptr = ptr.add(2);
        len -= 2;
    }
    if len >= 1 {
        crc = __crc32b(crc, ptr.read());
    }
    crc
}

/// CRC-32 continuing from `seed`, standard pre/post complement.
///
/// # Safety
/// The `crc` target feature must be present on the running CPU.
#[target_feature(enable = "crc")]
pub unsafe fn crc32(seed: u32, bytes: &[u8]) -> u32 {
    let mut crc = seed ^ 0xffff_ffff;
    let mut ptr = bytes.as_ptr();
    let mut len = bytes.len();

    // Reach an 8-byte boundary.
    let offset = core::cmp::min(len, ptr.align_offset(8));
    if offset != 0 {
        crc = crc32_small(crc, ptr, offset);
        ptr = ptr.add(offset);
        len -= offset;
    }
    if len == 0 {
        return crc ^ 0xffff_ffff;
    }

    // 8 * 8 bytes per iteration.
    let mut p64 = ptr as *const u64;
    while len >= 64 {
        crc = __crc32d(crc, p64.read());
        crc = __crc32d(crc, p64.add(1).read());
        crc = __crc32d(crc, p64.add(2).read());
        crc = __crc32d(crc, p64.add(3).read());
        crc = __crc32d(crc, p64.add(4).read());
        crc = __crc32d(crc, p64.add(5).read());
        crc = __crc32d(crc, p64.add(6).read());
        crc = __crc32d(crc, p64.add(7).read());
        p64 = p64.add(8);
        len -= 64;
    }

    while len >= 8 {
        crc = __crc32d(crc, p64.read());
        p64 = p64.add(1);
        len -= 8;
    }

    if len != 0 {
        crc = crc32_small(crc, p64 as *const u8, len);
    }

    crc ^ 0xffff_ffff
}
