//! util — small shared helpers.
//!
//! Contains:
//! - pb_varint32_size(): byte count a varint encoding of a u32 would occupy.
//!
//! Used only for header-size bookkeeping of deferred (Offset) entries,
//! never for actual decode.

/// Number of bytes (1..=5) the varint encoding of `value` occupies.
#[inline]
pub fn pb_varint32_size(value: u32) -> usize {
    if value < (1 << 7) {
        1
    } else if value < (1 << 14) {
        2
    } else if value < (1 << 21) {
        3
    } else if value < (1 << 28) {
        4
    } else {
        5
    }
}
