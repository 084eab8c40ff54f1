//! Key-value entry: two physical representations of one logical record.
//!
//! Pure size policy, no algorithm: small values are copied inline while
//! scanning (one copy now), large values get a resumable locator (a later
//! re-decrypt, but a bulk scan never holds every large value at once).

use crate::crypto::CipherStatus;

/// Value representation handed to the index by the record decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvEntry {
    /// Inline copy of the value bytes.
    Direct(Vec<u8>),
    /// Locator for a deferred value: where the record starts in the source,
    /// the sizes needed to step over its header, and the cipher state to
    /// resume decryption there.
    Offset {
        /// Logical source offset of the record start (key length prefix).
        offset: u32,
        key_size: u16,
        value_size: u32,
        /// Varint-encoded sizes of `value_size` and `key_size` combined.
        header_size: u8,
        cipher: CipherStatus,
    },
}

/// Largest encoded value still stored inline. Anything bigger than twice
/// the entry's own structural footprint is deferred.
pub const DIRECT_LIMIT: usize = 2 * std::mem::size_of::<KvEntry>();

impl KvEntry {
    /// True if a value of `size` encoded bytes would be stored inline.
    #[inline]
    pub fn fits_direct(size: usize) -> bool {
        size <= DIRECT_LIMIT
    }
}

/// Scratch filled by the key read and consumed by the value read of the
/// same record.
#[derive(Debug, Default, Clone, Copy)]
pub struct KvHolder {
    /// Logical position of the record start, captured before the key's
    /// length prefix was decoded.
    pub offset: u32,
    pub key_size: u16,
}
