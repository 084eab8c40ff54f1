//! Common constants of the encrypted record format.

// -------- Cipher --------

/// Unit the decrypt engine operates on. Chained AES-CFB consumes whole
/// blocks except for a single trailing partial call at source end.
pub const AES_BLOCK_LEN: usize = 16;

/// Initial capacity of the plaintext staging buffer (two cipher blocks).
pub const STAGING_INIT_LEN: usize = AES_BLOCK_LEN * 2;

// -------- Varints --------

/// Data-bearing bytes a 32-bit varint may occupy.
pub const VARINT32_MAX_BYTES: usize = 5;

/// Extra continuation bytes tolerated beyond bit 31. Some encoders emit a
/// full 64-bit-width varint for a 32-bit value; the upper bits are discarded.
pub const VARINT32_EXTRA_BYTES: usize = 5;

/// Maximum bytes of a 64-bit varint.
pub const VARINT64_MAX_BYTES: usize = 10;

/// How many bytes a varint read pre-stages before decoding byte by byte
/// (worst case of both widths; clamped to what the source still holds).
pub const VARINT_PREFETCH: usize = VARINT64_MAX_BYTES;
