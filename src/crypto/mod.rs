//! crypto — chained decrypt engine behind the record reader.
//!
//! Goals:
//! - One trait seam (`DecryptEngine`) between the reader and the cipher.
//! - Mid-stream snapshots (`CipherStatus`) so a later, independent pass can
//!   resume decryption at a deferred entry without replaying from source
//!   start.
//!
//! Notes:
//! - The engine is stateful and chained: `decrypt` continues the feedback
//!   chain across calls on one source. Calls must be whole cipher blocks
//!   except for a single trailing partial call at source end.
//! - `status_at` reconstructs the chain state as it was after consuming
//!   exactly `pos` ciphertext bytes. The ciphertext seen so far is enough
//!   for that: in a ciphertext-feedback chain the previous cipher block is
//!   the feedback register of the current one.

mod cfb;
pub use cfb::AesCfb;

use crate::consts::AES_BLOCK_LEN;

/// Opaque, resumable cipher state captured mid-stream.
///
/// Produced once per deferred entry, consumed later by an out-of-band
/// re-decrypt pass (see [`AesCfb::resume`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherStatus {
    pub(crate) vector: [u8; AES_BLOCK_LEN],
    pub(crate) number: u8,
}

/// Stateful chained decryptor the reader pulls plaintext through.
pub trait DecryptEngine {
    /// Decrypt `src` into `dst` (equal lengths), continuing the chain.
    fn decrypt(&mut self, src: &[u8], dst: &mut [u8]);

    /// State of the chain as it was after consuming exactly `pos` bytes of
    /// `consumed` (the ciphertext already fed through `decrypt`).
    fn status_at(&self, consumed: &[u8], pos: usize) -> CipherStatus;
}
