//! AES-128-CFB with mid-stream state capture.
//!
//! The feedback loop is the classic byte-granular CFB-128 state machine: a
//! 16-byte register plus an intra-block offset. It lives here rather than
//! behind a mode-wrapper crate because snapshot/resume needs direct access
//! to the register, which stream-mode wrappers do not expose.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use zeroize::Zeroize;

use super::{CipherStatus, DecryptEngine};
use crate::consts::AES_BLOCK_LEN;

/// Chained AES-128-CFB engine.
///
/// One instance decrypts one ciphertext region front to back. `encrypt` is
/// provided for tooling and tests that need to produce compatible input;
/// it shares the same feedback loop.
pub struct AesCfb {
    cipher: Aes128,
    /// IV the chain started from; needed to rebuild state at offset 0.
    iv0: [u8; AES_BLOCK_LEN],
    /// Feedback register. While mid-block (`number > 0`) its first `number`
    /// bytes hold ciphertext already fed back, the rest keystream.
    vector: [u8; AES_BLOCK_LEN],
    number: usize,
}

impl AesCfb {
    pub fn new(key: &[u8; 16], iv: &[u8; AES_BLOCK_LEN]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            iv0: *iv,
            vector: *iv,
            number: 0,
        }
    }

    /// Rebuild an engine from a captured status, positioned exactly where
    /// the snapshot was taken. Subsequent `decrypt` calls must be fed the
    /// ciphertext starting at that position.
    pub fn resume(key: &[u8; 16], status: &CipherStatus) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            iv0: status.vector,
            vector: status.vector,
            number: status.number as usize,
        }
    }

    /// Encrypt `src` into `dst`, continuing the chain. Test/tooling path.
    pub fn encrypt(&mut self, src: &[u8], dst: &mut [u8]) {
        debug_assert_eq!(src.len(), dst.len());
        for (i, &p) in src.iter().enumerate() {
            if self.number == 0 {
                self.cipher
                    .encrypt_block(GenericArray::from_mut_slice(&mut self.vector));
            }
            let c = self.vector[self.number] ^ p;
            dst[i] = c;
            self.vector[self.number] = c;
            self.number = (self.number + 1) % AES_BLOCK_LEN;
        }
    }
}

impl DecryptEngine for AesCfb {
    fn decrypt(&mut self, src: &[u8], dst: &mut [u8]) {
        debug_assert_eq!(src.len(), dst.len());
        for (i, &c) in src.iter().enumerate() {
            if self.number == 0 {
                self.cipher
                    .encrypt_block(GenericArray::from_mut_slice(&mut self.vector));
            }
            dst[i] = self.vector[self.number] ^ c;
            self.vector[self.number] = c;
            self.number = (self.number + 1) % AES_BLOCK_LEN;
        }
    }

    fn status_at(&self, consumed: &[u8], pos: usize) -> CipherStatus {
        debug_assert!(pos <= consumed.len());
        let n = pos % AES_BLOCK_LEN;
        let block_start = pos - n;

        // Register at a block boundary is the previous ciphertext block
        // (or the IV when the boundary is the chain start).
        let mut vector = [0u8; AES_BLOCK_LEN];
        if block_start == 0 {
            vector = self.iv0;
        } else {
            vector.copy_from_slice(&consumed[block_start - AES_BLOCK_LEN..block_start]);
        }

        // Mid-block: advance the register by one encryption and replay the
        // ciphertext bytes of the partial block into it.
        if n != 0 {
            self.cipher
                .encrypt_block(GenericArray::from_mut_slice(&mut vector));
            vector[..n].copy_from_slice(&consumed[block_start..block_start + n]);
        }

        CipherStatus {
            vector,
            number: n as u8,
        }
    }
}

impl Drop for AesCfb {
    fn drop(&mut self) {
        self.vector.zeroize();
        self.iv0.zeroize();
    }
}
