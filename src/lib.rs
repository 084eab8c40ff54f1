//! veilkv — encrypted read path of an embedded KV store.
//!
//! A streaming decoder that reconstructs length-delimited, varint-tagged
//! records directly from an AES-encrypted memory region, decrypting only as
//! much plaintext as the typed reads need, and deferring large values via
//! resumable cipher snapshots. Plus a self-contained CRC-32 engine with a
//! hardware fast path.

// Base modules
pub mod consts;
pub mod error;
pub mod util;

// Cipher seam + AES-CFB engine
pub mod crypto; // src/crypto/{mod,cfb}.rs

// Record reader and its staging buffer
pub mod reader; // src/reader/{mod,staging}.rs

// Direct/Offset entry policy
pub mod entry;

// CRC-32 (hardware path + portable fallback)
pub mod checksum; // src/checksum/{mod,armv8}.rs

// Convenience re-exports
pub use crypto::{AesCfb, CipherStatus, DecryptEngine};
pub use entry::{KvEntry, KvHolder, DIRECT_LIMIT};
pub use error::{Result, VeilError};
pub use reader::CryptReader;
pub use checksum::crc32;
