//! reader — decrypting record reader over a borrowed ciphertext region.
//!
//! Purpose:
//! - Reconstruct length-delimited, varint-tagged records directly from an
//!   AES-encrypted memory region, decrypting only as much plaintext as the
//!   typed reads actually need.
//! - Defer large values: instead of materializing them, record their source
//!   offset plus a resumable cipher snapshot for later out-of-band decode.
//!
//! Three coordinate spaces move in lockstep:
//! - `position`        — logical plaintext read position in the source;
//! - `decrypt_cursor`  — ciphertext bytes already fed through the engine;
//! - the staging buffer's own cursors (see `staging.rs`).
//! Invariant: `position == decrypt_cursor - staging.available()`, and
//! neither cursor passes `src.len()`.
//!
//! No field tags are parsed here; the surrounding record parser has already
//! dispatched by tag before invoking these typed reads. The reader is not
//! safe for concurrent use and must not be reused after a failed read.

mod staging;

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{AES_BLOCK_LEN, STAGING_INIT_LEN, VARINT32_EXTRA_BYTES, VARINT_PREFETCH};
use crate::crypto::{CipherStatus, DecryptEngine};
use crate::entry::{KvEntry, KvHolder, DIRECT_LIMIT};
use crate::error::{Result, VeilError};
use crate::util::pb_varint32_size;
use staging::StagingBuffer;

/// Streaming decoder over a caller-owned ciphertext buffer.
///
/// The source must stay immutable for the reader's whole lifetime. All
/// operations are synchronous and bounded by CPU/memory cost; the only
/// terminal condition is source exhaustion.
pub struct CryptReader<'a, E: DecryptEngine> {
    src: &'a [u8],
    /// Logical plaintext read position.
    position: usize,
    /// Ciphertext consumed by the decrypt engine.
    decrypt_cursor: usize,
    engine: E,
    staging: StagingBuffer,
}

impl<'a, E: DecryptEngine> CryptReader<'a, E> {
    /// Borrow `src` and allocate the initial staging buffer.
    pub fn new(src: &'a [u8], engine: E) -> Result<Self> {
        Ok(Self {
            src,
            position: 0,
            decrypt_cursor: 0,
            engine,
            staging: StagingBuffer::with_capacity(STAGING_INIT_LEN)?,
        })
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position == self.src.len()
    }

    /// Current staging-buffer capacity. Introspection for diagnostics.
    #[inline]
    pub fn staging_capacity(&self) -> usize {
        self.staging.capacity()
    }

    /// Advance the logical position without touching the cipher. Used by
    /// the surrounding parser after it has consumed bytes out of band.
    pub fn seek(&mut self, added: usize) -> Result<()> {
        self.position += added;
        if self.position > self.src.len() {
            return Err(VeilError::OutOfSpace {
                position: self.position,
                size: self.src.len(),
            });
        }
        Ok(())
    }

    // ---------- buffering ----------

    /// Guarantee at least `length` decrypted bytes at the read position
    /// (clamped to what the source still holds).
    ///
    /// `mark_discard` first declares everything before the read position
    /// reclaimable; callers set it right before a record's length prefix so
    /// prior, already-returned bytes can be compacted away.
    fn ensure_decrypted(&mut self, length: usize, mark_discard: bool) -> Result<()> {
        if mark_discard {
            self.staging.mark_discard();
        }
        let available = self.staging.available();
        if available >= length {
            return Ok(());
        }
        let mut need = length - available;

        // The chained cipher works on whole blocks; round up, then clamp to
        // the ciphertext actually remaining (one trailing partial is fine).
        need = (need + AES_BLOCK_LEN - 1) / AES_BLOCK_LEN * AES_BLOCK_LEN;
        need = need.min(self.src.len() - self.decrypt_cursor);

        self.staging.make_room(need, AES_BLOCK_LEN)?;
        let dst = self.staging.tail_mut(need);
        self.engine
            .decrypt(&self.src[self.decrypt_cursor..self.decrypt_cursor + need], dst);
        self.decrypt_cursor += need;
        self.staging.advance_decrypted(need);
        Ok(())
    }

    /// Move past `length` plaintext bytes without exposing them. Forward
    /// movement still costs decryption (the cipher is chained): whole
    /// blocks go into a throwaway area, then the read position lands inside
    /// the last decrypted chunk.
    fn skip(&mut self, length: usize) {
        let available = self.staging.available();
        if available >= length {
            self.staging.consume(length);
            return;
        }
        let remain = length - available;

        let rounds = (remain + AES_BLOCK_LEN - 1) / AES_BLOCK_LEN;
        let mut last = 0usize;
        for _ in 0..rounds {
            let step = AES_BLOCK_LEN.min(self.src.len() - self.decrypt_cursor);
            let dst = self.staging.scratch(step);
            self.engine
                .decrypt(&self.src[self.decrypt_cursor..self.decrypt_cursor + step], dst);
            self.decrypt_cursor += step;
            last = step;
        }
        let within = remain % AES_BLOCK_LEN;
        if within == 0 {
            // Ended exactly on a block boundary: the last throwaway block
            // holds nothing live.
            self.staging.reset_after_skip(0, 0);
        } else {
            self.staging.reset_after_skip(within, last);
        }
    }

    /// Snapshot the cipher positioned `rollback` plaintext bytes behind the
    /// logical read position (buffered-but-unread bytes are added on top of
    /// the caller's request).
    fn capture_status(&self, rollback: usize) -> CipherStatus {
        let behind = rollback + self.staging.available();
        debug_assert!(behind <= self.decrypt_cursor);
        let pos = self.decrypt_cursor - behind;
        self.engine.status_at(&self.src[..self.decrypt_cursor], pos)
    }

    // ---------- scalar reads ----------

    /// Consume one staged byte. `EndOfStream` exactly at source end; a
    /// missing staged byte anywhere else is a buffering bug, not an error.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.position == self.src.len() {
            return Err(VeilError::EndOfStream {
                position: self.position,
                size: self.src.len(),
            });
        }
        self.position += 1;
        Ok(self.staging.take_byte())
    }

    /// Little-endian base-128 varint, 32-bit result.
    ///
    /// After 5 data-bearing bytes, up to 5 further continuation bytes are
    /// read and discarded: encoders that emit a 64-bit-width varint for a
    /// 32-bit value stay decodable, with the upper bits dropped. Only a
    /// terminator missing within that allowance is malformed.
    fn read_raw_varint32(&mut self, discard_pre: bool) -> Result<i32> {
        self.ensure_decrypted(VARINT_PREFETCH, discard_pre)?;

        let mut tmp = self.read_byte()? as i8;
        if tmp >= 0 {
            return Ok(tmp as i32);
        }
        let mut result = (tmp & 0x7f) as i32;
        tmp = self.read_byte()? as i8;
        if tmp >= 0 {
            result |= (tmp as i32) << 7;
        } else {
            result |= ((tmp & 0x7f) as i32) << 7;
            tmp = self.read_byte()? as i8;
            if tmp >= 0 {
                result |= (tmp as i32) << 14;
            } else {
                result |= ((tmp & 0x7f) as i32) << 14;
                tmp = self.read_byte()? as i8;
                if tmp >= 0 {
                    result |= (tmp as i32) << 21;
                } else {
                    result |= ((tmp & 0x7f) as i32) << 21;
                    tmp = self.read_byte()? as i8;
                    result |= (tmp as i32) << 28;
                    if tmp < 0 {
                        // Discard the bits above 31.
                        for _ in 0..VARINT32_EXTRA_BYTES {
                            if self.read_byte()? as i8 >= 0 {
                                return Ok(result);
                            }
                        }
                        return Err(VeilError::MalformedVarint);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Little-endian base-128 varint, 64-bit result, at most 10 bytes.
    fn read_raw_varint64(&mut self) -> Result<i64> {
        self.ensure_decrypted(VARINT_PREFETCH, false)?;

        let mut shift = 0u32;
        let mut result = 0i64;
        while shift < 64 {
            let b = self.read_byte()?;
            result |= ((b & 0x7f) as i64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(VeilError::MalformedVarint)
    }

    pub fn read_int32(&mut self) -> Result<i32> {
        self.read_raw_varint32(false)
    }

    pub fn read_uint32(&mut self) -> Result<u32> {
        Ok(self.read_raw_varint32(false)? as u32)
    }

    pub fn read_int64(&mut self) -> Result<i64> {
        self.read_raw_varint64()
    }

    pub fn read_uint64(&mut self) -> Result<u64> {
        Ok(self.read_raw_varint64()? as u64)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_raw_varint32(false)? != 0)
    }

    /// Stage and consume `n` bytes as one contiguous slice (fixed-width
    /// reads). Bounds-checked up front so a short source fails before any
    /// byte is consumed.
    fn take_staged(&mut self, n: usize) -> Result<&[u8]> {
        if self.src.len() - self.position < n {
            return Err(VeilError::EndOfStream {
                position: self.position,
                size: self.src.len(),
            });
        }
        self.ensure_decrypted(n, false)?;
        self.position += n;
        Ok(self.staging.consume(n))
    }

    pub fn read_fixed32(&mut self) -> Result<u32> {
        let bytes = self.take_staged(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    pub fn read_fixed64(&mut self) -> Result<u64> {
        let bytes = self.take_staged(8)?;
        Ok(LittleEndian::read_u64(bytes))
    }

    /// Exact bit-pattern reinterpretation of the assembled word.
    pub fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_fixed32()?))
    }

    pub fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_fixed64()?))
    }

    // ---------- length-delimited reads ----------

    /// Decode and validate a length prefix.
    fn delimited_size(&mut self, discard_pre: bool) -> Result<usize> {
        let size = self.read_raw_varint32(discard_pre)?;
        if size < 0 {
            return Err(VeilError::NegativeSize);
        }
        let size = size as usize;
        if size > self.src.len() - self.position {
            return Err(VeilError::TruncatedMessage);
        }
        Ok(size)
    }

    /// Length-delimited binary blob, copied out.
    pub fn read_data(&mut self) -> Result<Vec<u8>> {
        let size = self.delimited_size(false)?;
        self.ensure_decrypted(size, false)?;
        self.position += size;
        Ok(self.staging.consume(size).to_vec())
    }

    /// Length-delimited string. The wire carries raw bytes with no
    /// validation; invalid UTF-8 is replaced, not rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let size = self.delimited_size(false)?;
        self.ensure_decrypted(size, false)?;
        self.position += size;
        Ok(String::from_utf8_lossy(self.staging.consume(size)).into_owned())
    }

    /// Key read of a record: records the record's starting offset in the
    /// holder and marks everything before it reclaimable, so bytes of prior
    /// records can be compacted away while scanning.
    pub fn read_key(&mut self, holder: &mut KvHolder) -> Result<String> {
        holder.offset = self.position as u32;

        let size = self.delimited_size(true)?;
        self.ensure_decrypted(size, false)?;
        holder.key_size = size as u16;
        self.position += size;
        Ok(String::from_utf8_lossy(self.staging.consume(size)).into_owned())
    }

    /// Value read of a record: chooses the storage representation by size.
    ///
    /// Values above [`DIRECT_LIMIT`] are not materialized — the cipher is
    /// snapshotted at the record start (header + key + value behind the
    /// current point) and the value bytes are skipped, cursor only.
    pub fn read_value(&mut self, holder: &KvHolder) -> Result<KvEntry> {
        let size = self.delimited_size(false)?;

        if size > DIRECT_LIMIT {
            let value_size = size as u32;
            let header_size =
                (pb_varint32_size(value_size) + pb_varint32_size(holder.key_size as u32)) as u8;

            let rollback = header_size as usize + holder.key_size as usize;
            let cipher = self.capture_status(rollback);

            self.skip(size);
            self.position += size;

            Ok(KvEntry::Offset {
                offset: holder.offset,
                key_size: holder.key_size,
                value_size,
                header_size,
                cipher,
            })
        } else {
            self.ensure_decrypted(size, false)?;
            self.position += size;
            Ok(KvEntry::Direct(self.staging.consume(size).to_vec()))
        }
    }
}
