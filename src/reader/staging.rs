//! Plaintext staging buffer: an owned, growable decrypted-byte cache.
//!
//! Cursors, always `discard_mark <= read_pos <= decrypted_end <= capacity`:
//! - `read_pos`       — next byte handed to the caller;
//! - `decrypted_end`  — end of bytes the engine has filled in;
//! - `discard_mark`   — earliest byte possibly still needed; everything
//!                      below it may be reclaimed by compaction.
//!
//! The buffer never shrinks. When the tail cannot hold the next decrypt
//! fill it first compacts (slides live bytes from the block-aligned discard
//! mark down to offset 0), and only then grows, by exactly the missing
//! amount, through fallible reallocation.

use log::debug;

use crate::error::{Result, VeilError};

pub(crate) struct StagingBuffer {
    data: Vec<u8>,
    read_pos: usize,
    decrypted_end: usize,
    discard_mark: usize,
}

impl StagingBuffer {
    pub fn with_capacity(cap: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(cap)
            .map_err(|_| VeilError::AllocationFailure)?;
        data.resize(cap, 0);
        Ok(Self {
            data,
            read_pos: 0,
            decrypted_end: 0,
            discard_mark: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Decrypted bytes not yet consumed.
    #[inline]
    pub fn available(&self) -> usize {
        self.decrypted_end - self.read_pos
    }

    /// Everything before the current read position may be reclaimed.
    #[inline]
    pub fn mark_discard(&mut self) {
        self.discard_mark = self.read_pos;
    }

    #[inline]
    fn free_tail(&self) -> usize {
        self.data.len() - self.decrypted_end
    }

    /// Make the tail able to hold `extra` more decrypted bytes:
    /// compact from the block-aligned discard mark first, then grow.
    pub fn make_room(&mut self, extra: usize, block: usize) -> Result<()> {
        self.check_cursors();
        if self.free_tail() < extra && self.discard_mark > 0 {
            let pos_to_move = self.discard_mark / block * block;
            if pos_to_move > 0 {
                let live = self.decrypted_end - pos_to_move;
                self.data.copy_within(pos_to_move..self.decrypted_end, 0);
                self.read_pos -= pos_to_move;
                self.decrypted_end -= pos_to_move;
                self.discard_mark = 0;
                debug!(
                    "staging compact: reclaimed {} bytes, {} live, capacity {}",
                    pos_to_move,
                    live,
                    self.capacity()
                );
            }
        }
        if self.free_tail() < extra {
            let add = extra - self.free_tail();
            self.data
                .try_reserve_exact(add)
                .map_err(|_| VeilError::AllocationFailure)?;
            let new_len = self.data.len() + add;
            self.data.resize(new_len, 0);
            debug!("staging grow: +{} bytes, capacity {}", add, new_len);
        }
        Ok(())
    }

    /// Writable tail slice for the next decrypt fill. Caller must follow up
    /// with `advance_decrypted` for the bytes actually filled.
    #[inline]
    pub fn tail_mut(&mut self, len: usize) -> &mut [u8] {
        &mut self.data[self.decrypted_end..self.decrypted_end + len]
    }

    #[inline]
    pub fn advance_decrypted(&mut self, len: usize) {
        self.decrypted_end += len;
        self.check_cursors();
    }

    /// Consume `len` decrypted bytes, returning them.
    #[inline]
    pub fn consume(&mut self, len: usize) -> &[u8] {
        let start = self.read_pos;
        self.read_pos += len;
        self.check_cursors();
        &self.data[start..start + len]
    }

    #[inline]
    pub fn take_byte(&mut self) -> u8 {
        let b = self.data[self.read_pos];
        self.read_pos += 1;
        self.check_cursors();
        b
    }

    /// Scratch area for throwaway block decrypts during a skip. Reuses the
    /// buffer head; capacity is always at least one block.
    #[inline]
    pub fn scratch(&mut self, len: usize) -> &mut [u8] {
        &mut self.data[..len]
    }

    /// Reposition after a skip: `read_pos` inside the most recently
    /// decrypted chunk, `decrypted_end` at its end. The discard mark is
    /// reset so the cursor ordering holds regardless of where it sat.
    #[inline]
    pub fn reset_after_skip(&mut self, read_pos: usize, decrypted_end: usize) {
        self.read_pos = read_pos;
        self.decrypted_end = decrypted_end;
        self.discard_mark = 0;
        self.check_cursors();
    }

    #[inline]
    fn check_cursors(&self) {
        debug_assert!(self.discard_mark <= self.read_pos);
        debug_assert!(self.read_pos <= self.decrypted_end);
        debug_assert!(self.decrypted_end <= self.data.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 16;

    fn fill(buf: &mut StagingBuffer, bytes: &[u8]) {
        buf.tail_mut(bytes.len()).copy_from_slice(bytes);
        buf.advance_decrypted(bytes.len());
    }

    #[test]
    fn fast_path_no_room_needed() {
        let mut buf = StagingBuffer::with_capacity(32).unwrap();
        fill(&mut buf, &[7u8; 20]);
        assert_eq!(buf.available(), 20);
        assert_eq!(buf.consume(5), &[7u8; 5]);
        assert_eq!(buf.available(), 15);
        assert_eq!(buf.capacity(), 32);
    }

    #[test]
    fn compaction_reclaims_before_growing() {
        let mut buf = StagingBuffer::with_capacity(32).unwrap();
        fill(&mut buf, &(0u8..32).collect::<Vec<_>>());
        buf.consume(20);
        buf.mark_discard();
        // Tail is full; the mark at 20 rounds down to block 16, freeing 16.
        buf.make_room(16, BLOCK).unwrap();
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.available(), 12);
        // Live bytes slid intact: positions 20..32 of the original fill.
        assert_eq!(buf.consume(12), &(20u8..32).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn grows_by_exact_need_when_mark_useless() {
        let mut buf = StagingBuffer::with_capacity(32).unwrap();
        fill(&mut buf, &[1u8; 32]);
        buf.consume(4); // mark stays 0, nothing reclaimable
        buf.make_room(16, BLOCK).unwrap();
        assert_eq!(buf.capacity(), 48);
        assert_eq!(buf.available(), 28);
    }

    #[test]
    fn skip_reset_restores_invariant() {
        let mut buf = StagingBuffer::with_capacity(32).unwrap();
        fill(&mut buf, &[2u8; 32]);
        buf.consume(30);
        buf.mark_discard();
        buf.reset_after_skip(3, BLOCK);
        assert_eq!(buf.available(), 13);
    }
}
