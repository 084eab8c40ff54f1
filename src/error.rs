//! Closed error taxonomy of the read path.
//!
//! Every variant is fatal to the current operation and propagates to the
//! caller untouched; nothing is retried internally. Callers are expected to
//! match on kinds: `EndOfStream`/`TruncatedMessage` are normal on corrupt or
//! truncated input, `MalformedVarint`/`NegativeSize` are protocol
//! violations, `AllocationFailure` is resource exhaustion.
//!
//! A failed read leaves the reader's cursors unspecified; the instance must
//! not be reused without external repositioning. Values returned by earlier
//! successful reads stay valid.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VeilError {
    /// A seek would move the logical position past the end of the source.
    #[error("out of space: position {position} would pass source size {size}")]
    OutOfSpace { position: usize, size: usize },

    /// Byte consumption arrived exactly at source end.
    #[error("reached end of stream: position {position}, size {size}")]
    EndOfStream { position: usize, size: usize },

    /// Varint continuation bits never terminated within the byte budget.
    #[error("malformed varint")]
    MalformedVarint,

    /// A length-delimited field declared a negative size.
    #[error("negative length-delimited size")]
    NegativeSize,

    /// A length-delimited field declared more bytes than the source holds.
    #[error("truncated message: declared size exceeds remaining source bytes")]
    TruncatedMessage,

    /// The staging buffer could not be allocated or grown.
    #[error("staging buffer allocation failed")]
    AllocationFailure,
}

pub type Result<T> = std::result::Result<T, VeilError>;
