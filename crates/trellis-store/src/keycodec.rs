//! Packed-key codec for the wide-column layout.
//!
//! A column entry is stored under a single engine key that packs the row
//! key and column key together:
//!
//! ```text
//! [row key length: u32 LE][row key bytes][column key bytes]
//! ```
//!
//! Within one row the length prefix and row-key bytes are constant, so the
//! engine's lexicographic order over packed keys equals lexicographic
//! order over column keys: a row's entries are contiguous and scannable
//! with a single cursor pass. The length prefix is written before any
//! comparison-relevant bytes, so two rows whose keys are byte-prefixes of
//! one another never interleave.

use bytes::{BufMut, Bytes, BytesMut};
use trellis_common::{StoreError, StoreResult};

/// Size of the row-key length prefix in a packed key.
const LEN_PREFIX: usize = 4;

/// Packs a row key and column key into a single engine key.
pub fn pack(row_key: &[u8], col_key: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(LEN_PREFIX + row_key.len() + col_key.len());
    buf.put_u32_le(row_key.len() as u32);
    buf.put_slice(row_key);
    buf.put_slice(col_key);
    buf.freeze()
}

/// Splits a packed key back into its `(rowKey, columnKey)` parts.
///
/// Returns [`StoreError::MalformedKey`] when the buffer is shorter than
/// the length prefix or than the row-key length it declares.
pub fn unpack(packed: &[u8]) -> StoreResult<(&[u8], &[u8])> {
    if packed.len() < LEN_PREFIX {
        return Err(StoreError::MalformedKey(format!(
            "{} bytes is too short for the length prefix",
            packed.len()
        )));
    }
    let row_len = u32::from_le_bytes([packed[0], packed[1], packed[2], packed[3]]) as usize;
    let rest = &packed[LEN_PREFIX..];
    if rest.len() < row_len {
        return Err(StoreError::MalformedKey(format!(
            "declares a {row_len}-byte row key but only {} bytes follow",
            rest.len()
        )));
    }
    Ok(rest.split_at(row_len))
}

/// The cursor-seek lower bound for a row: `pack(row_key, "")`.
///
/// By the packing order this sorts at or before every packed key of the
/// row and after every packed key of any smaller row.
pub fn seek_prefix(row_key: &[u8]) -> Bytes {
    pack(row_key, b"")
}
