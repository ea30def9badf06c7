//! Read-result serialization.
//!
//! Read commands return their column entries as one flat buffer:
//!
//! ```text
//! [entry count: u32 LE]
//! per entry: [key len: u32 LE][value len: u32 LE][key bytes][value bytes]
//! ```
//!
//! No padding or alignment. Decoding fails with
//! [`StoreError::MalformedBuffer`] whenever the buffer is shorter than its
//! headers declare.

use bytes::{BufMut, Bytes, BytesMut};
use trellis_common::{KeyVal, StoreError, StoreResult};

/// Encodes a list of column entries into the result wire format.
pub fn encode_columns(entries: &[KeyVal]) -> Bytes {
    let mut len = 4 + 8 * entries.len();
    for entry in entries {
        len += entry.key.len() + entry.value.len();
    }
    let mut buf = BytesMut::with_capacity(len);
    buf.put_u32_le(entries.len() as u32);
    for entry in entries {
        buf.put_u32_le(entry.key.len() as u32);
        buf.put_u32_le(entry.value.len() as u32);
        buf.put_slice(&entry.key);
        buf.put_slice(&entry.value);
    }
    buf.freeze()
}

/// Decodes a result buffer back into its column entries, in order.
pub fn decode_columns(mut buf: &[u8]) -> StoreResult<Vec<KeyVal>> {
    let count = take_u32(&mut buf)? as usize;
    // Each entry carries at least its two length headers, which bounds how
    // much we trust the declared count for preallocation.
    let mut entries = Vec::with_capacity(count.min(buf.len() / 8));
    for _ in 0..count {
        let key_len = take_u32(&mut buf)? as usize;
        let val_len = take_u32(&mut buf)? as usize;
        let key = take_slice(&mut buf, key_len)?;
        let value = take_slice(&mut buf, val_len)?;
        entries.push(KeyVal::new(
            Bytes::copy_from_slice(key),
            Bytes::copy_from_slice(value),
        ));
    }
    Ok(entries)
}

fn take_u32(buf: &mut &[u8]) -> StoreResult<u32> {
    if buf.len() < 4 {
        return Err(StoreError::MalformedBuffer(format!(
            "expected a 4-byte length field, {} bytes remain",
            buf.len()
        )));
    }
    let n = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    *buf = &buf[4..];
    Ok(n)
}

fn take_slice<'a>(buf: &mut &'a [u8], len: usize) -> StoreResult<&'a [u8]> {
    if buf.len() < len {
        return Err(StoreError::MalformedBuffer(format!(
            "expected {len} bytes of entry data, {} bytes remain",
            buf.len()
        )));
    }
    let (head, rest) = buf.split_at(len);
    *buf = rest;
    Ok(head)
}
