//! Core value types for TrellisDB.
//!
//! Column keys and values are arbitrary byte strings carried as
//! [`bytes::Bytes`], so slicing a decoded entry out of a larger buffer
//! does not copy.

use std::fmt;

use bytes::Bytes;

/// One column entry: a `(columnKey, columnValue)` pair.
///
/// `KeyVal` is the in-memory shape of a stored record, produced by the row
/// scanner and consumed by the wire serializer. It is owned by the
/// operation that produced it and borrowed until serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyVal {
    /// The column key.
    pub key: Bytes,
    /// The column value.
    pub value: Bytes,
}

impl KeyVal {
    /// Creates a new column entry.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for KeyVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys are usually printable; values can be anything, so show size.
        match std::str::from_utf8(&self.key) {
            Ok(s) => write!(f, "KeyVal({:?}, {} bytes)", s, self.value.len()),
            Err(_) => write!(f, "KeyVal({:?}, {} bytes)", self.key, self.value.len()),
        }
    }
}

impl From<(Bytes, Bytes)> for KeyVal {
    fn from((key, value): (Bytes, Bytes)) -> Self {
        Self { key, value }
    }
}
