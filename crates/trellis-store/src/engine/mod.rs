//! The ordered transactional engine contract.
//!
//! The column store does not implement durability, page management, or
//! isolation itself; it runs against any engine that provides ordered
//! binary keys, seekable cursors, and atomic transactions. This module
//! defines that contract as traits, and [`memory`] provides the in-memory
//! reference implementation.
//!
//! Two points of the contract matter most to the scan algorithms:
//!
//! - Cursor exhaustion ("no more entries") is `Ok(None)`, structurally
//!   distinct from `Err`. Reaching the end of a table is a normal scan
//!   boundary, not a failure.
//! - A write transaction is atomic: either every mutation it made is
//!   published by [`WriteTransaction::commit`], or none of them are.
//!   Dropping an uncommitted write transaction aborts it.

use bytes::Bytes;
use trellis_common::StoreResult;

pub mod memory;

pub use memory::MemoryEngine;

/// One engine record: a packed key and its column value.
pub type Entry = (Bytes, Bytes);

/// Handle to a table opened within a transaction.
///
/// Handles are only meaningful to the transaction that produced them and
/// must not outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableHandle(u32);

impl TableHandle {
    /// Creates a handle from an engine-assigned identifier.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the engine-assigned identifier.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An ordered cursor over one table's records.
///
/// Cursors are private to a single operation invocation: they must not be
/// shared across operations or retained after the operation returns.
pub trait Cursor {
    /// Positions the cursor at the first record whose key is `>= key` and
    /// returns it, or `Ok(None)` when no such record exists.
    fn seek(&mut self, key: &[u8]) -> StoreResult<Option<Entry>>;

    /// Advances to the record after the current position and returns it,
    /// or `Ok(None)` at the end of the table. On an unpositioned cursor
    /// this returns the first record.
    fn next(&mut self) -> StoreResult<Option<Entry>>;
}

/// A read-capable engine transaction over a consistent snapshot.
pub trait Transaction {
    /// Opens a table by name, creating it when `create` is set.
    ///
    /// Tables are created lazily on first reference. A read-only
    /// transaction cannot create tables; it resolves a missing name to an
    /// empty view instead, which is observationally identical because
    /// tables are not enumerable through this interface.
    fn open_table(&mut self, name: &[u8], create: bool) -> StoreResult<TableHandle>;

    /// Opens a fresh cursor over the table's records in key order.
    fn open_cursor(&self, table: TableHandle) -> StoreResult<Box<dyn Cursor + '_>>;
}

/// A write-capable engine transaction.
///
/// Writers serialize with each other; readers are never blocked and keep
/// observing their snapshot.
pub trait WriteTransaction: Transaction {
    /// Stores `value` under `key`, overwriting any existing record.
    fn put(&mut self, table: TableHandle, key: &[u8], value: Bytes) -> StoreResult<()>;

    /// Removes the record under `key`. Removing an absent key is a no-op.
    fn delete(&mut self, table: TableHandle, key: &[u8]) -> StoreResult<()>;

    /// Atomically publishes every mutation made in this transaction.
    ///
    /// At most once per transaction; later calls return
    /// [`trellis_common::StoreError::TxnClosed`].
    fn commit(&mut self) -> StoreResult<()>;

    /// Discards every mutation made in this transaction. Idempotent, and
    /// harmless after a commit.
    fn abort(&mut self);
}

/// An ordered, transactional key-value engine.
pub trait Engine: Send + Sync {
    /// Begins a read-only transaction over a point-in-time snapshot.
    fn begin_read(&self) -> StoreResult<Box<dyn Transaction + '_>>;

    /// Begins a write transaction, serializing with other writers.
    fn begin_write(&self) -> StoreResult<Box<dyn WriteTransaction + '_>>;
}
