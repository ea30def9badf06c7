//! In-memory reference engine.
//!
//! Ordered and snapshot-isolated, with single-writer semantics:
//!
//! - The committed state is an immutable [`Arc`] snapshot. Read
//!   transactions clone the `Arc` and keep observing that state no matter
//!   what commits afterwards.
//! - A write transaction takes the writer lock, clones the table set into
//!   a private working copy, mutates it, and publishes the copy as the new
//!   snapshot on commit. Aborting (or dropping) the transaction discards
//!   the copy, so readers see whole commits or nothing.
//!
//! Tables are `BTreeMap`s keyed by packed key bytes, which gives the
//! lexicographic ordering the packed-key layout relies on. The clone-on-
//! write transaction copies map structure, not payloads: stored values are
//! refcounted [`Bytes`].

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard, RwLock};
use trellis_common::{StoreError, StoreResult};

use super::{Cursor, Engine, Entry, TableHandle, Transaction, WriteTransaction};

/// Handle a read transaction returns for a table that does not exist yet.
const EMPTY_VIEW: TableHandle = TableHandle::new(u32::MAX);

type Table = BTreeMap<Vec<u8>, Bytes>;

/// The committed tables: name to handle index, and the tables themselves.
#[derive(Debug, Clone, Default)]
struct TableSet {
    names: HashMap<Vec<u8>, u32>,
    tables: Vec<Table>,
}

impl TableSet {
    fn table(&self, handle: TableHandle) -> StoreResult<&Table> {
        self.tables
            .get(handle.raw() as usize)
            .ok_or_else(|| StoreError::Engine(format!("invalid table handle {}", handle.raw())))
    }

    fn table_mut(&mut self, handle: TableHandle) -> StoreResult<&mut Table> {
        self.tables
            .get_mut(handle.raw() as usize)
            .ok_or_else(|| StoreError::Engine(format!("invalid table handle {}", handle.raw())))
    }
}

/// In-memory ordered transactional engine.
///
/// The reference engine for tests and single-node deployments; state lives
/// for the process lifetime and tables are never removed.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: RwLock<Arc<TableSet>>,
    writer: Mutex<()>,
}

impl MemoryEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for MemoryEngine {
    fn begin_read(&self) -> StoreResult<Box<dyn Transaction + '_>> {
        Ok(Box::new(ReadTxn {
            snapshot: Arc::clone(&self.state.read()),
            empty: Table::new(),
        }))
    }

    fn begin_write(&self) -> StoreResult<Box<dyn WriteTransaction + '_>> {
        let guard = self.writer.lock();
        let working = TableSet::clone(&self.state.read());
        Ok(Box::new(WriteTxn {
            engine: self,
            _writer: guard,
            working,
            closed: false,
        }))
    }
}

/// A read transaction: an immutable snapshot of the committed state.
struct ReadTxn {
    snapshot: Arc<TableSet>,
    /// Backing table for [`EMPTY_VIEW`] handles.
    empty: Table,
}

impl Transaction for ReadTxn {
    fn open_table(&mut self, name: &[u8], _create: bool) -> StoreResult<TableHandle> {
        match self.snapshot.names.get(name) {
            Some(&id) => Ok(TableHandle::new(id)),
            None => Ok(EMPTY_VIEW),
        }
    }

    fn open_cursor(&self, table: TableHandle) -> StoreResult<Box<dyn Cursor + '_>> {
        let table = if table == EMPTY_VIEW {
            &self.empty
        } else {
            self.snapshot.table(table)?
        };
        Ok(Box::new(MemoryCursor::new(table)))
    }
}

/// A write transaction: a private working copy of the table set, published
/// atomically on commit.
struct WriteTxn<'a> {
    engine: &'a MemoryEngine,
    _writer: MutexGuard<'a, ()>,
    working: TableSet,
    closed: bool,
}

impl WriteTxn<'_> {
    fn check_open(&self) -> StoreResult<()> {
        if self.closed {
            Err(StoreError::TxnClosed)
        } else {
            Ok(())
        }
    }
}

impl Transaction for WriteTxn<'_> {
    fn open_table(&mut self, name: &[u8], create: bool) -> StoreResult<TableHandle> {
        self.check_open()?;
        if let Some(&id) = self.working.names.get(name) {
            return Ok(TableHandle::new(id));
        }
        if !create {
            return Err(StoreError::TableOpen {
                name: String::from_utf8_lossy(name).into_owned(),
                reason: "table does not exist".to_string(),
            });
        }
        let id = self.working.tables.len() as u32;
        self.working.names.insert(name.to_vec(), id);
        self.working.tables.push(Table::new());
        Ok(TableHandle::new(id))
    }

    fn open_cursor(&self, table: TableHandle) -> StoreResult<Box<dyn Cursor + '_>> {
        self.check_open()?;
        Ok(Box::new(MemoryCursor::new(self.working.table(table)?)))
    }
}

impl WriteTransaction for WriteTxn<'_> {
    fn put(&mut self, table: TableHandle, key: &[u8], value: Bytes) -> StoreResult<()> {
        self.check_open()?;
        self.working.table_mut(table)?.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, table: TableHandle, key: &[u8]) -> StoreResult<()> {
        self.check_open()?;
        self.working.table_mut(table)?.remove(key);
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.check_open()?;
        self.closed = true;
        *self.engine.state.write() = Arc::new(std::mem::take(&mut self.working));
        Ok(())
    }

    fn abort(&mut self) {
        self.closed = true;
    }
}

enum Position {
    Unpositioned,
    At(Vec<u8>),
    Exhausted,
}

/// Cursor over one table of the owning transaction's view.
struct MemoryCursor<'a> {
    table: &'a Table,
    pos: Position,
}

impl<'a> MemoryCursor<'a> {
    fn new(table: &'a Table) -> Self {
        Self {
            table,
            pos: Position::Unpositioned,
        }
    }

    fn record(&mut self, found: Option<(&Vec<u8>, &Bytes)>) -> Option<Entry> {
        match found {
            Some((key, value)) => {
                self.pos = Position::At(key.clone());
                Some((Bytes::copy_from_slice(key), value.clone()))
            }
            None => {
                self.pos = Position::Exhausted;
                None
            }
        }
    }
}

impl Cursor for MemoryCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> StoreResult<Option<Entry>> {
        let found = self
            .table
            .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
            .next();
        Ok(self.record(found))
    }

    fn next(&mut self) -> StoreResult<Option<Entry>> {
        let found = match &self.pos {
            Position::Unpositioned => self.table.iter().next(),
            Position::At(last) => self
                .table
                .range::<[u8], _>((Bound::Excluded(last.as_slice()), Bound::Unbounded))
                .next(),
            Position::Exhausted => None,
        };
        Ok(self.record(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(engine: &MemoryEngine, table: &[u8], key: &[u8], value: &[u8]) {
        let mut txn = engine.begin_write().unwrap();
        let t = txn.open_table(table, true).unwrap();
        txn.put(t, key, Bytes::copy_from_slice(value)).unwrap();
        txn.commit().unwrap();
    }

    fn read_all(engine: &MemoryEngine, table: &[u8]) -> Vec<(Bytes, Bytes)> {
        let mut txn = engine.begin_read().unwrap();
        let t = txn.open_table(table, false).unwrap();
        let mut cursor = txn.open_cursor(t).unwrap();
        let mut out = Vec::new();
        let mut current = cursor.next().unwrap();
        while let Some(entry) = current {
            out.push(entry);
            current = cursor.next().unwrap();
        }
        out
    }

    #[test]
    fn test_put_and_scan() {
        let engine = MemoryEngine::new();
        put(&engine, b"t", b"b", b"2");
        put(&engine, b"t", b"a", b"1");

        let entries = read_all(&engine, b"t");
        assert_eq!(entries.len(), 2);
        // Key order, not insertion order.
        assert_eq!(entries[0].0.as_ref(), b"a");
        assert_eq!(entries[1].0.as_ref(), b"b");
    }

    #[test]
    fn test_missing_table_reads_empty() {
        let engine = MemoryEngine::new();
        assert!(read_all(&engine, b"nope").is_empty());
    }

    #[test]
    fn test_write_txn_requires_create() {
        let engine = MemoryEngine::new();
        let mut txn = engine.begin_write().unwrap();
        assert!(matches!(
            txn.open_table(b"nope", false),
            Err(StoreError::TableOpen { .. })
        ));
        // Creating it succeeds and is visible within the transaction.
        let t = txn.open_table(b"nope", true).unwrap();
        assert!(txn.open_cursor(t).is_ok());
    }

    #[test]
    fn test_snapshot_isolation() {
        let engine = MemoryEngine::new();
        put(&engine, b"t", b"k", b"old");

        // Open the reader before the second commit.
        let mut reader = engine.begin_read().unwrap();
        let t = reader.open_table(b"t", false).unwrap();

        put(&engine, b"t", b"k", b"new");

        let mut cursor = reader.open_cursor(t).unwrap();
        let (_, value) = cursor.seek(b"k").unwrap().unwrap();
        assert_eq!(value.as_ref(), b"old");

        // A fresh reader sees the commit.
        let entries = read_all(&engine, b"t");
        assert_eq!(entries[0].1.as_ref(), b"new");
    }

    #[test]
    fn test_abort_discards_writes() {
        let engine = MemoryEngine::new();
        put(&engine, b"t", b"k", b"v");
        {
            let mut txn = engine.begin_write().unwrap();
            let t = txn.open_table(b"t", true).unwrap();
            txn.delete(t, b"k").unwrap();
            txn.put(t, b"other", Bytes::from_static(b"x")).unwrap();
            txn.abort();
            assert!(matches!(txn.commit(), Err(StoreError::TxnClosed)));
        }
        let entries = read_all(&engine, b"t");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.as_ref(), b"k");
    }

    #[test]
    fn test_drop_without_commit_discards_writes() {
        let engine = MemoryEngine::new();
        {
            let mut txn = engine.begin_write().unwrap();
            let t = txn.open_table(b"t", true).unwrap();
            txn.put(t, b"k", Bytes::from_static(b"v")).unwrap();
            // Dropped here without commit.
        }
        assert!(read_all(&engine, b"t").is_empty());
    }

    #[test]
    fn test_commit_is_at_most_once() {
        let engine = MemoryEngine::new();
        let mut txn = engine.begin_write().unwrap();
        let t = txn.open_table(b"t", true).unwrap();
        txn.put(t, b"k", Bytes::from_static(b"v")).unwrap();
        txn.commit().unwrap();
        assert!(matches!(txn.commit(), Err(StoreError::TxnClosed)));
        assert!(matches!(
            txn.put(t, b"k2", Bytes::from_static(b"v2")),
            Err(StoreError::TxnClosed)
        ));
    }

    #[test]
    fn test_cursor_seek_and_next() {
        let engine = MemoryEngine::new();
        put(&engine, b"t", b"a", b"1");
        put(&engine, b"t", b"c", b"3");
        put(&engine, b"t", b"e", b"5");

        let mut txn = engine.begin_read().unwrap();
        let t = txn.open_table(b"t", false).unwrap();
        let mut cursor = txn.open_cursor(t).unwrap();

        // Seek lands on the first key >= the target.
        let (key, _) = cursor.seek(b"b").unwrap().unwrap();
        assert_eq!(key.as_ref(), b"c");
        let (key, _) = cursor.next().unwrap().unwrap();
        assert_eq!(key.as_ref(), b"e");

        // Exhaustion is Ok(None) and stays exhausted.
        assert!(cursor.next().unwrap().is_none());
        assert!(cursor.next().unwrap().is_none());

        // Seeking repositions an exhausted cursor.
        let (key, _) = cursor.seek(b"a").unwrap().unwrap();
        assert_eq!(key.as_ref(), b"a");

        // Seeking past the last key exhausts immediately.
        assert!(cursor.seek(b"z").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let engine = MemoryEngine::new();
        let mut txn = engine.begin_write().unwrap();
        let t = txn.open_table(b"t", true).unwrap();
        txn.delete(t, b"ghost").unwrap();
        txn.commit().unwrap();
    }
}
