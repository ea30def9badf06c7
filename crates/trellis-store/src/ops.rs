//! The five deterministic command operations.
//!
//! Each operation receives a command's positional arguments and an open
//! write transaction, and returns the serialized result bytes. The
//! replicated apply path hands every command a fresh write transaction; a
//! write transaction is also a read transaction, so the read operations
//! run under it unchanged.
//!
//! Argument shape is validated before any engine call, so a rejected
//! command leaves the transaction untouched. Write operations commit on
//! their own success path and return empty bytes; read operations never
//! commit — the applier aborts the transaction after a read. Operating on
//! an absent row is not an error anywhere: reads return a zero-entry
//! result and deletes succeed as no-ops.
//!
//! Argument layout (positional, order-significant):
//!
//! | Operation | args\[0\] | args\[1\] | args\[2..\] |
//! |-----------|-----------|-----------|-------------|
//! | `PutCols` | row key | table name | column key/value pairs, even count |
//! | `PutRow`  | row key | table name | column key/value pairs, even count |
//! | `GetRow`  | row key | table name | (none) |
//! | `GetCols` | row key | table name | requested column names |
//! | `DelRow`  | row key | table name | (none) |

use bytes::Bytes;
use trellis_common::{StoreError, StoreResult};

use crate::engine::{TableHandle, Transaction, WriteTransaction};
use crate::keycodec;
use crate::scanner;
use crate::wire;

/// Writes the given columns into a row, overwriting existing values for
/// the same column keys and leaving other columns alone.
pub fn put_cols(args: &[Bytes], txn: &mut dyn WriteTransaction) -> StoreResult<Bytes> {
    let (row_key, table_name) = require_base(args)?;
    let pairs = require_pairs(args)?;
    let table = txn.open_table(table_name, true)?;
    write_cols(txn, table, row_key, pairs)?;
    txn.commit()?;
    Ok(Bytes::new())
}

/// Replaces a row wholesale: deletes every existing column entry for the
/// row, then writes the given columns. Both phases run in the one
/// transaction, so a concurrent reader sees the old row in full or the
/// new row in full, never a mix.
pub fn put_row(args: &[Bytes], txn: &mut dyn WriteTransaction) -> StoreResult<Bytes> {
    let (row_key, table_name) = require_base(args)?;
    let pairs = require_pairs(args)?;
    let table = txn.open_table(table_name, true)?;
    delete_row_entries(txn, table, row_key)?;
    write_cols(txn, table, row_key, pairs)?;
    txn.commit()?;
    Ok(Bytes::new())
}

/// Fetches a full row, serialized in column-key order.
pub fn get_row(args: &[Bytes], txn: &mut dyn WriteTransaction) -> StoreResult<Bytes> {
    read_row(args, txn)
}

/// Fetches the requested columns of a row. An empty request list means no
/// filter was supplied and fetches the full row; callers wanting zero
/// columns must not issue the command.
pub fn get_cols(args: &[Bytes], txn: &mut dyn WriteTransaction) -> StoreResult<Bytes> {
    read_cols(args, txn)
}

/// Deletes every column entry of a row. Deleting an absent row is a no-op
/// success.
pub fn del_row(args: &[Bytes], txn: &mut dyn WriteTransaction) -> StoreResult<Bytes> {
    let (row_key, table_name) = require_exact(args)?;
    let table = txn.open_table(table_name, true)?;
    delete_row_entries(txn, table, row_key)?;
    txn.commit()?;
    Ok(Bytes::new())
}

/// `GetRow` against any transaction, including a read-only one. The local
/// read path serves this from an engine snapshot without going through
/// the command log.
pub fn read_row<T>(args: &[Bytes], txn: &mut T) -> StoreResult<Bytes>
where
    T: Transaction + ?Sized,
{
    let (row_key, table_name) = require_exact(args)?;
    let table = txn.open_table(table_name, true)?;
    let entries = scanner::scan_row(txn, table, row_key, None)?;
    Ok(wire::encode_columns(&entries))
}

/// `GetCols` against any transaction, including a read-only one.
pub fn read_cols<T>(args: &[Bytes], txn: &mut T) -> StoreResult<Bytes>
where
    T: Transaction + ?Sized,
{
    let (row_key, table_name) = require_base(args)?;
    let names = &args[2..];
    let filter = if names.is_empty() { None } else { Some(names) };
    let table = txn.open_table(table_name, true)?;
    let entries = scanner::scan_row(txn, table, row_key, filter)?;
    Ok(wire::encode_columns(&entries))
}

/// Packs and writes each `(columnKey, columnValue)` pair of the row.
fn write_cols(
    txn: &mut dyn WriteTransaction,
    table: TableHandle,
    row_key: &[u8],
    pairs: &[Bytes],
) -> StoreResult<()> {
    for pair in pairs.chunks_exact(2) {
        let packed = keycodec::pack(row_key, &pair[0]);
        txn.put(table, &packed, pair[1].clone())?;
    }
    Ok(())
}

/// Deletes every column entry of the row: collect the packed keys with
/// the boundary scan, then delete each within the same transaction.
fn delete_row_entries(
    txn: &mut dyn WriteTransaction,
    table: TableHandle,
    row_key: &[u8],
) -> StoreResult<()> {
    let packed_keys = scanner::collect_row_keys(txn, table, row_key)?;
    for key in packed_keys {
        txn.delete(table, &key)?;
    }
    Ok(())
}

fn require_base(args: &[Bytes]) -> StoreResult<(&[u8], &[u8])> {
    if args.len() < 2 {
        return Err(StoreError::InvalidArguments(format!(
            "expected a row key and table name, got {} arguments",
            args.len()
        )));
    }
    Ok((&args[0], &args[1]))
}

fn require_exact(args: &[Bytes]) -> StoreResult<(&[u8], &[u8])> {
    if args.len() != 2 {
        return Err(StoreError::InvalidArguments(format!(
            "expected exactly a row key and table name, got {} arguments",
            args.len()
        )));
    }
    Ok((&args[0], &args[1]))
}

fn require_pairs(args: &[Bytes]) -> StoreResult<&[Bytes]> {
    let pairs = &args[2..];
    if pairs.len() % 2 != 0 {
        return Err(StoreError::InvalidArguments(format!(
            "column arguments must be key/value pairs, got odd count {}",
            pairs.len()
        )));
    }
    Ok(pairs)
}
