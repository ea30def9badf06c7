//! Row-boundary scanning.
//!
//! A row's column entries are contiguous in packed-key order, so one
//! cursor pass enumerates them: seek to the row's lower bound, decode each
//! packed key, and stop at the first key belonging to a different row or
//! when the cursor is exhausted. Neither stop condition is an error — an
//! empty table, a row with no entries, and reaching the end of the table
//! mid-row all terminate cleanly with whatever was collected.

use bytes::Bytes;
use trellis_common::{KeyVal, StoreResult};

use crate::engine::{TableHandle, Transaction};
use crate::keycodec;

/// Enumerates one row's column entries in ascending column-key order.
///
/// With a filter, an entry is included only when its column key is
/// byte-for-byte equal to one of the filter entries. The filter is an
/// unordered small set; matching is a linear scan.
pub fn scan_row<T>(
    txn: &T,
    table: TableHandle,
    row_key: &[u8],
    filter: Option<&[Bytes]>,
) -> StoreResult<Vec<KeyVal>>
where
    T: Transaction + ?Sized,
{
    let mut entries = Vec::new();
    walk_row(txn, table, row_key, |packed, col, value| {
        if matches_filter(col, filter) {
            entries.push(KeyVal::new(packed.slice_ref(col), value));
        }
    })?;
    Ok(entries)
}

/// Collects the packed keys of one row's entries.
///
/// The delete phases of `PutRow` and `DelRow` collect first and delete
/// second, keeping the cursor pass and the mutating calls in separate
/// phases of the same transaction.
pub fn collect_row_keys<T>(
    txn: &T,
    table: TableHandle,
    row_key: &[u8],
) -> StoreResult<Vec<Bytes>>
where
    T: Transaction + ?Sized,
{
    let mut keys = Vec::new();
    walk_row(txn, table, row_key, |packed, _col, _value| {
        keys.push(packed);
    })?;
    Ok(keys)
}

/// Runs the boundary scan, invoking `visit` with each in-row record's
/// packed key, column-key slice, and value.
fn walk_row<T, F>(txn: &T, table: TableHandle, row_key: &[u8], mut visit: F) -> StoreResult<()>
where
    T: Transaction + ?Sized,
    F: FnMut(Bytes, &[u8], Bytes),
{
    let mut cursor = txn.open_cursor(table)?;
    let mut current = cursor.seek(&keycodec::seek_prefix(row_key))?;
    while let Some((packed, value)) = current {
        let (row, col) = keycodec::unpack(&packed)?;
        if row != row_key {
            break;
        }
        visit(packed.clone(), col, value);
        current = cursor.next()?;
    }
    Ok(())
}

fn matches_filter(col: &[u8], filter: Option<&[Bytes]>) -> bool {
    match filter {
        None => true,
        Some(names) => names.iter().any(|name| name.as_ref() == col),
    }
}
