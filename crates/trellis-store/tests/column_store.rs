//! End-to-end column-store tests: the command operations driven through
//! the dispatch registry against the in-memory engine.

use bytes::Bytes;
use trellis_common::KeyVal;
use trellis_store::engine::{Engine, MemoryEngine};
use trellis_store::registry::{self, Registry};
use trellis_store::wire;

fn args(items: &[&str]) -> Vec<Bytes> {
    items
        .iter()
        .map(|s| Bytes::copy_from_slice(s.as_bytes()))
        .collect()
}

/// Dispatches one command by name, the way the replicated apply path does:
/// fresh write transaction, abort on error.
fn dispatch(
    engine: &MemoryEngine,
    registry: &Registry,
    name: &str,
    arguments: &[&str],
) -> Result<Bytes, trellis_common::StoreError> {
    let handler = registry.get(name).expect("operation must be registered");
    let mut txn = engine.begin_write().unwrap();
    let result = handler(&args(arguments), txn.as_mut());
    if result.is_err() {
        txn.abort();
    }
    result
}

fn fetch(engine: &MemoryEngine, registry: &Registry, table: &str, row: &str) -> Vec<KeyVal> {
    let bytes = dispatch(engine, registry, registry::GET_ROW, &[row, table]).unwrap();
    wire::decode_columns(&bytes).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let engine = MemoryEngine::new();
    let registry = Registry::new();

    // Two merge-writes accumulate columns.
    dispatch(&engine, &registry, registry::PUT_COLS, &["row1", "t", "x", "1"]).unwrap();
    dispatch(&engine, &registry, registry::PUT_COLS, &["row1", "t", "y", "2"]).unwrap();
    assert_eq!(
        fetch(&engine, &registry, "t", "row1"),
        vec![KeyVal::new("x", "1"), KeyVal::new("y", "2")]
    );

    // A row replacement drops the accumulated columns.
    dispatch(&engine, &registry, registry::PUT_ROW, &["row1", "t", "z", "3"]).unwrap();
    assert_eq!(
        fetch(&engine, &registry, "t", "row1"),
        vec![KeyVal::new("z", "3")]
    );

    // Deleting the row empties it; a second delete still succeeds.
    dispatch(&engine, &registry, registry::DEL_ROW, &["row1", "t"]).unwrap();
    assert!(fetch(&engine, &registry, "t", "row1").is_empty());
    dispatch(&engine, &registry, registry::DEL_ROW, &["row1", "t"]).unwrap();
    assert!(fetch(&engine, &registry, "t", "row1").is_empty());
}

#[test]
fn test_selective_fetch_in_column_order() {
    let engine = MemoryEngine::new();
    let registry = Registry::new();

    dispatch(
        &engine,
        &registry,
        registry::PUT_COLS,
        &["row", "t", "a", "1", "b", "2", "c", "3"],
    )
    .unwrap();

    let bytes = dispatch(&engine, &registry, registry::GET_COLS, &["row", "t", "c", "a"]).unwrap();
    let entries = wire::decode_columns(&bytes).unwrap();
    assert_eq!(entries, vec![KeyVal::new("a", "1"), KeyVal::new("c", "3")]);
}

#[test]
fn test_row_isolation_across_prefix_keys() {
    let engine = MemoryEngine::new();
    let registry = Registry::new();

    dispatch(&engine, &registry, registry::PUT_COLS, &["row", "t", "c", "short"]).unwrap();
    dispatch(&engine, &registry, registry::PUT_COLS, &["rowlong", "t", "c", "long"]).unwrap();

    assert_eq!(
        fetch(&engine, &registry, "t", "row"),
        vec![KeyVal::new("c", "short")]
    );
    assert_eq!(
        fetch(&engine, &registry, "t", "rowlong"),
        vec![KeyVal::new("c", "long")]
    );

    // Replacing one row must not disturb its prefix sibling.
    dispatch(&engine, &registry, registry::PUT_ROW, &["row", "t", "c", "replaced"]).unwrap();
    assert_eq!(
        fetch(&engine, &registry, "t", "rowlong"),
        vec![KeyVal::new("c", "long")]
    );
}

#[test]
fn test_failed_command_leaves_no_trace() {
    let engine = MemoryEngine::new();
    let registry = Registry::new();

    dispatch(&engine, &registry, registry::PUT_COLS, &["row", "t", "a", "1"]).unwrap();

    // Odd trailing count: rejected before the engine is touched.
    let err = dispatch(
        &engine,
        &registry,
        registry::PUT_ROW,
        &["row", "t", "b", "2", "dangling"],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        trellis_common::StoreError::InvalidArguments(_)
    ));

    // The original row survives intact: no partial replacement.
    assert_eq!(
        fetch(&engine, &registry, "t", "row"),
        vec![KeyVal::new("a", "1")]
    );
}
