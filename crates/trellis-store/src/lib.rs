//! # trellis-store
//!
//! Wide-column storage core for TrellisDB.
//!
//! A row is a set of column-key/column-value pairs. Each column entry is
//! stored as one record in an ordered key-value engine under a packed key
//! that keeps a row's entries contiguous, so row operations become short
//! cursor scans. Mutations are expressed as deterministic commands so a
//! replicated log can replay them identically on every node.
//!
//! Modules, leaf first:
//!
//! - [`keycodec`]: packs `(rowKey, columnKey)` into a single ordered
//!   engine key and back.
//! - [`wire`]: serializes read results into the flat column buffer format.
//! - [`engine`]: the ordered transactional engine contract, plus the
//!   in-memory reference engine.
//! - [`scanner`]: enumerates one row's entries with a boundary cursor
//!   scan.
//! - [`ops`]: the five command operations (`PutCols`, `PutRow`, `GetRow`,
//!   `GetCols`, `DelRow`).
//! - [`registry`]: the immutable command dispatch table.
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use trellis_store::engine::{Engine, MemoryEngine};
//! use trellis_store::{ops, wire};
//!
//! # fn main() -> trellis_common::StoreResult<()> {
//! let engine = MemoryEngine::new();
//!
//! let args: Vec<Bytes> = ["user1", "users", "name", "ada"]
//!     .iter()
//!     .map(|s| Bytes::from_static(s.as_bytes()))
//!     .collect();
//! let mut txn = engine.begin_write()?;
//! ops::put_cols(&args, txn.as_mut())?;
//! drop(txn);
//!
//! let args: Vec<Bytes> = ["user1", "users"]
//!     .iter()
//!     .map(|s| Bytes::from_static(s.as_bytes()))
//!     .collect();
//! let mut txn = engine.begin_read()?;
//! let result = ops::read_row(&args, txn.as_mut())?;
//! let entries = wire::decode_columns(&result)?;
//! assert_eq!(entries.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod keycodec;
pub mod ops;
pub mod registry;
pub mod scanner;
pub mod wire;

pub use engine::{Cursor, Engine, Entry, MemoryEngine, TableHandle, Transaction, WriteTransaction};
pub use registry::{Handler, Registry};
