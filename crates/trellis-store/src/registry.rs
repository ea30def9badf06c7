//! Command dispatch table.
//!
//! The registry maps the five operation names to their handlers. It is
//! constructed once at startup and handed to the application layer; it has
//! no mutation API, so the mapping a node dispatches against is fixed for
//! the process lifetime.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use trellis_common::StoreResult;

use crate::engine::WriteTransaction;
use crate::ops;

/// Name of the merge-write operation.
pub const PUT_COLS: &str = "PutCols";
/// Name of the replace-row operation.
pub const PUT_ROW: &str = "PutRow";
/// Name of the full-row fetch operation.
pub const GET_ROW: &str = "GetRow";
/// Name of the selective fetch operation.
pub const GET_COLS: &str = "GetCols";
/// Name of the row delete operation.
pub const DEL_ROW: &str = "DelRow";

/// A command handler: positional arguments plus a fresh write transaction,
/// returning the serialized result bytes.
pub type Handler = fn(&[Bytes], &mut dyn WriteTransaction) -> StoreResult<Bytes>;

/// The immutable name-to-operation dispatch table.
#[derive(Clone)]
pub struct Registry {
    handlers: HashMap<&'static str, Handler>,
}

impl Registry {
    /// Builds the dispatch table over the five column-store operations.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert(PUT_COLS, ops::put_cols as Handler);
        handlers.insert(PUT_ROW, ops::put_row as Handler);
        handlers.insert(GET_ROW, ops::get_row as Handler);
        handlers.insert(GET_COLS, ops::get_cols as Handler);
        handlers.insert(DEL_ROW, ops::del_row as Handler);
        Self { handlers }
    }

    /// Looks up the handler for an operation name.
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    /// Returns the registered operation names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the table is empty. It never is for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("operations", &self.names())
            .finish()
    }
}
