//! The replicated command type.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A replicated command: an operation name plus positional byte-string
/// arguments.
///
/// Commands are immutable once built. Argument order is part of the wire
/// contract: `args[0]` is the row key, `args[1]` the table name, and
/// `args[2..]` carry column key/value pairs for writes or requested
/// column names for selective reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The operation name, matched against the dispatch table.
    pub name: String,
    /// The positional arguments.
    pub args: Vec<Bytes>,
}

impl Command {
    /// Creates a command.
    pub fn new(name: impl Into<String>, args: Vec<Bytes>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}
