//! Deterministic command application.
//!
//! The applier is the state-machine side of the replication boundary: it
//! executes one agreed command under one fresh engine transaction. Write
//! handlers commit on their own success path; any handler error aborts
//! the transaction, so a failed command leaves no partial state. All
//! nodes applying the same command sequence therefore converge on
//! identical state.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};
use trellis_common::{StoreError, StoreResult};
use trellis_store::engine::Engine;
use trellis_store::{ops, registry, Registry};

use crate::command::Command;

/// The outcome of applying one command.
///
/// `error` distinguishes a command that was applied and failed
/// deterministically from transport-level failures, which surface as
/// `Err` from [`crate::CommandLog::append`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The serialized result bytes; empty for writes.
    pub data: Bytes,
    /// The failure reason, when the command failed.
    pub error: Option<String>,
}

impl ApplyOutcome {
    /// Creates a successful outcome carrying result bytes.
    pub fn ok(data: Bytes) -> Self {
        Self { data, error: None }
    }

    /// Creates a failed outcome.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            data: Bytes::new(),
            error: Some(error.into()),
        }
    }

    /// Whether the command succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Executes commands against the local engine.
///
/// One applier is shared by the command log (for replicated commands) and
/// the local read path. It holds the immutable dispatch table built at
/// startup.
pub struct Applier {
    registry: Registry,
    engine: Arc<dyn Engine>,
}

impl Applier {
    /// Creates an applier over the given dispatch table and engine.
    pub fn new(registry: Registry, engine: Arc<dyn Engine>) -> Self {
        Self { registry, engine }
    }

    /// Returns the dispatch table.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Applies one agreed command under a fresh write transaction.
    ///
    /// An unknown command name fails without a transaction ever being
    /// opened. A handler error aborts the transaction wholesale; write
    /// handlers commit internally on success, and read handlers leave the
    /// transaction uncommitted so dropping it here releases it without a
    /// write.
    pub fn apply(&self, cmd: &Command) -> ApplyOutcome {
        let Some(handler) = self.registry.get(&cmd.name) else {
            warn!(command = %cmd.name, "unknown command");
            return ApplyOutcome::fail(StoreError::UnknownCommand(cmd.name.clone()).to_string());
        };
        let mut txn = match self.engine.begin_write() {
            Ok(txn) => txn,
            Err(err) => {
                warn!(command = %cmd.name, error = %err, "could not begin transaction");
                return ApplyOutcome::fail(err.to_string());
            }
        };
        match handler(&cmd.args, txn.as_mut()) {
            Ok(data) => {
                debug!(command = %cmd.name, result_bytes = data.len(), "applied");
                ApplyOutcome::ok(data)
            }
            Err(err) => {
                txn.abort();
                warn!(command = %cmd.name, error = %err, "command failed");
                ApplyOutcome::fail(err.to_string())
            }
        }
    }

    /// Serves a read command from a local engine snapshot, without going
    /// through the command log.
    ///
    /// Only `GetRow` and `GetCols` are readable this way. The snapshot is
    /// consistent but may trail commands still in flight through the log.
    pub fn read(&self, cmd: &Command) -> ApplyOutcome {
        if cmd.name != registry::GET_ROW && cmd.name != registry::GET_COLS {
            return ApplyOutcome::fail(format!("not a read command: {}", cmd.name));
        }
        let mut txn = match self.engine.begin_read() {
            Ok(txn) => txn,
            Err(err) => return ApplyOutcome::fail(err.to_string()),
        };
        let result: StoreResult<Bytes> = if cmd.name == registry::GET_ROW {
            ops::read_row(&cmd.args, txn.as_mut())
        } else {
            ops::read_cols(&cmd.args, txn.as_mut())
        };
        match result {
            Ok(data) => ApplyOutcome::ok(data),
            Err(err) => ApplyOutcome::fail(err.to_string()),
        }
    }
}
