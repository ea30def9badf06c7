//! The command log contract and its single-node implementation.
//!
//! The command log is the boundary to the consensus layer. The contract
//! the application side relies on: each appended command is applied
//! exactly once on this node, in append order, each under its own fresh
//! transaction. How agreement across nodes is reached is not this crate's
//! concern.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use trellis_common::StoreResult;

use crate::apply::{Applier, ApplyOutcome};
use crate::command::Command;

/// Position of a command in the applied sequence. Indices are contiguous
/// and start at 1.
pub type LogIndex = u64;

/// The ordered, exactly-once command application contract.
///
/// `Err` from [`append`](CommandLog::append) means the command could not
/// be submitted or agreed and nothing was applied. A command that was
/// applied and failed deterministically reports through
/// [`ApplyOutcome::error`] instead, so every node records the same
/// failure.
pub trait CommandLog: Send + Sync {
    /// Submits a command and returns its outcome once applied locally.
    fn append(&self, cmd: Command) -> StoreResult<ApplyOutcome>;

    /// Index of the most recently applied command.
    fn last_applied(&self) -> LogIndex;
}

/// Single-node command log.
///
/// Serializes appends on a mutex and applies each command immediately; the
/// stand-in for a consensus engine in embedded use and tests. Entries are
/// not retained — there are no followers to replay them to.
pub struct LocalLog {
    applier: Arc<Applier>,
    last_applied: Mutex<LogIndex>,
}

impl LocalLog {
    /// Creates a log applying commands through the given applier.
    pub fn new(applier: Arc<Applier>) -> Self {
        Self {
            applier,
            last_applied: Mutex::new(0),
        }
    }

    /// Returns the shared applier.
    pub fn applier(&self) -> &Arc<Applier> {
        &self.applier
    }
}

impl CommandLog for LocalLog {
    fn append(&self, cmd: Command) -> StoreResult<ApplyOutcome> {
        let mut last_applied = self.last_applied.lock();
        *last_applied += 1;
        debug!(index = *last_applied, command = %cmd.name, "applying command");
        Ok(self.applier.apply(&cmd))
    }

    fn last_applied(&self) -> LogIndex {
        *self.last_applied.lock()
    }
}
