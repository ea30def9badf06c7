//! # trellis-repl
//!
//! Replicated command application for TrellisDB.
//!
//! The column store mutates state only through deterministic commands, so
//! a consensus layer can replay the same command sequence on every node
//! and all nodes converge on identical state. This crate provides the
//! pieces on the application side of that boundary:
//!
//! - [`Command`]: an operation name plus positional byte-string
//!   arguments, the unit that is replicated and replayed.
//! - [`Applier`]: executes one command under one fresh engine
//!   transaction and maps its error state to commit or abort.
//! - [`CommandLog`]: the contract a consensus layer must satisfy; each
//!   appended command is applied exactly once per node, in append order.
//! - [`LocalLog`]: the single-node implementation, for embedded use and
//!   tests.
//!
//! The consensus protocol itself (leader election, log replication,
//! quorum) is not implemented here; a consensus engine plugs in as
//! another [`CommandLog`] implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod command;
pub mod log;

pub use apply::{Applier, ApplyOutcome};
pub use command::Command;
pub use log::{CommandLog, LocalLog, LogIndex};
