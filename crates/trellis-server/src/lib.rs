//! # trellis-server
//!
//! Network server and process bootstrap for TrellisDB.
//!
//! This crate provides:
//!
//! - **Protocol**: length-delimited frames carrying bincode-encoded
//!   [`protocol::Request`] and [`protocol::Response`] messages, plus a
//!   [`protocol::Client`] for tests and tooling.
//! - **Service**: the tokio TCP accept loop that decodes command frames,
//!   submits them to the command log, and writes back responses.
//! - **Config**: the serde/TOML [`config::ServerConfig`].
//!
//! The `trellisd` binary wires these together with the in-memory engine
//! and the single-node command log.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod protocol;
pub mod service;

pub use config::ServerConfig;
pub use protocol::{Client, Request, Response};
pub use service::Server;
