//! # trellis-common
//!
//! Common types and errors for TrellisDB.
//!
//! This crate provides the foundational types shared across all TrellisDB
//! components:
//!
//! - **Errors**: the unified [`StoreError`] type and the [`StoreResult`]
//!   alias used throughout the workspace.
//! - **Types**: [`KeyVal`], the in-memory column entry passed between the
//!   scanner and the wire serializer.
//!
//! ## Example
//!
//! ```rust
//! use trellis_common::{KeyVal, StoreResult};
//!
//! fn example() -> StoreResult<()> {
//!     let entry = KeyVal::new("name", "trellis");
//!     assert_eq!(entry.key.as_ref(), b"name");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use types::KeyVal;
