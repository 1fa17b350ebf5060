//! Write and read engines for streamstore
//!
//! This crate implements the three moving parts between the facade and the
//! store protocol:
//! - [`AppendEngine`]: the atomic multi-index write for one event
//! - [`RangeQueryEngine`]: index range reads resolved to event records
//! - [`TransactionCoordinator`]: buffers appends and commits or discards
//!   them as one atomic unit

#![warn(missing_docs)]

pub mod append;
pub mod query;
pub mod transaction;

pub use append::AppendEngine;
pub use query::RangeQueryEngine;
pub use transaction::TransactionCoordinator;
