//! Public facade for streamstore
//!
//! [`StreamAdapter`] composes the key layout, the append and range query
//! engines, and the transaction coordinator into the create/append/load/
//! replay surface consumed by the surrounding framework.

#![warn(missing_docs)]

pub mod adapter;

pub use adapter::{Stream, StreamAdapter};
