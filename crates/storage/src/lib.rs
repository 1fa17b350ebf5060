//! Storage layer for streamstore
//!
//! This crate defines the store protocol — the two server-side atomic
//! operations the core requires from its key-value store — and ships an
//! in-process reference backend:
//! - [`ScriptedStore`]: the protocol trait a wire client implements
//! - [`InsertEvent`]: the atomic multi-index write operation
//! - [`MemoryStore`]: mutex-guarded in-memory backend honoring the
//!   protocol's atomicity contract

#![warn(missing_docs)]

pub mod memory;
pub mod script;

pub use memory::MemoryStore;
pub use script::{FlatRecord, InsertEvent, ScriptedStore};
