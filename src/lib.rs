//! # streamstore
//!
//! Append-only event streams over a key-value store that offers single-key
//! atomicity and server-side scripting but no native multi-key
//! transactions.
//!
//! A multi-key write (event body + three secondary indexes) behaves
//! atomically, optimistic concurrency is enforced per aggregate, and two
//! read patterns are supported: all events of a stream from version N, and
//! all events since timestamp T.
//!
//! ## Quick Start
//!
//! ```ignore
//! use streamstore::prelude::*;
//!
//! let mut store = StreamStore::in_memory();
//!
//! // Create a stream from its seed events
//! store.create(&Stream::new("orders", vec![event]))?;
//!
//! // Append, with per-aggregate optimistic concurrency
//! store.append_to("orders", &more_events)?;
//!
//! // Read back
//! let history = store.load("orders", None)?;
//! let recent = store.replay("orders", Some(since), &filter)?;
//!
//! // Or batch appends into one atomic unit
//! store.begin_transaction()?;
//! store.append_to("orders", &batch)?;
//! store.commit()?;
//! ```
//!
//! ## Architecture
//!
//! - `streamstore-core` — error taxonomy, key layout, record codec
//! - `streamstore-storage` — the store protocol ([`ScriptedStore`]) and the
//!   in-process [`MemoryStore`] reference backend
//! - `streamstore-engine` — append engine, range query engine, transaction
//!   coordinator
//! - `streamstore-api` — the [`StreamAdapter`] facade
//!
//! A wire client to a real key-value server plugs in by implementing
//! [`ScriptedStore`]; everything above it is backend-agnostic.

#![warn(missing_docs)]

mod store;

pub mod prelude;

pub use store::StreamStore;

// Re-export the facade and core types
pub use streamstore_api::{Stream, StreamAdapter};
pub use streamstore_core::{
    timestamp_score, Error, EventRecord, Result, StreamKey, AGGREGATE_ID_KEY, TIMESTAMP_FORMAT,
};
pub use streamstore_storage::{FlatRecord, InsertEvent, MemoryStore, ScriptedStore};
