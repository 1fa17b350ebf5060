//! Main entry point for streamstore.
//!
//! `StreamStore` wraps a [`StreamAdapter`] over a chosen backend. Use
//! [`StreamStore::in_memory`] for the in-process reference backend, or
//! [`StreamStore::with_backend`] to plug in a wire client implementing
//! [`ScriptedStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use streamstore_api::{Stream, StreamAdapter};
use streamstore_core::{EventRecord, Result};
use streamstore_storage::{MemoryStore, ScriptedStore};

/// An event stream store.
///
/// One instance is one logical writer: the active-transaction handle it
/// carries is not meant to be shared across concurrent callers. Readers
/// and writers on *different* instances over the same backend are safe —
/// the store-side scripts provide the atomicity.
///
/// # Example
///
/// ```ignore
/// use streamstore::prelude::*;
///
/// let mut store = StreamStore::in_memory();
/// store.create(&Stream::new("orders", seed_events))?;
/// let events = store.load("orders", None)?;
/// ```
pub struct StreamStore<S = MemoryStore> {
    adapter: StreamAdapter<S>,
}

impl StreamStore<MemoryStore> {
    /// Create a store over the in-process reference backend.
    ///
    /// No server, no disk: data lives as long as the backend handle does.
    /// Intended for tests and embedded use.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryStore::new()))
    }
}

impl<S: ScriptedStore> StreamStore<S> {
    /// Create a store over an arbitrary backend.
    ///
    /// The backend must provide the two atomic operations of the store
    /// protocol before first use; script registration is the wire
    /// client's initialization concern.
    pub fn with_backend(backend: Arc<S>) -> Self {
        StreamStore {
            adapter: StreamAdapter::new(backend),
        }
    }

    /// Create a stream from its seed events.
    ///
    /// Fails with `Error::InvalidArgument` if the stream carries zero
    /// events.
    pub fn create(&mut self, stream: &Stream) -> Result<()> {
        self.adapter.create(stream)
    }

    /// Append events to a stream in iteration order.
    ///
    /// Inside an active transaction the appends are buffered until
    /// [`commit`](Self::commit); otherwise each append is one atomic
    /// write.
    pub fn append_to(&mut self, stream_name: &str, events: &[EventRecord]) -> Result<()> {
        self.adapter.append_to(stream_name, events)
    }

    /// All events of a stream with version ≥ `min_version` (default 1),
    /// ascending by version.
    pub fn load(&self, stream_name: &str, min_version: Option<u64>) -> Result<Vec<EventRecord>> {
        self.adapter.load(stream_name, min_version)
    }

    /// All events of a stream created at or after `since`, ascending by
    /// timestamp, post-filtered by exact metadata match.
    pub fn replay(
        &self,
        stream_name: &str,
        since: Option<DateTime<Utc>>,
        metadata_filter: &BTreeMap<String, String>,
    ) -> Result<Vec<EventRecord>> {
        self.adapter.replay(stream_name, since, metadata_filter)
    }

    /// Start buffering appends into one atomic unit.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.adapter.begin_transaction()
    }

    /// Atomically execute everything buffered since
    /// [`begin_transaction`](Self::begin_transaction).
    pub fn commit(&mut self) -> Result<()> {
        self.adapter.commit()
    }

    /// Discard everything buffered since
    /// [`begin_transaction`](Self::begin_transaction).
    pub fn rollback(&mut self) -> Result<()> {
        self.adapter.rollback()
    }

    /// Whether a transaction is currently active.
    pub fn in_transaction(&self) -> bool {
        self.adapter.in_transaction()
    }
}
