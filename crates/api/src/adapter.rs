//! The stream adapter: create/append/load/replay over the engines.
//!
//! One adapter owns one store handle and one transaction coordinator.
//! While a transaction is active, appends are buffered against it instead
//! of executed; `commit` flushes them as one atomic unit. The adapter
//! holds no other state — a stream exists only as the keys derived from
//! its name.
//!
//! ## Concurrency
//!
//! One logical writer per adapter instance at a time. Concurrent writers
//! need their own instances (or external serialization); the store-side
//! scripts keep them safe from each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use streamstore_core::{timestamp_score, Error, EventRecord, Result, StreamKey};
use streamstore_engine::{AppendEngine, RangeQueryEngine, TransactionCoordinator};
use streamstore_storage::ScriptedStore;
use tracing::debug;

/// A named stream and the events to seed it with.
#[derive(Debug, Clone)]
pub struct Stream {
    /// Stream name; becomes the key prefix for everything the stream owns
    pub name: String,
    /// Events in append order
    pub events: Vec<EventRecord>,
}

impl Stream {
    /// Create a stream value.
    pub fn new(name: impl Into<String>, events: Vec<EventRecord>) -> Self {
        Stream {
            name: name.into(),
            events,
        }
    }
}

/// The facade over append, range query, and transactions.
pub struct StreamAdapter<S> {
    append: AppendEngine<S>,
    query: RangeQueryEngine<S>,
    txn: TransactionCoordinator<S>,
}

impl<S: ScriptedStore> StreamAdapter<S> {
    /// Create an adapter over a store handle.
    pub fn new(store: Arc<S>) -> Self {
        StreamAdapter {
            append: AppendEngine::new(Arc::clone(&store)),
            query: RangeQueryEngine::new(Arc::clone(&store)),
            txn: TransactionCoordinator::new(store),
        }
    }

    /// Create a stream from its seed events.
    ///
    /// A stream with zero events is rejected with `InvalidArgument`:
    /// nothing about it could be persisted, not even its existence.
    pub fn create(&mut self, stream: &Stream) -> Result<()> {
        if stream.events.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "cannot create stream '{}' without events",
                stream.name
            )));
        }
        debug!(stream = %stream.name, events = stream.events.len(), "creating stream");
        self.append_to(&stream.name, &stream.events)
    }

    /// Append events to a stream in iteration order.
    ///
    /// With an active transaction the operations are buffered; otherwise
    /// each event is one atomic write, visible immediately.
    pub fn append_to(&mut self, stream_name: &str, events: &[EventRecord]) -> Result<()> {
        let key = StreamKey::new(stream_name);
        for record in events {
            if self.txn.is_active() {
                let op = AppendEngine::<S>::build(&key, record)?;
                self.txn.buffer(op)?;
            } else {
                self.append.append(&key, record)?;
            }
        }
        Ok(())
    }

    /// All events of a stream with version ≥ `min_version` (default 1),
    /// strictly ascending by version. No metadata filter is applied.
    pub fn load(&self, stream_name: &str, min_version: Option<u64>) -> Result<Vec<EventRecord>> {
        let key = StreamKey::new(stream_name);
        let min = min_version.unwrap_or(1);
        self.query.query(&key.version_index(), min as f64)
    }

    /// All events of a stream created at or after `since` (default: the
    /// beginning), ascending by timestamp, post-filtered by exact metadata
    /// match.
    ///
    /// A record survives the filter only if it carries every filter key
    /// with exactly the filter value; the check short-circuits on the
    /// first mismatch per record.
    pub fn replay(
        &self,
        stream_name: &str,
        since: Option<DateTime<Utc>>,
        metadata_filter: &BTreeMap<String, String>,
    ) -> Result<Vec<EventRecord>> {
        let key = StreamKey::new(stream_name);
        let min = since.map(|t| timestamp_score(&t)).unwrap_or(0.0);
        let events = self.query.query(&key.time_index(), min)?;
        if metadata_filter.is_empty() {
            return Ok(events);
        }
        Ok(events
            .into_iter()
            .filter(|record| matches_metadata(record, metadata_filter))
            .collect())
    }

    /// Start buffering appends. At most one active transaction per
    /// adapter.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.txn.begin()
    }

    /// Atomically execute everything buffered since `begin_transaction`.
    pub fn commit(&mut self) -> Result<()> {
        self.txn.commit()
    }

    /// Discard everything buffered since `begin_transaction`.
    pub fn rollback(&mut self) -> Result<()> {
        self.txn.rollback()
    }

    /// Whether a transaction is currently active.
    pub fn in_transaction(&self) -> bool {
        self.txn.is_active()
    }
}

fn matches_metadata(record: &EventRecord, filter: &BTreeMap<String, String>) -> bool {
    filter
        .iter()
        .all(|(key, value)| record.metadata.get(key) == Some(value))
}
