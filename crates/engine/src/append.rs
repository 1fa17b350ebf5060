//! The append engine: one event, one atomic multi-index write.
//!
//! The engine derives the four keys for the event, builds the flat record,
//! and hands the store one [`InsertEvent`] to execute atomically. The
//! aggregate/version uniqueness check runs inside that same atomic unit on
//! the store side, so a conflict can never slip between a check and a
//! write. Conflicts surface as `Error::Concurrency` and are never retried
//! here.

use std::sync::Arc;

use streamstore_core::{is_standard_field, Error, EventRecord, Result, StreamKey};
use streamstore_storage::{InsertEvent, ScriptedStore};
use tracing::{debug, warn};

/// Executes the atomic multi-index write for one event.
pub struct AppendEngine<S> {
    store: Arc<S>,
}

impl<S: ScriptedStore> AppendEngine<S> {
    /// Create an engine over a store handle.
    pub fn new(store: Arc<S>) -> Self {
        AppendEngine { store }
    }

    /// Build the atomic write operation for a record, without executing it.
    ///
    /// Shared by the direct path and the transaction coordinator so both
    /// produce identical operations. Fails with `InvalidArgument` when the
    /// record is structurally unfit for persistence (zero version, empty
    /// id, metadata shadowing a standard wire field).
    pub fn build(stream: &StreamKey, record: &EventRecord) -> Result<InsertEvent> {
        if record.version == 0 {
            return Err(Error::InvalidArgument(
                "event version must be a positive integer".to_string(),
            ));
        }
        if record.event_id.is_empty() {
            return Err(Error::InvalidArgument("event id must not be empty".to_string()));
        }
        // A metadata key matching a standard wire field would put the field
        // on the flat list twice, and the duplicate wins on decode: the
        // record would persist fine and then fail every later read.
        if let Some(key) = record.metadata.keys().find(|key| is_standard_field(key.as_str())) {
            return Err(Error::InvalidArgument(format!(
                "metadata key '{key}' shadows a standard wire field"
            )));
        }

        Ok(InsertEvent {
            event_id: record.event_id.clone(),
            event_data_key: stream.event_data(&record.event_id),
            version_index_key: stream.version_index(),
            time_index_key: stream.time_index(),
            aggregate_index_key: record
                .aggregate_id()
                .map(|aggregate_id| stream.aggregate_index(aggregate_id)),
            version: record.version,
            timestamp: record.timestamp_score(),
            fields: record.to_flat_fields(),
        })
    }

    /// Append one event to a stream.
    ///
    /// Three index insertions plus the record write become visible
    /// atomically once the store script completes, or not at all.
    pub fn append(&self, stream: &StreamKey, record: &EventRecord) -> Result<()> {
        let op = Self::build(stream, record)?;
        match self.store.insert_event(&op) {
            Ok(()) => {
                debug!(
                    stream = %stream,
                    event_id = %record.event_id,
                    version = record.version,
                    "appended event"
                );
                Ok(())
            }
            Err(err) => {
                if err.is_concurrency() {
                    warn!(
                        stream = %stream,
                        event_id = %record.event_id,
                        version = record.version,
                        "append rejected: version already taken"
                    );
                }
                Err(err)
            }
        }
    }
}
