//! The range query engine: index range reads resolved to event records.
//!
//! One call is one store round trip: the script returns every index entry
//! with score ≥ the lower bound, ascending, already dereferenced to flat
//! records. The engine's only job on top is decoding each flat record
//! through the codec. An empty result is not an error.

use std::sync::Arc;

use streamstore_core::{EventRecord, Result};
use streamstore_storage::ScriptedStore;

/// Resolves an index plus a lower bound into ordered event records.
pub struct RangeQueryEngine<S> {
    store: Arc<S>,
}

impl<S: ScriptedStore> RangeQueryEngine<S> {
    /// Create an engine over a store handle.
    pub fn new(store: Arc<S>) -> Self {
        RangeQueryEngine { store }
    }

    /// All events in the index with score ≥ `min_score`, ascending by
    /// score with lexical tie-break on event id, eagerly materialized.
    pub fn query(&self, index_key: &str, min_score: f64) -> Result<Vec<EventRecord>> {
        self.store
            .range_by_score(index_key, min_score)?
            .iter()
            .map(|fields| EventRecord::from_flat_fields(fields))
            .collect()
    }
}
