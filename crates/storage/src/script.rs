//! The store protocol: atomic server-side operations.
//!
//! The core never talks to a socket. It talks to a [`ScriptedStore`], the
//! seam where a real wire client (connection pool, script registration,
//! timeouts) plugs in. Two operations must be available before first use:
//!
//! - `insert_event` — the atomic multi-index write. All sub-writes become
//!   visible together or not at all, and the uniqueness checks run inside
//!   the same atomic unit, so concurrent appenders to the same
//!   aggregate/version pair can never both succeed.
//! - `range_by_score` — the range read: index entries with score ≥ min,
//!   ascending, each dereferenced to its full flat record in one round
//!   trip.
//!
//! `insert_batch` is the same write discipline applied to a buffered
//! sequence; the transaction coordinator relies on its all-or-nothing
//! outcome.

use streamstore_core::Result;

/// A stored event as a flat ordered field list.
///
/// Standard fields first, then metadata pairs; the record codec in
/// `streamstore-core` owns the interpretation.
pub type FlatRecord = Vec<(String, String)>;

/// The atomic multi-index write for one event.
///
/// Carries every key the script touches, pre-derived by the key layout.
/// The aggregate index key is present only when the event belongs to an
/// aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertEvent {
    /// Event id; the member value inserted into each index
    pub event_id: String,
    /// Key of the flat record
    pub event_data_key: String,
    /// Key of the stream's version index
    pub version_index_key: String,
    /// Key of the stream's time index
    pub time_index_key: String,
    /// Key of the aggregate index, when the event carries an aggregate id
    pub aggregate_index_key: Option<String>,
    /// Version; the score inserted into the version and aggregate indexes
    pub version: u64,
    /// Time-index score: fractional Unix seconds
    pub timestamp: f64,
    /// The flat record stored at `event_data_key`
    pub fields: FlatRecord,
}

/// Atomic operations the key-value store must provide.
///
/// ## Atomicity contract
///
/// Each method is one indivisible unit on the store side. If it is
/// interrupted, none of its sub-effects are visible. Readers never observe
/// a record without its index entries or vice versa.
///
/// ## Uniqueness contract
///
/// `insert_event` rejects with `Error::Concurrency`, before any sub-write,
/// when the version index already holds an entry at `version`, or when the
/// aggregate index (if present) does. The check and the write share the
/// atomic unit; there is no check-then-act window.
///
/// ## Errors
///
/// Anything else that fails on the store side (I/O, script fault, dangling
/// index entry) surfaces as `Error::Store` and is never retried here.
pub trait ScriptedStore: Send + Sync {
    /// Execute one atomic multi-index write.
    fn insert_event(&self, op: &InsertEvent) -> Result<()> {
        self.insert_batch(std::slice::from_ref(op))
    }

    /// Execute a buffered sequence of writes as one atomic unit.
    ///
    /// Operations apply in issuance order. Validation of the whole batch —
    /// including conflicts between two operations inside it — precedes any
    /// visible effect; one rejected operation voids the entire batch.
    fn insert_batch(&self, ops: &[InsertEvent]) -> Result<()>;

    /// Read all index entries with score ≥ `min_score`, ascending by score
    /// with lexical tie-break on the member id, each resolved to its full
    /// flat record. An absent index yields an empty sequence.
    fn range_by_score(&self, index_key: &str, min_score: f64) -> Result<Vec<FlatRecord>>;
}
