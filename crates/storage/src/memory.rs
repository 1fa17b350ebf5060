//! In-process reference backend.
//!
//! `MemoryStore` keeps the whole keyspace behind a single mutex: one lock
//! acquisition per script call is exactly the atomicity unit the protocol
//! demands. It exists so the core is exercisable and testable without a
//! server; a wire client to a real store implements [`ScriptedStore`]
//! against the same contract.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use parking_lot::Mutex;
use streamstore_core::{Error, Result};

use crate::script::{FlatRecord, InsertEvent, ScriptedStore};

/// Ordered score→member mapping with lexical tie-break on the member.
#[derive(Debug, Default)]
struct SortedSet {
    /// Kept sorted by (score, member)
    entries: Vec<(f64, String)>,
}

impl SortedSet {
    fn contains_score(&self, score: f64) -> bool {
        self.entries.iter().any(|(s, _)| s.total_cmp(&score) == Ordering::Equal)
    }

    fn insert(&mut self, score: f64, member: String) {
        let at = self.entries.partition_point(|(s, m)| match s.total_cmp(&score) {
            Ordering::Less => true,
            Ordering::Equal => m.as_str() < member.as_str(),
            Ordering::Greater => false,
        });
        self.entries.insert(at, (score, member));
    }

    fn members_from(&self, min_score: f64) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(s, _)| s.total_cmp(&min_score) != Ordering::Less)
            .map(|(_, m)| m.as_str())
    }
}

#[derive(Debug, Default)]
struct Keyspace {
    /// Flat records by event-data key
    records: BTreeMap<String, FlatRecord>,
    /// Sorted sets by index key
    indexes: BTreeMap<String, SortedSet>,
}

impl Keyspace {
    fn index_holds(&self, index_key: &str, score: f64) -> bool {
        self.indexes
            .get(index_key)
            .map_or(false, |set| set.contains_score(score))
    }

    fn apply(&mut self, op: &InsertEvent) {
        self.records
            .insert(op.event_data_key.clone(), op.fields.clone());
        self.indexes
            .entry(op.version_index_key.clone())
            .or_default()
            .insert(op.version as f64, op.event_id.clone());
        self.indexes
            .entry(op.time_index_key.clone())
            .or_default()
            .insert(op.timestamp, op.event_id.clone());
        if let Some(aggregate_key) = &op.aggregate_index_key {
            self.indexes
                .entry(aggregate_key.clone())
                .or_default()
                .insert(op.version as f64, op.event_id.clone());
        }
    }
}

/// Mutex-guarded in-memory backend.
///
/// # Thread Safety
///
/// Every protocol method takes the single keyspace lock for its whole
/// duration, so concurrent callers observe each script as indivisible.
pub struct MemoryStore {
    inner: Mutex<Keyspace>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryStore {
            inner: Mutex::new(Keyspace::default()),
        }
    }

    /// Number of stored event records, across all streams.
    pub fn record_count(&self) -> usize {
        self.inner.lock().records.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniqueness checks for one operation, against the committed keyspace and
/// the earlier operations of the same batch.
fn check(keyspace: &Keyspace, pending: &[InsertEvent], op: &InsertEvent) -> Result<()> {
    let version_score = op.version as f64;

    // The aggregate index is the optimistic-concurrency basis; report it
    // over the stream-wide version index when both collide.
    if let Some(aggregate_key) = &op.aggregate_index_key {
        let aggregate_taken = keyspace.index_holds(aggregate_key, version_score)
            || pending.iter().any(|p| {
                p.aggregate_index_key.as_deref() == Some(aggregate_key.as_str())
                    && p.version == op.version
            });
        if aggregate_taken {
            return Err(Error::Concurrency {
                index_key: aggregate_key.clone(),
                version: op.version,
            });
        }
    }

    let version_taken = keyspace.index_holds(&op.version_index_key, version_score)
        || pending.iter().any(|p| {
            p.version_index_key == op.version_index_key && p.version == op.version
        });
    if version_taken {
        return Err(Error::Concurrency {
            index_key: op.version_index_key.clone(),
            version: op.version,
        });
    }

    Ok(())
}

/// The stream prefix an index key belongs to.
///
/// Part of the script contract: the range script resolves event-data keys
/// relative to the index key it was handed.
fn stream_prefix(index_key: &str) -> &str {
    // A hash-tagged prefix may itself contain ":aggregate:"; the key-family
    // separator is the first occurrence past the closing brace. Checked
    // before the suffix strips, since an aggregate id may end in ":version"
    // or ":created_since".
    let tail_start = if index_key.starts_with('{') {
        index_key.find('}').map_or(0, |at| at + 1)
    } else {
        0
    };
    if let Some(at) = index_key[tail_start..].find(":aggregate:") {
        return &index_key[..tail_start + at];
    }
    if let Some(prefix) = index_key.strip_suffix(":version") {
        return prefix;
    }
    if let Some(prefix) = index_key.strip_suffix(":created_since") {
        return prefix;
    }
    index_key
}

impl ScriptedStore for MemoryStore {
    fn insert_batch(&self, ops: &[InsertEvent]) -> Result<()> {
        let mut keyspace = self.inner.lock();

        // Validate the whole batch before any sub-write becomes visible.
        for (at, op) in ops.iter().enumerate() {
            check(&keyspace, &ops[..at], op)?;
        }
        for op in ops {
            keyspace.apply(op);
        }

        tracing::trace!(ops = ops.len(), "applied atomic write batch");
        Ok(())
    }

    fn range_by_score(&self, index_key: &str, min_score: f64) -> Result<Vec<FlatRecord>> {
        let keyspace = self.inner.lock();
        let Some(set) = keyspace.indexes.get(index_key) else {
            return Ok(Vec::new());
        };

        let prefix = stream_prefix(index_key);
        let mut records = Vec::new();
        for member in set.members_from(min_score) {
            let data_key = format!("{prefix}:event_data:{member}");
            let fields = keyspace.records.get(&data_key).ok_or_else(|| {
                Error::Store(format!(
                    "index {index_key} references missing record {data_key}"
                ))
            })?;
            records.push(fields.clone());
        }
        Ok(records)
    }
}
