//! Key derivation for a stream's namespace.
//!
//! A stream is not a stored entity; it exists only as the common prefix of
//! the four key families that hold its data:
//!
//! | Key | Holds |
//! |-----|-------|
//! | `prefix:version` | version index (score = version, member = event id) |
//! | `prefix:created_since` | time index (score = fractional seconds) |
//! | `prefix:aggregate:<id>` | per-aggregate version index |
//! | `prefix:event_data:<id>` | the flat event record |
//!
//! Stream names containing the store's structural separator (`:`) are
//! wrapped in the store's grouping syntax (`{...}` hash tag) so every key of
//! one stream hashes to the same storage node. The mapping is stable across
//! versions; changing it would orphan existing data.

use std::fmt;

/// Grouping-safe key prefix for one stream.
///
/// Derivation is deterministic and injective within a stream: no two
/// distinct (stream, entity id) inputs produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    prefix: String,
}

impl StreamKey {
    /// Derive the key prefix for a stream name.
    ///
    /// Names containing `:` are wrapped in a `{...}` hash tag so the store
    /// colocates all of the stream's keys on one shard.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let prefix = if name.contains(':') {
            format!("{{{name}}}")
        } else {
            name.to_string()
        };
        StreamKey { prefix }
    }

    /// The raw prefix shared by all of this stream's keys.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the version index (score = version, member = event id).
    pub fn version_index(&self) -> String {
        format!("{}:version", self.prefix)
    }

    /// Key of the time index (score = fractional Unix seconds).
    pub fn time_index(&self) -> String {
        format!("{}:created_since", self.prefix)
    }

    /// Key of the per-aggregate version index.
    pub fn aggregate_index(&self, aggregate_id: &str) -> String {
        format!("{}:aggregate:{}", self.prefix, aggregate_id)
    }

    /// Key of the flat record for one event.
    pub fn event_data(&self, event_id: &str) -> String {
        format!("{}:event_data:{}", self.prefix, event_id)
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)
    }
}
