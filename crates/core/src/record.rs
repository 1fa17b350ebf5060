//! The event record and its wire codec.
//!
//! An [`EventRecord`] is the atomic, immutable unit of persistence. On the
//! wire it travels as a flat field list: the five standard fields first,
//! then every metadata entry as a key/value pair in mapping order. Any
//! field that is not one of the standard five is caller metadata; the
//! aggregate id, when present, lives under the reserved metadata key
//! [`AGGREGATE_ID_KEY`].
//!
//! ## Wire layout
//!
//! | Field | Encoding |
//! |-------|----------|
//! | `event_id` | verbatim |
//! | `event_name` | verbatim |
//! | `created_at` | `%Y-%m-%dT%H:%M:%S%.6f` UTC |
//! | `payload` | base64 |
//! | `version` | decimal |
//!
//! Timestamps carry microsecond precision end to end; [`EventRecord::new`]
//! truncates finer precision so a record always round-trips unchanged
//! through the store.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reserved metadata key carrying the aggregate identifier.
pub const AGGREGATE_ID_KEY: &str = "_aggregate_id";

/// Wire format of `created_at`: ISO-8601-like, microsecond precision, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const FIELD_EVENT_ID: &str = "event_id";
const FIELD_EVENT_NAME: &str = "event_name";
const FIELD_CREATED_AT: &str = "created_at";
const FIELD_PAYLOAD: &str = "payload";
const FIELD_VERSION: &str = "version";

/// An immutable event record.
///
/// Created once by the append engine, never mutated, never deleted by this
/// core. The version is a positive integer, strictly increasing per stream
/// and, when the record carries an aggregate id, per aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique id, caller-generated
    pub event_id: String,
    /// Event type name
    pub event_name: String,
    /// Creation timestamp (microsecond precision)
    pub created_at: DateTime<Utc>,
    /// Serialized payload, opaque to this core
    pub payload: Vec<u8>,
    /// Stream-relative sequence number, positive
    pub version: u64,
    /// Open metadata mapping; unknown wire fields land here
    pub metadata: BTreeMap<String, String>,
}

impl EventRecord {
    /// Create a record, truncating the timestamp to microsecond precision.
    pub fn new(
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        created_at: DateTime<Utc>,
        payload: Vec<u8>,
        version: u64,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        EventRecord {
            event_id: event_id.into(),
            event_name: event_name.into(),
            created_at: truncate_to_micros(created_at),
            payload,
            version,
            metadata,
        }
    }

    /// The aggregate id, if this record belongs to an aggregate.
    pub fn aggregate_id(&self) -> Option<&str> {
        self.metadata.get(AGGREGATE_ID_KEY).map(String::as_str)
    }

    /// Time-index score: fractional Unix seconds (seconds.microseconds).
    pub fn timestamp_score(&self) -> f64 {
        timestamp_score(&self.created_at)
    }

    /// Encode to the flat wire field list.
    ///
    /// Standard fields first, then metadata entries in mapping order.
    pub fn to_flat_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(5 + self.metadata.len());
        fields.push((FIELD_EVENT_ID.to_string(), self.event_id.clone()));
        fields.push((FIELD_EVENT_NAME.to_string(), self.event_name.clone()));
        fields.push((
            FIELD_CREATED_AT.to_string(),
            self.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ));
        fields.push((FIELD_PAYLOAD.to_string(), BASE64.encode(&self.payload)));
        fields.push((FIELD_VERSION.to_string(), self.version.to_string()));
        for (key, value) in &self.metadata {
            fields.push((key.clone(), value.clone()));
        }
        fields
    }

    /// Decode from the flat wire field list.
    ///
    /// Every field that is not one of the five standard fields is treated
    /// as metadata. A missing or malformed standard field is a [`Error::Store`]
    /// fault: the record came out of the store in a shape the codec cannot
    /// honor.
    pub fn from_flat_fields(fields: &[(String, String)]) -> Result<Self> {
        let mut event_id = None;
        let mut event_name = None;
        let mut created_at = None;
        let mut payload = None;
        let mut version = None;
        let mut metadata = BTreeMap::new();

        for (key, value) in fields {
            match key.as_str() {
                FIELD_EVENT_ID => event_id = Some(value.clone()),
                FIELD_EVENT_NAME => event_name = Some(value.clone()),
                FIELD_CREATED_AT => {
                    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
                        .map_err(|e| Error::Store(format!("malformed created_at '{value}': {e}")))?;
                    created_at = Some(Utc.from_utc_datetime(&naive));
                }
                FIELD_PAYLOAD => {
                    let bytes = BASE64
                        .decode(value)
                        .map_err(|e| Error::Store(format!("malformed payload encoding: {e}")))?;
                    payload = Some(bytes);
                }
                FIELD_VERSION => {
                    let v = value
                        .parse::<u64>()
                        .map_err(|e| Error::Store(format!("malformed version '{value}': {e}")))?;
                    version = Some(v);
                }
                _ => {
                    metadata.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(EventRecord {
            event_id: required(event_id, FIELD_EVENT_ID)?,
            event_name: required(event_name, FIELD_EVENT_NAME)?,
            created_at: required(created_at, FIELD_CREATED_AT)?,
            payload: required(payload, FIELD_PAYLOAD)?,
            version: required(version, FIELD_VERSION)?,
            metadata,
        })
    }
}

/// Whether a field name is one of the five standard wire fields.
///
/// Metadata must never carry these names: a flat list holding the same
/// field twice decodes ambiguously, so writers reject such records before
/// they reach the store.
pub fn is_standard_field(key: &str) -> bool {
    matches!(
        key,
        FIELD_EVENT_ID | FIELD_EVENT_NAME | FIELD_CREATED_AT | FIELD_PAYLOAD | FIELD_VERSION
    )
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::Store(format!("record missing standard field '{field}'")))
}

/// Convert a timestamp to its time-index score: fractional Unix seconds.
pub fn timestamp_score(ts: &DateTime<Utc>) -> f64 {
    ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_micros()) / 1_000_000.0
}

fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.timestamp_subsec_nanos();
    ts - chrono::Duration::nanoseconds(i64::from(nanos % 1_000))
}
