//! Core types for streamstore
//!
//! This crate defines the fundamental building blocks shared by every layer:
//! - [`Error`]: the canonical error taxonomy
//! - [`StreamKey`]: deterministic key derivation for a stream's namespace
//! - [`EventRecord`]: the immutable unit of persistence and its wire codec

#![warn(missing_docs)]

pub mod error;
pub mod keys;
pub mod record;

pub use error::{Error, Result};
pub use keys::StreamKey;
pub use record::{is_standard_field, timestamp_score, EventRecord, AGGREGATE_ID_KEY, TIMESTAMP_FORMAT};
