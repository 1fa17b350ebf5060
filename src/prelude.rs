//! Convenient imports for streamstore.
//!
//! Re-exports the types most callers need so you can get started with a
//! single import:
//!
//! ```ignore
//! use streamstore::prelude::*;
//!
//! let mut store = StreamStore::in_memory();
//! store.create(&Stream::new("orders", events))?;
//! ```

// Main entry point
pub use crate::store::StreamStore;

// Error handling
pub use crate::{Error, Result};

// Facade types
pub use crate::{Stream, StreamAdapter};

// Record model
pub use crate::{EventRecord, StreamKey, AGGREGATE_ID_KEY};

// Store protocol, for plugging in a wire client
pub use crate::{MemoryStore, ScriptedStore};
