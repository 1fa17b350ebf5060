//! The transaction coordinator: buffer appends, commit them as one unit.
//!
//! Linear lifecycle, no nesting: Idle → Active → Idle. While Active every
//! append is buffered instead of executed; `commit` hands the whole buffer
//! to the store's atomic batch primitive in issuance order, `rollback`
//! discards it without executing anything. One coordinator belongs to one
//! adapter instance and one logical writer at a time.

use std::sync::Arc;

use streamstore_core::{Error, Result};
use streamstore_storage::{InsertEvent, ScriptedStore};
use tracing::debug;

/// Tagged transaction state. Never a nullable handle: Active owns the
/// buffered operations.
enum TxnState {
    Idle,
    Active(Vec<InsertEvent>),
}

/// Buffers a sequence of append operations and commits or discards them as
/// one atomic unit.
pub struct TransactionCoordinator<S> {
    store: Arc<S>,
    state: TxnState,
}

impl<S: ScriptedStore> TransactionCoordinator<S> {
    /// Create an idle coordinator over a store handle.
    pub fn new(store: Arc<S>) -> Self {
        TransactionCoordinator {
            store,
            state: TxnState::Idle,
        }
    }

    /// Whether a transaction is currently active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, TxnState::Active(_))
    }

    /// Start a transaction. Fails with `InvalidState` when one is already
    /// active; nesting is not supported.
    pub fn begin(&mut self) -> Result<()> {
        if self.is_active() {
            return Err(Error::InvalidState(
                "a transaction is already active".to_string(),
            ));
        }
        self.state = TxnState::Active(Vec::new());
        debug!("transaction started");
        Ok(())
    }

    /// Buffer one operation in issuance order. Active only.
    pub fn buffer(&mut self, op: InsertEvent) -> Result<()> {
        match &mut self.state {
            TxnState::Active(ops) => {
                ops.push(op);
                Ok(())
            }
            TxnState::Idle => Err(Error::InvalidState("no active transaction".to_string())),
        }
    }

    /// Execute the buffered operations as one atomic unit and return to
    /// Idle.
    ///
    /// All-or-nothing at the batch level: one rejected operation voids the
    /// whole batch. The buffer is consumed either way; a failed commit
    /// does not leave a half-open transaction behind.
    pub fn commit(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, TxnState::Idle) {
            TxnState::Active(ops) => {
                let count = ops.len();
                self.store.insert_batch(&ops)?;
                debug!(ops = count, "transaction committed");
                Ok(())
            }
            TxnState::Idle => Err(Error::InvalidState("no active transaction".to_string())),
        }
    }

    /// Discard the buffered operations without executing any of them and
    /// return to Idle.
    pub fn rollback(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, TxnState::Idle) {
            TxnState::Active(ops) => {
                debug!(ops = ops.len(), "transaction rolled back");
                Ok(())
            }
            TxnState::Idle => Err(Error::InvalidState("no active transaction".to_string())),
        }
    }
}
