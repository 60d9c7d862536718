//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryLedger` keeps every outcome record in a `Vec` behind a
//! `Mutex`, chained by SHA-256 hashes. Use `export_log()` to obtain a
//! sealed `OutcomeLog` and `verify_integrity()` to confirm the chain has
//! not been tampered with in memory.
//!
//! One ledger may span many plans: `finalize` marks a plan boundary but
//! the chain keeps growing, so a whole session shares one commitment.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use custos_contracts::{
    error::{CustosError, CustosResult},
    plan::{ActionRecord, PlanId},
};
use custos_engine::traits::AuditSink;

use crate::{
    chain::{hash_entry, verify_chain},
    event::{OutcomeEvent, OutcomeLog},
};

/// The mutable interior of an `InMemoryLedger`.
pub(crate) struct LedgerState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<OutcomeEvent>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// The `this_hash` of the last written event, or `GENESIS_HASH`
    /// before any event has been written.
    pub(crate) last_hash: String,
}

/// An in-memory, append-only outcome ledger backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// `record()` and `finalize()` acquire a `Mutex` internally; clones of
/// the internal `Arc` may be inspected from other threads without
/// additional synchronization.
pub struct InMemoryLedger {
    pub(crate) state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger whose first event will link to the genesis
    /// sentinel hash.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                events: Vec::new(),
                sequence: 0,
                last_hash: OutcomeEvent::GENESIS_HASH.to_string(),
            })),
        }
    }

    /// Export a sealed `OutcomeLog` of everything written so far.
    pub fn export_log(&self) -> OutcomeLog {
        let state = self.state.lock().expect("ledger lock poisoned");
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        OutcomeLog {
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().expect("ledger lock poisoned");
        verify_chain(&state.events)
    }

    /// Number of events written so far.
    pub fn len(&self) -> usize {
        self.state.lock().expect("ledger lock poisoned").events.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for InMemoryLedger {
    /// Append one outcome record to the hash chain.
    ///
    /// Returns `Err(AuditWriteFailed)` only if the internal mutex is
    /// poisoned, which cannot happen under normal operation.
    fn record(&self, record: &ActionRecord) -> CustosResult<()> {
        let mut state = self.state.lock().map_err(|e| CustosError::AuditWriteFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_entry(sequence, record, &prev_hash);

        state.events.push(OutcomeEvent {
            sequence,
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }

    /// Mark a plan's evaluation as complete.
    ///
    /// The in-memory ledger has nothing to flush; the boundary is logged
    /// so operators can correlate chain positions with plans.
    fn finalize(&self, plan_id: PlanId) -> CustosResult<()> {
        let state = self.state.lock().map_err(|e| CustosError::AuditWriteFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        info!(
            plan = %plan_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "plan sealed in outcome ledger"
        );

        Ok(())
    }
}
