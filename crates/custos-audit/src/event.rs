//! Ledger event and exported log types.
//!
//! `OutcomeEvent` is one entry in the hash chain: an `ActionRecord`
//! wrapped with sequence numbering and the SHA-256 hashes that make
//! tampering detectable. `OutcomeLog` is the sealed export of a ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custos_contracts::plan::ActionRecord;

/// A single hash-chained entry in the outcome ledger.
///
/// Each event commits to its predecessor via `prev_hash`. Changing any
/// field — including the embedded record — invalidates `this_hash` and
/// every subsequent `prev_hash`, which `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeEvent {
    /// Position in the chain, starting at 0 with no gaps.
    pub sequence: u64,

    /// The outcome record the engine emitted.
    pub record: ActionRecord,

    /// SHA-256 hash (hex) of the previous event, or `GENESIS_HASH` for
    /// the first event.
    pub prev_hash: String,

    /// SHA-256 hash (hex) over (plan_id, sequence, prev_hash, record).
    pub this_hash: String,
}

impl OutcomeEvent {
    /// The sentinel `prev_hash` of the first event in every chain:
    /// 64 hex zeros, a value no real SHA-256 digest can collide with.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed export of the ledger's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeLog {
    /// All events in chain order (sequence 0 first).
    pub events: Vec<OutcomeEvent>,

    /// Wall-clock time (UTC) the log was exported.
    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last event — a compact commitment to the
    /// whole log. Empty string when no events were written.
    pub terminal_hash: String,
}
