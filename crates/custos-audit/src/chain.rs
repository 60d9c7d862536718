//! Hash-chain primitives for the outcome ledger.
//!
//! Hash input layout (bytes, in order):
//!   1. the record's plan id as UTF-8 (UUID string form)
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 (64 ASCII hex chars)
//!   4. canonical JSON of the record (serde_json, no pretty-printing;
//!      `CapabilitySet` fields serialize sorted, so the bytes are stable)

use sha2::{Digest, Sha256};

use custos_contracts::plan::ActionRecord;

use crate::event::OutcomeEvent;

/// Compute the SHA-256 hash for one ledger event.
///
/// Commits to the event's position (`sequence`), its link to the
/// previous event (`prev_hash`), and the full outcome record including
/// the plan it belongs to. Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `record` cannot be serialized to JSON, which cannot happen
/// for the well-formed `ActionRecord` type.
pub fn hash_entry(sequence: u64, record: &ActionRecord, prev_hash: &str) -> String {
    let record_json =
        serde_json::to_vec(record).expect("ActionRecord must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(record.plan_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a ledger chain.
///
/// Valid when both hold for every event:
///
/// 1. **Linkage** — `prev_hash` equals the preceding event's `this_hash`
///    (or `GENESIS_HASH` for event 0).
/// 2. **Correctness** — `this_hash` matches the value recomputed from the
///    event's own fields.
///
/// Returns `false` on the first mismatch. An empty chain is valid.
pub fn verify_chain(events: &[OutcomeEvent]) -> bool {
    let mut expected_prev = OutcomeEvent::GENESIS_HASH.to_string();

    for event in events {
        if event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_entry(event.sequence, &event.record, &event.prev_hash);
        if event.this_hash != recomputed {
            return false;
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
