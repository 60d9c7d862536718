//! # custos-audit
//!
//! Immutable, append-only, SHA-256 hash-chained outcome ledger for the
//! CUSTOS runtime.
//!
//! ## Overview
//!
//! Every outcome record the engine emits is wrapped in an `OutcomeEvent`
//! that links to the previous event via its SHA-256 hash. Tampering with
//! any event — even a single byte — breaks the chain and is detected by
//! `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_audit::InMemoryLedger;
//! use custos_engine::Interpreter;
//!
//! let ledger = InMemoryLedger::new();
//! Interpreter::new(&ctx).with_audit(&ledger).run(&plan)?;
//!
//! assert!(ledger.verify_integrity());
//! let log = ledger.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod ledger;

pub use chain::{hash_entry, verify_chain};
pub use event::{OutcomeEvent, OutcomeLog};
pub use ledger::InMemoryLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────
