//! Runtime error types for the CUSTOS pipeline.
//!
//! Almost nothing in CUSTOS returns `Err`: unknown tools, unknown
//! policies, unknown nodes, failing predicates, and failing tool
//! invocations all resolve fail-closed into typed per-action outcomes or
//! empty/false query results. `CustosError` covers the few conditions
//! that legitimately abort a whole operation.

use thiserror::Error;

/// The unified error type for the CUSTOS runtime.
#[derive(Debug, Error)]
pub enum CustosError {
    /// The plan violates a structural contract (duplicate action ids,
    /// dependency on an unknown or later action). Fails fast and loudly.
    #[error("malformed plan: {reason}")]
    MalformedPlan { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The audit sink could not persist an outcome record.
    ///
    /// Treated as fatal for the run — an action that cannot be audited
    /// cannot be reported as having happened.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}

/// Convenience alias used throughout the CUSTOS crates.
pub type CustosResult<T> = Result<T, CustosError>;
