//! Trait definitions at the engine's trust boundary.
//!
//! - `ToolHandler` — untrusted side effects (send mail, search, …); the
//!   interpreter never invokes one unless the gate has permitted the action.
//! - `AuditSink`   — trusted collaborator that receives one outcome record
//!   per action, in plan order.

use custos_contracts::{
    error::CustosResult,
    plan::{ActionParams, ActionRecord, PlanId},
};

/// The error a tool reports when its invocation fails.
///
/// Tool failures are per-action: they surface as `ExecutionError` on the
/// one record and never abort the rest of the plan.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An invocable tool implementation.
///
/// The interpreter strips the capability key from the parameters before
/// calling `invoke`, so implementations never see capability metadata.
/// A panic inside `invoke` is caught by the interpreter and degraded to a
/// per-action `ExecutionError`.
pub trait ToolHandler: Send + Sync {
    /// Perform the tool's side effect and return its result.
    fn invoke(&self, params: &ActionParams) -> Result<serde_json::Value, ToolError>;
}

/// Plain closures are tool handlers.
impl<F> ToolHandler for F
where
    F: Fn(&ActionParams) -> Result<serde_json::Value, ToolError> + Send + Sync,
{
    fn invoke(&self, params: &ActionParams) -> Result<serde_json::Value, ToolError> {
        self(params)
    }
}

/// The audit collaborator: receives every outcome record.
///
/// A failed `record` is fatal to the run — an action that cannot be
/// audited cannot be reported as having happened.
pub trait AuditSink: Send + Sync {
    /// Append one outcome record. Called once per action, in plan order.
    fn record(&self, record: &ActionRecord) -> CustosResult<()>;

    /// Mark a plan's evaluation as complete. Implementations may use this
    /// to flush or seal their store.
    fn finalize(&self, plan_id: PlanId) -> CustosResult<()>;
}
