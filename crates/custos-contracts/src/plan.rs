//! Plans, proposed actions, and per-action outcomes.
//!
//! A `Plan` is the structured value the planner hands to the engine: an
//! ordered list of `ProposedAction`s. The planner-to-engine boundary is
//! always this structured form — never text requiring parsing. Any
//! human-readable transcript of a plan is presentation only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// Unique identifier for one plan evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub uuid::Uuid);

impl PlanId {
    /// Create a new, unique plan ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle for one proposed action, unique within its plan.
///
/// Planners may supply their own ids; the interpreter assigns
/// `action-{index}` to any action that arrives without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id the interpreter assigns to the action at `index` when the
    /// planner did not name it.
    pub fn from_index(index: usize) -> Self {
        Self(format!("action-{index}"))
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tool call parameters: name → JSON value, in deterministic key order.
pub type ActionParams = BTreeMap<String, serde_json::Value>;

/// The params key that carries the declared capability in planner output.
///
/// Stripped before the tool is invoked so tool implementations never see
/// capability metadata.
pub const CAPABILITY_PARAM: &str = "capability";

/// One candidate tool invocation awaiting capability and policy gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedAction {
    /// Plan-scoped handle. Assigned by the interpreter when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ActionId>,
    /// Name of the tool this action wants to invoke.
    pub tool_name: String,
    /// Parameters the tool will receive (minus the capability key).
    #[serde(default)]
    pub params: ActionParams,
    /// The capability of this action's invoking context. Absent means
    /// the action is annotated `untrusted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<Capability>,
    /// Explicit dependency edges supplied by the planner. The engine
    /// never infers edges from parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ActionId>,
}

impl ProposedAction {
    /// Convenience constructor for the common case: tool + params.
    pub fn new(tool_name: impl Into<String>, params: ActionParams) -> Self {
        Self {
            id: None,
            tool_name: tool_name.into(),
            params,
            capability: None,
            depends_on: Vec::new(),
        }
    }

    /// Declare the capability of this action's invoking context.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Name this action explicitly.
    pub fn with_id(mut self, id: ActionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Add an explicit dependency on an earlier action.
    pub fn after(mut self, dependency: ActionId) -> Self {
        self.depends_on.push(dependency);
        self
    }
}

/// An ordered list of proposed actions produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Identifier for this plan evaluation, carried into every record.
    pub id: PlanId,
    /// The proposed actions, in the order the planner emitted them.
    pub actions: Vec<ProposedAction>,
}

impl Plan {
    /// Build a plan with a fresh id.
    pub fn new(actions: Vec<ProposedAction>) -> Self {
        Self {
            id: PlanId::new(),
            actions,
        }
    }
}

/// Why the gate denied an action.
///
/// Every variant is fail-closed and recoverable: denial of one action
/// never stops the processing of the rest of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenialReason {
    /// The action names a tool that was never registered.
    UnknownTool,
    /// The action's capability is not a member of the tool's accepted set.
    CapabilityMismatch,
    /// At least one applicable policy predicate evaluated to false.
    PolicyViolation,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DenialReason::UnknownTool => "unknown tool",
            DenialReason::CapabilityMismatch => "capability mismatch",
            DenialReason::PolicyViolation => "policy violation",
        };
        f.write_str(reason)
    }
}

/// The per-action state machine:
///
/// ```text
/// Pending ─→ Permitted ─→ Executed
///    │            └─────→ ExecutionError
///    └─────→ Denied                        (terminal)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Not yet gated.
    Pending,
    /// Passed the gate; execution has not happened yet.
    Permitted,
    /// Rejected by the gate. Terminal.
    Denied { reason: DenialReason },
    /// Invoked successfully.
    Executed { result: serde_json::Value },
    /// Permitted, but the invocation itself failed.
    ExecutionError { message: String },
}

impl ActionOutcome {
    /// True for `Denied`, `Executed`, and `ExecutionError`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Denied { .. }
                | ActionOutcome::Executed { .. }
                | ActionOutcome::ExecutionError { .. }
        )
    }
}

/// One outcome record per action, emitted in plan order.
///
/// This is the log-worthy event the engine hands to the audit
/// collaborator. `params` are the original planner-supplied parameters,
/// capability key included, so the audit trail shows exactly what was
/// proposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The plan this action belonged to.
    pub plan_id: PlanId,
    /// The action's plan-scoped handle.
    pub action_id: ActionId,
    /// The tool the action named.
    pub tool_name: String,
    /// The parameters as proposed by the planner.
    pub params: ActionParams,
    /// The capability the action was annotated with.
    pub capability: Capability,
    /// The terminal outcome of the action.
    pub outcome: ActionOutcome,
    /// Wall-clock time the record was produced (UTC).
    pub timestamp: DateTime<Utc>,
}
