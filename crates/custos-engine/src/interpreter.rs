//! The plan interpreter: the deterministic gate-then-execute runner.
//!
//! The interpreter enforces the CUSTOS pipeline per plan:
//!
//!   Build graph → Annotate → Gate → Execute → Record
//!
//! The security invariant is absolute: a tool handler is NEVER invoked
//! unless the gate returned `Permitted` for that action — meaning the
//! tool is registered, the action's capability is a member of the tool's
//! accepted set, and every bound policy predicate passed. The code path
//! to `invoke()` is only reachable after all three checks.
//!
//! Every per-action failure — unknown tool, capability mismatch, policy
//! violation, failing or panicking invocation — resolves to a typed
//! outcome on that one action and never aborts the rest of the plan. The
//! only things that abort a run are a structurally malformed plan and a
//! failed audit write.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use tracing::{debug, info, warn};

use custos_contracts::{
    capability::Capability,
    error::{CustosError, CustosResult},
    plan::{
        ActionId, ActionOutcome, ActionParams, ActionRecord, DenialReason, Plan, CAPABILITY_PARAM,
    },
};

use crate::context::EngineContext;
use crate::registry::RegisteredTool;
use crate::traits::AuditSink;

/// The gate's answer for one action. Pure and deterministic: re-gating
/// the same action against the same context yields the same decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Permitted,
    Denied(DenialReason),
}

/// One proposed action after graph building and annotation.
#[derive(Debug, Clone)]
pub struct AnnotatedAction {
    /// Plan-scoped handle (planner-supplied or `action-{index}`).
    pub id: ActionId,
    pub tool_name: String,
    pub params: ActionParams,
    /// The resolved capability: the declared one, else `untrusted`.
    pub capability: Capability,
}

/// The per-plan action graph.
///
/// One node per proposed action; edges come ONLY from the planner's
/// explicit `depends_on` declarations — the engine never infers data
/// dependencies from parameters. Actions execute in plan order, which
/// satisfies every valid (backward) edge.
#[derive(Debug)]
pub struct PlanGraph {
    actions: Vec<AnnotatedAction>,
    /// (dependency index, dependent index) pairs.
    edges: Vec<(usize, usize)>,
}

impl PlanGraph {
    /// Build and annotate the action graph for a plan.
    ///
    /// Fails fast with `MalformedPlan` on structural contract violations:
    /// duplicate action ids, a dependency naming an unknown action, or a
    /// dependency on the action itself or a later action (a forward edge
    /// can never be honored by in-order execution).
    pub fn build(plan: &Plan) -> CustosResult<Self> {
        let mut actions = Vec::with_capacity(plan.actions.len());
        let mut index_of: HashMap<ActionId, usize> = HashMap::new();
        let mut edges = Vec::new();

        for (index, proposed) in plan.actions.iter().enumerate() {
            let id = proposed
                .id
                .clone()
                .unwrap_or_else(|| ActionId::from_index(index));

            if index_of.insert(id.clone(), index).is_some() {
                return Err(CustosError::MalformedPlan {
                    reason: format!("duplicate action id '{}'", id),
                });
            }

            // Annotation: the declared capability, defaulting to untrusted.
            let capability = proposed
                .capability
                .clone()
                .unwrap_or_else(Capability::untrusted);
            debug!(action = %id, capability = %capability, "annotated action");

            actions.push(AnnotatedAction {
                id,
                tool_name: proposed.tool_name.clone(),
                params: proposed.params.clone(),
                capability,
            });
        }

        for (index, proposed) in plan.actions.iter().enumerate() {
            for dep in &proposed.depends_on {
                let Some(&dep_index) = index_of.get(dep) else {
                    return Err(CustosError::MalformedPlan {
                        reason: format!(
                            "action '{}' depends on unknown action '{}'",
                            actions[index].id, dep
                        ),
                    });
                };
                if dep_index >= index {
                    return Err(CustosError::MalformedPlan {
                        reason: format!(
                            "action '{}' depends on '{}', which does not precede it",
                            actions[index].id, dep
                        ),
                    });
                }
                edges.push((dep_index, index));
            }
        }

        debug!(
            nodes = actions.len(),
            edges = edges.len(),
            "plan graph built"
        );
        Ok(Self { actions, edges })
    }

    pub fn actions(&self) -> &[AnnotatedAction] {
        &self.actions
    }

    /// Explicit dependency edges as (dependency index, dependent index).
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }
}

/// Interprets one plan at a time against a fixed engine context.
///
/// The immutable borrow of the context is what provides snapshot
/// isolation: the tool and policy registries cannot change for the
/// lifetime of the interpreter.
pub struct Interpreter<'a> {
    context: &'a EngineContext,
    audit: Option<&'a dyn AuditSink>,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter over the given context, with no audit sink.
    pub fn new(context: &'a EngineContext) -> Self {
        Self {
            context,
            audit: None,
        }
    }

    /// Attach an audit sink. Every outcome record is written to it in
    /// plan order, and `finalize` is called once after the last action.
    pub fn with_audit(mut self, sink: &'a dyn AuditSink) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Gate one action: tool known, capability accepted, policies pass.
    ///
    /// Pure with respect to the interpreter and context — no hidden
    /// randomness or time-dependence, so re-gating is idempotent.
    pub fn gate(
        &self,
        tool_name: &str,
        capability: &Capability,
        params: &ActionParams,
    ) -> GateDecision {
        match self.resolve(tool_name, capability, params) {
            Ok(_) => GateDecision::Permitted,
            Err(reason) => GateDecision::Denied(reason),
        }
    }

    /// The gate, returning the tool handle on success so execution cannot
    /// race a lookup that gating never performed.
    fn resolve(
        &self,
        tool_name: &str,
        capability: &Capability,
        params: &ActionParams,
    ) -> Result<&RegisteredTool, DenialReason> {
        let Some(tool) = self.context.tools.lookup(tool_name) else {
            warn!(tool = %tool_name, "gate denied: unknown tool");
            return Err(DenialReason::UnknownTool);
        };

        if !tool.accepts(capability) {
            warn!(
                tool = %tool_name,
                capability = %capability,
                accepted = ?tool.required_capabilities().sorted(),
                "gate denied: capability mismatch"
            );
            return Err(DenialReason::CapabilityMismatch);
        }

        if !self.context.policies.enforce(tool_name, params) {
            warn!(tool = %tool_name, "gate denied: policy violation");
            return Err(DenialReason::PolicyViolation);
        }

        debug!(tool = %tool_name, capability = %capability, "gate permitted action");
        Ok(tool)
    }

    /// Evaluate a plan: gate every action, execute the permitted ones in
    /// plan order, and return one outcome record per action in the order
    /// the planner emitted them.
    ///
    /// # Errors
    ///
    /// `MalformedPlan` for structural contract violations (fail fast,
    /// before anything executes) and `AuditWriteFailed` if the attached
    /// sink rejects a record. Denials and tool failures are NOT errors —
    /// they are typed outcomes on the affected action.
    pub fn run(&self, plan: &Plan) -> CustosResult<Vec<ActionRecord>> {
        // ── Steps 1 & 2: build the action graph and annotate ────────────────
        let graph = PlanGraph::build(plan)?;

        info!(
            plan = %plan.id,
            actions = graph.actions().len(),
            "interpreting plan"
        );

        let mut records = Vec::with_capacity(graph.actions().len());

        for action in graph.actions() {
            // ── Step 3: gate ─────────────────────────────────────────────────
            //
            // The only call site for tool invocation is behind this match;
            // a denied action is structurally unable to execute.
            let outcome = match self.resolve(&action.tool_name, &action.capability, &action.params)
            {
                Err(reason) => ActionOutcome::Denied { reason },

                // ── Step 4: execute ──────────────────────────────────────────
                Ok(tool) => Self::execute(tool, action),
            };

            // ── Step 5: record, preserving plan order ────────────────────────
            let record = ActionRecord {
                plan_id: plan.id,
                action_id: action.id.clone(),
                tool_name: action.tool_name.clone(),
                params: action.params.clone(),
                capability: action.capability.clone(),
                outcome,
                timestamp: Utc::now(),
            };

            if let Some(sink) = self.audit {
                sink.record(&record)?;
            }
            records.push(record);
        }

        if let Some(sink) = self.audit {
            sink.finalize(plan.id)?;
        }

        info!(plan = %plan.id, "plan interpretation complete");
        Ok(records)
    }

    /// Invoke a permitted action's tool.
    ///
    /// The capability key is stripped from the parameters first. The call
    /// into external tool code is panic-wrapped so an aborting handler
    /// degrades to a per-action `ExecutionError` instead of taking down
    /// the plan.
    fn execute(tool: &RegisteredTool, action: &AnnotatedAction) -> ActionOutcome {
        let mut params = action.params.clone();
        params.remove(CAPABILITY_PARAM);

        match panic::catch_unwind(AssertUnwindSafe(|| tool.invoke(&params))) {
            Ok(Ok(result)) => {
                info!(tool = %action.tool_name, action = %action.id, "executed tool");
                ActionOutcome::Executed { result }
            }
            Ok(Err(err)) => {
                warn!(
                    tool = %action.tool_name,
                    action = %action.id,
                    error = %err,
                    "tool invocation failed"
                );
                ActionOutcome::ExecutionError {
                    message: err.to_string(),
                }
            }
            Err(_) => {
                warn!(
                    tool = %action.tool_name,
                    action = %action.id,
                    "tool invocation panicked"
                );
                ActionOutcome::ExecutionError {
                    message: format!("tool '{}' panicked during invocation", action.tool_name),
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use custos_contracts::{
        capability::{Capability, CapabilitySet},
        error::{CustosError, CustosResult},
        plan::{
            ActionId, ActionOutcome, ActionParams, ActionRecord, DenialReason, Plan, PlanId,
            ProposedAction,
        },
    };
    use custos_policy::{EmailDomainPolicy, PolicyRegistry, QuerySanitizationPolicy};

    use crate::context::EngineContext;
    use crate::registry::ToolRegistry;
    use crate::traits::{AuditSink, ToolError};

    use super::{GateDecision, Interpreter, PlanGraph};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn params(pairs: &[(&str, &str)]) -> ActionParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    fn caps(names: &[&str]) -> CapabilitySet {
        names.iter().copied().collect()
    }

    /// A context with the email and search tools, wired like a production
    /// startup: tools with required capabilities, policies bound per tool.
    fn email_context() -> EngineContext {
        let mut tools = ToolRegistry::new();
        tools.register(
            "send_email",
            |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
                Ok(json!(format!(
                    "Email sent to {} with document: {}",
                    p.get("recipient").and_then(|v| v.as_str()).unwrap_or(""),
                    p.get("document").and_then(|v| v.as_str()).unwrap_or(""),
                )))
            },
            caps(&["trusted_email"]),
        );
        tools.register(
            "search_document",
            |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
                Ok(json!(format!(
                    "Found 3 documents matching query: {}",
                    p.get("query").and_then(|v| v.as_str()).unwrap_or(""),
                )))
            },
            caps(&["user_query"]),
        );

        let mut policies = PolicyRegistry::new();
        policies.register("email_domain_policy", EmailDomainPolicy::default());
        policies.register(
            "query_sanitization_policy",
            QuerySanitizationPolicy::default(),
        );
        policies.bind("send_email", vec!["email_domain_policy".to_string()]);
        policies.bind(
            "search_document",
            vec!["query_sanitization_policy".to_string()],
        );

        EngineContext::new(tools, policies)
    }

    fn email_action(recipient: &str) -> ProposedAction {
        ProposedAction::new(
            "send_email",
            params(&[("recipient", recipient), ("document", "x.txt")]),
        )
        .with_capability(Capability::new("trusted_email"))
    }

    /// An audit sink that records every call for later inspection.
    struct MockSink {
        records: Arc<Mutex<Vec<ActionRecord>>>,
        finalized: Arc<Mutex<Vec<PlanId>>>,
        fail_writes: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                records: Arc::new(Mutex::new(vec![])),
                finalized: Arc::new(Mutex::new(vec![])),
                fail_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }
    }

    impl AuditSink for MockSink {
        fn record(&self, record: &ActionRecord) -> CustosResult<()> {
            if self.fail_writes {
                return Err(CustosError::AuditWriteFailed {
                    reason: "sink rejected write".to_string(),
                });
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn finalize(&self, plan_id: PlanId) -> CustosResult<()> {
            self.finalized.lock().unwrap().push(plan_id);
            Ok(())
        }
    }

    // ── Gate scenarios ────────────────────────────────────────────────────────

    /// Trusted recipient, trusted capability: the action executes.
    #[test]
    fn trusted_email_is_executed() {
        let ctx = email_context();
        let plan = Plan::new(vec![email_action("bob@company.com")]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert_eq!(records.len(), 1);

        match &records[0].outcome {
            ActionOutcome::Executed { result } => {
                assert_eq!(
                    result,
                    &json!("Email sent to bob@company.com with document: x.txt")
                );
            }
            other => panic!("expected Executed, got {:?}", other),
        }
    }

    /// An attacker-controlled recipient fails the email domain policy.
    #[test]
    fn attacker_recipient_is_a_policy_violation() {
        let ctx = email_context();
        let plan = Plan::new(vec![email_action("bob@attacker.com")]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert_eq!(
            records[0].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::PolicyViolation
            }
        );
    }

    /// Fail-closed: a never-registered tool is always denied.
    #[test]
    fn unknown_tool_is_denied() {
        let ctx = email_context();
        let plan = Plan::new(vec![ProposedAction::new(
            "delete_everything",
            ActionParams::new(),
        )
        .with_capability(Capability::new("trusted_email"))]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert_eq!(
            records[0].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::UnknownTool
            }
        );
    }

    /// An untrusted capability against a tool requiring trusted_email.
    #[test]
    fn untrusted_capability_is_a_mismatch() {
        let ctx = email_context();
        let plan = Plan::new(vec![ProposedAction::new(
            "send_email",
            params(&[("recipient", "bob@company.com"), ("document", "x.txt")]),
        )
        .with_capability(Capability::untrusted())]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert_eq!(
            records[0].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::CapabilityMismatch
            }
        );
    }

    /// No declared capability annotates as untrusted: denied against a
    /// trusted tool, permitted against a tool that accepts untrusted input.
    #[test]
    fn missing_capability_defaults_to_untrusted() {
        let mut tools = ToolRegistry::new();
        tools.register(
            "echo",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> { Ok(json!("ok")) },
            caps(&["untrusted"]),
        );
        tools.register(
            "send_email",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> { Ok(json!("sent")) },
            caps(&["trusted_email"]),
        );
        let ctx = EngineContext::new(tools, PolicyRegistry::new());

        let plan = Plan::new(vec![
            ProposedAction::new("echo", ActionParams::new()),
            ProposedAction::new("send_email", ActionParams::new()),
        ]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert_eq!(records[0].capability, Capability::untrusted());
        assert!(matches!(
            records[0].outcome,
            ActionOutcome::Executed { .. }
        ));
        assert_eq!(
            records[1].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::CapabilityMismatch
            }
        );
    }

    /// An injection-shaped query fails the sanitization policy while a
    /// clean query on the same tool executes.
    #[test]
    fn injection_query_is_blocked_clean_query_passes() {
        let ctx = email_context();
        let plan = Plan::new(vec![
            ProposedAction::new("search_document", params(&[("query", "project schedules")]))
                .with_capability(Capability::new("user_query")),
            ProposedAction::new(
                "search_document",
                params(&[("query", "DROP TABLE users; -- find this")]),
            )
            .with_capability(Capability::new("user_query")),
        ]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert!(matches!(
            records[0].outcome,
            ActionOutcome::Executed { .. }
        ));
        assert_eq!(
            records[1].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::PolicyViolation
            }
        );
    }

    /// Re-running the gate on the same action and context yields the same
    /// decision: no hidden randomness or time-dependence.
    #[test]
    fn gating_is_idempotent() {
        let ctx = email_context();
        let interp = Interpreter::new(&ctx);
        let p = params(&[("recipient", "bob@attacker.com"), ("document", "x.txt")]);
        let cap = Capability::new("trusted_email");

        let first = interp.gate("send_email", &cap, &p);
        let second = interp.gate("send_email", &cap, &p);
        assert_eq!(first, second);
        assert_eq!(
            first,
            GateDecision::Denied(DenialReason::PolicyViolation)
        );

        let ok = params(&[("recipient", "bob@company.com")]);
        assert_eq!(
            interp.gate("send_email", &cap, &ok),
            GateDecision::Permitted
        );
        assert_eq!(
            interp.gate("send_email", &cap, &ok),
            GateDecision::Permitted
        );
    }

    // ── Execution behavior ────────────────────────────────────────────────────

    /// The capability key is stripped from params before the tool sees them.
    #[test]
    fn capability_param_is_stripped_before_invocation() {
        let seen = Arc::new(Mutex::new(Vec::<ActionParams>::new()));
        let seen_by_tool = seen.clone();

        let mut tools = ToolRegistry::new();
        tools.register(
            "spy",
            move |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
                seen_by_tool.lock().unwrap().push(p.clone());
                Ok(json!(null))
            },
            caps(&["user_query"]),
        );
        let ctx = EngineContext::new(tools, PolicyRegistry::new());

        let plan = Plan::new(vec![ProposedAction::new(
            "spy",
            params(&[("capability", "user_query"), ("query", "hello")]),
        )
        .with_capability(Capability::new("user_query"))]);

        Interpreter::new(&ctx).run(&plan).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].contains_key("capability"));
        assert!(seen[0].contains_key("query"));
    }

    /// A failing tool yields ExecutionError on its own record and does not
    /// abort the actions after it.
    #[test]
    fn tool_failure_does_not_abort_the_plan() {
        let mut tools = ToolRegistry::new();
        tools.register(
            "flaky",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> {
                Err(ToolError::new("smtp timeout"))
            },
            caps(&["untrusted"]),
        );
        tools.register(
            "steady",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> { Ok(json!("done")) },
            caps(&["untrusted"]),
        );
        let ctx = EngineContext::new(tools, PolicyRegistry::new());

        let plan = Plan::new(vec![
            ProposedAction::new("flaky", ActionParams::new()),
            ProposedAction::new("steady", ActionParams::new()),
        ]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        match &records[0].outcome {
            ActionOutcome::ExecutionError { message } => {
                assert!(message.contains("smtp timeout"));
            }
            other => panic!("expected ExecutionError, got {:?}", other),
        }
        assert!(matches!(
            records[1].outcome,
            ActionOutcome::Executed { .. }
        ));
    }

    /// A panicking tool degrades to ExecutionError instead of unwinding
    /// out of the engine.
    #[test]
    fn panicking_tool_becomes_execution_error() {
        let mut tools = ToolRegistry::new();
        tools.register(
            "bomb",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> {
                panic!("tool exploded")
            },
            caps(&["untrusted"]),
        );
        tools.register(
            "after",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> { Ok(json!("ok")) },
            caps(&["untrusted"]),
        );
        let ctx = EngineContext::new(tools, PolicyRegistry::new());

        let plan = Plan::new(vec![
            ProposedAction::new("bomb", ActionParams::new()),
            ProposedAction::new("after", ActionParams::new()),
        ]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        match &records[0].outcome {
            ActionOutcome::ExecutionError { message } => {
                assert!(message.contains("panicked"));
            }
            other => panic!("expected ExecutionError, got {:?}", other),
        }
        assert!(matches!(
            records[1].outcome,
            ActionOutcome::Executed { .. }
        ));
    }

    /// Outcome records preserve plan order across mixed outcomes.
    #[test]
    fn records_preserve_plan_order() {
        let ctx = email_context();
        let plan = Plan::new(vec![
            email_action("bob@company.com"),
            ProposedAction::new("delete_everything", ActionParams::new()),
            email_action("eve@attacker.com"),
        ]);

        let records = Interpreter::new(&ctx).run(&plan).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].action_id, ActionId::new("action-0"));
        assert_eq!(records[1].action_id, ActionId::new("action-1"));
        assert_eq!(records[2].action_id, ActionId::new("action-2"));
        assert!(matches!(
            records[0].outcome,
            ActionOutcome::Executed { .. }
        ));
        assert_eq!(
            records[1].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::UnknownTool
            }
        );
        assert_eq!(
            records[2].outcome,
            ActionOutcome::Denied {
                reason: DenialReason::PolicyViolation
            }
        );
    }

    // ── Plan graph contracts ──────────────────────────────────────────────────

    #[test]
    fn duplicate_action_ids_are_malformed() {
        let ctx = email_context();
        let plan = Plan::new(vec![
            email_action("bob@company.com").with_id(ActionId::new("a")),
            email_action("bob@company.com").with_id(ActionId::new("a")),
        ]);

        match Interpreter::new(&ctx).run(&plan) {
            Err(CustosError::MalformedPlan { reason }) => {
                assert!(reason.contains("duplicate action id"));
            }
            other => panic!("expected MalformedPlan, got {:?}", other),
        }
    }

    #[test]
    fn unknown_dependency_is_malformed() {
        let plan = Plan::new(vec![
            email_action("bob@company.com").after(ActionId::new("ghost"))
        ]);

        match PlanGraph::build(&plan) {
            Err(CustosError::MalformedPlan { reason }) => {
                assert!(reason.contains("unknown action"));
            }
            other => panic!("expected MalformedPlan, got {:?}", other),
        }
    }

    /// A dependency on a later action can never be honored by in-order
    /// execution and is rejected rather than silently reordered.
    #[test]
    fn forward_dependency_is_malformed() {
        let plan = Plan::new(vec![
            email_action("bob@company.com")
                .with_id(ActionId::new("first"))
                .after(ActionId::new("second")),
            email_action("bob@company.com").with_id(ActionId::new("second")),
        ]);

        match PlanGraph::build(&plan) {
            Err(CustosError::MalformedPlan { reason }) => {
                assert!(reason.contains("does not precede"));
            }
            other => panic!("expected MalformedPlan, got {:?}", other),
        }
    }

    /// Planner-supplied edges appear in the graph; nothing is inferred
    /// from shared parameters.
    #[test]
    fn edges_come_only_from_explicit_declarations() {
        let shared = params(&[("document", "x.txt")]);
        let plan = Plan::new(vec![
            ProposedAction::new("a_tool", shared.clone()).with_id(ActionId::new("a")),
            // Same parameters — still no inferred edge.
            ProposedAction::new("b_tool", shared).with_id(ActionId::new("b")),
            ProposedAction::new("c_tool", ActionParams::new())
                .with_id(ActionId::new("c"))
                .after(ActionId::new("a")),
        ]);

        let graph = PlanGraph::build(&plan).unwrap();
        assert_eq!(graph.edges(), &[(0, 2)]);
    }

    // ── Audit integration ─────────────────────────────────────────────────────

    #[test]
    fn audit_sink_receives_every_record_and_finalize() {
        let ctx = email_context();
        let sink = MockSink::new();
        let records_handle = sink.records.clone();
        let finalized_handle = sink.finalized.clone();

        let plan = Plan::new(vec![
            email_action("bob@company.com"),
            email_action("eve@attacker.com"),
        ]);

        Interpreter::new(&ctx).with_audit(&sink).run(&plan).unwrap();

        let written = records_handle.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].plan_id, plan.id);
        assert_eq!(finalized_handle.lock().unwrap().as_slice(), &[plan.id]);
    }

    /// A sink that cannot persist aborts the run with AuditWriteFailed.
    #[test]
    fn failed_audit_write_aborts_the_run() {
        let ctx = email_context();
        let sink = MockSink::failing();
        let plan = Plan::new(vec![email_action("bob@company.com")]);

        match Interpreter::new(&ctx).with_audit(&sink).run(&plan) {
            Err(CustosError::AuditWriteFailed { .. }) => {}
            other => panic!("expected AuditWriteFailed, got {:?}", other),
        }
    }

    // ── Divergent gate semantics ──────────────────────────────────────────────

    /// The two named capability checks intentionally differ: the data
    /// flow graph's operation check requires ALL listed capabilities,
    /// while the tool gate requires the action's single capability to be
    /// a MEMBER of the tool's accepted set. The same trust facts give
    /// different answers and callers must pick the check they mean.
    #[test]
    fn graph_all_of_check_diverges_from_tool_gate() {
        use custos_contracts::node::DataSource;
        use custos_graph::DataFlowGraph;

        // A node holding only "a".
        let mut graph = DataFlowGraph::new();
        let node = graph.create_node(json!("payload"), DataSource::System, caps(&["a"]));

        // All-of: an operation requiring {a, b} is denied.
        assert!(!graph.check_operation_allowed(
            node,
            "export",
            &[Capability::new("a"), Capability::new("b")]
        ));

        // One-of: a tool accepting {a, b} permits an action declaring "a".
        let mut tools = ToolRegistry::new();
        tools.register(
            "export",
            |_: &ActionParams| -> Result<serde_json::Value, ToolError> { Ok(json!("ok")) },
            caps(&["a", "b"]),
        );
        let ctx = EngineContext::new(tools, PolicyRegistry::new());
        let decision =
            Interpreter::new(&ctx).gate("export", &Capability::new("a"), &ActionParams::new());

        assert_eq!(decision, GateDecision::Permitted);
    }
}
