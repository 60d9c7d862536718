//! The policy registry: named predicates plus the tool→policy bindings.
//!
//! Evaluation is fail-closed on every uncertain path: an unknown policy
//! name evaluates to false, and a predicate that panics is caught and
//! evaluates to false. A tool with no bound policies is unconstrained by
//! policy (it is still subject to the engine's capability gate).

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use custos_contracts::plan::ActionParams;

use crate::bindings::PolicyBindings;

/// A pure predicate over action parameters.
///
/// Implementations must not mutate shared state. Determinism is expected:
/// the engine may re-evaluate a policy for the same parameters and relies
/// on getting the same answer.
pub trait ActionPolicy: Send + Sync {
    /// Return true iff the parameters satisfy this policy.
    fn check(&self, params: &ActionParams) -> bool;
}

/// Plain closures are policies.
impl<F> ActionPolicy for F
where
    F: Fn(&ActionParams) -> bool + Send + Sync,
{
    fn check(&self, params: &ActionParams) -> bool {
        self(params)
    }
}

static NO_POLICIES: &[String] = &[];

/// Maps policy name → predicate and tool name → applicable policy names.
///
/// Registered once at startup and then passed by shared reference into
/// the engine context; holding it immutably for the duration of one plan
/// gives that plan a consistent snapshot of the policy surface.
#[derive(Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Box<dyn ActionPolicy>>,
    bindings: PolicyBindings,
}

impl PolicyRegistry {
    /// An empty registry: no policies, no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named policy. Re-registering a name replaces the
    /// previous predicate.
    pub fn register(&mut self, name: impl Into<String>, policy: impl ActionPolicy + 'static) {
        let name = name.into();
        info!(policy = %name, "registered policy");
        self.policies.insert(name, Box::new(policy));
    }

    /// Bind a tool name to the ordered list of policies that apply to it.
    /// Rebinding a tool replaces its previous list.
    pub fn bind(&mut self, tool_name: impl Into<String>, policy_names: Vec<String>) {
        self.bindings.bind(tool_name, policy_names);
    }

    /// Replace the whole tool→policy table, e.g. with one loaded from TOML.
    pub fn set_bindings(&mut self, bindings: PolicyBindings) {
        self.bindings = bindings;
    }

    /// The policy names bound to a tool, in binding order. A tool with no
    /// entry has no applicable policies.
    pub fn applicable_policies(&self, tool_name: &str) -> &[String] {
        self.bindings.for_tool(tool_name).unwrap_or(NO_POLICIES)
    }

    /// Evaluate one named policy against the parameters.
    ///
    /// Fail-closed: an unknown policy name is false; a panicking
    /// predicate is caught and treated as false.
    pub fn evaluate(&self, policy_name: &str, params: &ActionParams) -> bool {
        let Some(policy) = self.policies.get(policy_name) else {
            warn!(policy = %policy_name, "unknown policy evaluates to false");
            return false;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| policy.check(params))) {
            Ok(result) => {
                debug!(policy = %policy_name, result, "policy evaluated");
                result
            }
            Err(_) => {
                warn!(policy = %policy_name, "policy predicate panicked; treating as violation");
                false
            }
        }
    }

    /// Evaluate every policy bound to `tool_name`, returning the result
    /// per policy name.
    pub fn evaluate_all(&self, tool_name: &str, params: &ActionParams) -> BTreeMap<String, bool> {
        self.applicable_policies(tool_name)
            .iter()
            .map(|name| (name.clone(), self.evaluate(name, params)))
            .collect()
    }

    /// True iff every policy bound to `tool_name` passes. Vacuously true
    /// when no policies are bound.
    pub fn enforce(&self, tool_name: &str, params: &ActionParams) -> bool {
        self.evaluate_all(tool_name, params)
            .values()
            .all(|&passed| passed)
    }
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("policies", &self.policies.keys().collect::<Vec<_>>())
            .field("bindings", &self.bindings)
            .finish()
    }
}
