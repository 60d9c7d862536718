//! The engine context: the registries one plan evaluation reads from.
//!
//! Constructed once per process and passed by shared reference to the
//! interpreter — there is no global registry state. Because the
//! interpreter borrows the context immutably for the duration of `run`,
//! a registration change can never be observed mid-plan.

use custos_policy::PolicyRegistry;

use crate::registry::ToolRegistry;

/// The read-only surface the interpreter gates against.
#[derive(Debug, Default)]
pub struct EngineContext {
    pub tools: ToolRegistry,
    pub policies: PolicyRegistry,
}

impl EngineContext {
    /// Assemble a context from populated registries.
    pub fn new(tools: ToolRegistry, policies: PolicyRegistry) -> Self {
        Self { tools, policies }
    }
}
