//! The tool registry: name → handler + required capability set.
//!
//! Pure metadata plus an invocation handle; no execution happens here.

use std::collections::HashMap;

use tracing::info;

use custos_contracts::{
    capability::{Capability, CapabilitySet},
    plan::ActionParams,
};

use crate::traits::{ToolError, ToolHandler};

/// One registered tool.
pub struct RegisteredTool {
    handler: Box<dyn ToolHandler>,
    required_capabilities: CapabilitySet,
}

impl RegisteredTool {
    /// The capability gate for this tool: one-of membership. An action
    /// passes when its single declared capability is a member of this
    /// tool's accepted set.
    pub fn accepts(&self, capability: &Capability) -> bool {
        self.required_capabilities.has(capability)
    }

    /// The capabilities this tool accepts.
    pub fn required_capabilities(&self) -> &CapabilitySet {
        &self.required_capabilities
    }

    /// Invoke the underlying handler. Callers are responsible for
    /// stripping capability metadata from `params` first.
    pub fn invoke(&self, params: &ActionParams) -> Result<serde_json::Value, ToolError> {
        self.handler.invoke(params)
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("required_capabilities", &self.required_capabilities.sorted())
            .finish()
    }
}

/// Maps tool name → registered tool. Populated at startup.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name replaces the entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl ToolHandler + 'static,
        required_capabilities: CapabilitySet,
    ) {
        let name = name.into();
        info!(
            tool = %name,
            capabilities = ?required_capabilities.sorted(),
            "registered tool"
        );
        self.tools.insert(
            name,
            RegisteredTool {
                handler: Box::new(handler),
                required_capabilities,
            },
        );
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
