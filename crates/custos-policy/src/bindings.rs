//! The tool→policy-names table, loadable from TOML.
//!
//! Which policies constrain which tool is deployment configuration, not
//! code. The table can be built programmatically with [`PolicyBindings::bind`]
//! or declared in a TOML document:
//!
//! ```toml
//! [[tools]]
//! name = "send_email"
//! policies = ["email_domain_policy", "attachment_policy"]
//!
//! [[tools]]
//! name = "search_document"
//! policies = ["query_sanitization_policy"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use custos_contracts::error::{CustosError, CustosResult};

#[derive(Debug, Deserialize)]
struct BindingsFile {
    #[serde(default)]
    tools: Vec<ToolBinding>,
}

#[derive(Debug, Deserialize)]
struct ToolBinding {
    name: String,
    policies: Vec<String>,
}

/// The static tool→policy-names mapping consulted during gating.
#[derive(Debug, Clone, Default)]
pub struct PolicyBindings {
    table: BTreeMap<String, Vec<String>>,
}

impl PolicyBindings {
    /// An empty table: no tool has applicable policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document into a bindings table.
    ///
    /// Returns `CustosError::ConfigError` if the TOML is malformed or does
    /// not match the expected shape.
    pub fn from_toml_str(s: &str) -> CustosResult<Self> {
        let file: BindingsFile = toml::from_str(s).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to parse policy bindings TOML: {}", e),
        })?;

        let mut bindings = Self::new();
        for tool in file.tools {
            bindings.bind(tool.name, tool.policies);
        }
        Ok(bindings)
    }

    /// Read and parse the TOML bindings file at `path`.
    pub fn from_file(path: &Path) -> CustosResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to read bindings file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Bind a tool to an ordered list of policy names, replacing any
    /// previous binding for that tool.
    pub fn bind(&mut self, tool_name: impl Into<String>, policy_names: Vec<String>) {
        self.table.insert(tool_name.into(), policy_names);
    }

    /// The policy names bound to a tool, if any.
    pub fn for_tool(&self, tool_name: &str) -> Option<&[String]> {
        self.table.get(tool_name).map(Vec::as_slice)
    }
}
