//! Data node identity, provenance sources, and provenance snapshots.
//!
//! The data flow graph itself lives in custos-graph; this module only
//! defines the wire-visible types it shares with inspectors.

use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// Unique identifier for a data node.
///
/// Generated once at node creation and never reused. Appears in parent
/// edges, provenance paths, and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub uuid::Uuid);

impl NodeId {
    /// Create a new, unique node ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a data node's payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Attacker-reachable input: user queries, fetched documents, inbound mail.
    ExternalInput,
    /// Produced by trusted system code.
    System,
    /// The result of a permitted tool invocation.
    ToolOutput,
    /// Computed from one or more existing nodes; capabilities attenuate.
    Derived,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataSource::ExternalInput => "external_input",
            DataSource::System => "system",
            DataSource::ToolOutput => "tool_output",
            DataSource::Derived => "derived",
        };
        f.write_str(name)
    }
}

/// One entry in a provenance report: a full node snapshot plus the path
/// of descendant ids the traversal took to reach it.
///
/// `capabilities` is materialized as a sorted sequence so reports are
/// stable across runs. `path` is empty for the node the query started at
/// and grows by one id per derivation hop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// The node this snapshot describes.
    pub id: NodeId,
    /// The payload carried by the node at query time.
    pub payload: serde_json::Value,
    /// How the node was produced.
    pub source: DataSource,
    /// The node's capability set, sorted lexicographically.
    pub capabilities: Vec<Capability>,
    /// Description of the derivation, present only for derived nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
    /// Descendant ids walked to reach this node, nearest ancestor last.
    pub path: Vec<NodeId>,
}
