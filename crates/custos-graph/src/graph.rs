//! The data flow graph: provenance recording and capability attenuation.
//!
//! Every unit of data the system handles is a node in this graph; an edge
//! from A to B records "B was derived from A". A derived node's capability
//! set is computed at creation as the intersection of its parents' sets,
//! so derived data can never carry a capability none of its sources had.
//!
//! All queries are fail-closed: an unknown node id yields `false`, an
//! empty set, or an empty report — never an error and never implicit trust.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use custos_contracts::{
    capability::{Capability, CapabilitySet},
    node::{DataSource, NodeId, ProvenanceEntry},
};

/// One provenance-tracked unit of data.
#[derive(Debug, Clone)]
struct DataNode {
    payload: serde_json::Value,
    source: DataSource,
    capabilities: CapabilitySet,
    /// Present only when `source` is `Derived`.
    transformation: Option<String>,
    /// Nodes this one was derived from (incoming edges).
    parents: Vec<NodeId>,
    /// Nodes derived from this one (outgoing edges).
    children: Vec<NodeId>,
}

/// A directed acyclic graph of data nodes.
///
/// Nodes are created once and never deleted individually; the graph is
/// garbage-collected as a whole when the owning session ends. Capability
/// sets may be explicitly upgraded or downgraded after creation by
/// trusted code via [`add_capability`](DataFlowGraph::add_capability) and
/// [`remove_capability`](DataFlowGraph::remove_capability).
#[derive(Debug, Default)]
pub struct DataFlowGraph {
    nodes: HashMap<NodeId, DataNode>,
}

impl DataFlowGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new root-level data node. Always succeeds.
    pub fn create_node(
        &mut self,
        payload: serde_json::Value,
        source: DataSource,
        capabilities: CapabilitySet,
    ) -> NodeId {
        let id = NodeId::new();
        debug!(node = %id, %source, "created data node");

        self.nodes.insert(
            id,
            DataNode {
                payload,
                source,
                capabilities,
                transformation: None,
                parents: Vec::new(),
                children: Vec::new(),
            },
        );
        id
    }

    /// Record a node derived from existing nodes.
    ///
    /// The new node's capability set is the intersection of all existing
    /// parents' sets at creation time. Nonexistent parent ids are silently
    /// ignored: missing provenance must never be treated as infinite
    /// trust, so it contributes nothing to the intersection rather than
    /// aborting the operation. With no valid parents the set is empty.
    pub fn create_derived_node(
        &mut self,
        payload: serde_json::Value,
        parent_ids: &[NodeId],
        transformation: impl Into<String>,
    ) -> NodeId {
        let id = NodeId::new();

        let mut capabilities: Option<CapabilitySet> = None;
        let mut valid_parents: Vec<NodeId> = Vec::new();

        for parent_id in parent_ids {
            let Some(parent) = self.nodes.get(parent_id) else {
                warn!(node = %id, parent = %parent_id, "ignoring unknown parent of derived node");
                continue;
            };
            capabilities = Some(match capabilities {
                None => parent.capabilities.clone(),
                Some(acc) => acc.intersection(&parent.capabilities),
            });
            if !valid_parents.contains(parent_id) {
                valid_parents.push(*parent_id);
            }
        }

        let capabilities = capabilities.unwrap_or_default();
        debug!(
            node = %id,
            parents = valid_parents.len(),
            capabilities = ?capabilities.sorted(),
            "created derived data node"
        );

        for parent_id in &valid_parents {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.push(id);
            }
        }

        self.nodes.insert(
            id,
            DataNode {
                payload,
                source: DataSource::Derived,
                capabilities,
                transformation: Some(transformation.into()),
                parents: valid_parents,
                children: Vec::new(),
            },
        );
        id
    }

    /// Explicitly upgrade a node's trust. Returns false for unknown nodes.
    ///
    /// This is a mutation by trusted code, not a re-derivation; the
    /// attenuation invariant applies only at derivation time.
    pub fn add_capability(&mut self, id: NodeId, capability: Capability) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                debug!(node = %id, %capability, "added capability");
                node.capabilities.grant(capability);
                true
            }
            None => {
                warn!(node = %id, %capability, "cannot add capability to unknown node");
                false
            }
        }
    }

    /// Explicitly downgrade a node's trust. Returns false for unknown
    /// nodes and for capabilities the node does not hold.
    pub fn remove_capability(&mut self, id: NodeId, capability: &Capability) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                let removed = node.capabilities.revoke(capability);
                if removed {
                    debug!(node = %id, %capability, "removed capability");
                } else {
                    debug!(node = %id, %capability, "capability not present on node");
                }
                removed
            }
            None => {
                warn!(node = %id, %capability, "cannot remove capability from unknown node");
                false
            }
        }
    }

    /// True iff the node exists and holds the capability.
    pub fn has_capability(&self, id: NodeId, capability: &Capability) -> bool {
        match self.nodes.get(&id) {
            Some(node) => node.capabilities.has(capability),
            None => {
                warn!(node = %id, "cannot check capability of unknown node");
                false
            }
        }
    }

    /// The node's capability set; empty for unknown nodes.
    pub fn get_capabilities(&self, id: NodeId) -> CapabilitySet {
        match self.nodes.get(&id) {
            Some(node) => node.capabilities.clone(),
            None => {
                warn!(node = %id, "cannot get capabilities of unknown node");
                CapabilitySet::new()
            }
        }
    }

    /// The payload carried by the node, if it exists.
    pub fn get_payload(&self, id: NodeId) -> Option<&serde_json::Value> {
        let payload = self.nodes.get(&id).map(|node| &node.payload);
        if payload.is_none() {
            warn!(node = %id, "cannot get payload of unknown node");
        }
        payload
    }

    /// True iff the node holds EVERY capability in `required`.
    ///
    /// All-of semantics — deliberately distinct from the execution
    /// engine's tool gate, which tests whether an action's single
    /// capability is a member of the tool's accepted set. Callers choose
    /// the check that matches their trust question.
    pub fn check_operation_allowed(
        &self,
        id: NodeId,
        operation: &str,
        required: &[Capability],
    ) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            warn!(node = %id, operation, "cannot check operation on unknown node");
            return false;
        };

        for capability in required {
            if !node.capabilities.has(capability) {
                warn!(
                    node = %id,
                    operation,
                    missing = %capability,
                    "operation denied: missing capability"
                );
                return false;
            }
        }

        debug!(node = %id, operation, "operation allowed");
        true
    }

    /// Trace the ancestry of a node back to its sources.
    ///
    /// Depth-first traversal over parent edges. Each entry carries the
    /// node's full snapshot plus the path of descendant ids taken to
    /// reach it (empty for the queried node itself). A node already
    /// visited is never reported again, so multi-parent diamonds appear
    /// once, at the path via which they were first discovered — and the
    /// traversal terminates even on malformed (cyclic) input.
    ///
    /// An unknown node id yields an empty report.
    pub fn get_provenance(&self, id: NodeId) -> Vec<ProvenanceEntry> {
        if !self.nodes.contains_key(&id) {
            warn!(node = %id, "cannot get provenance of unknown node");
            return Vec::new();
        }

        let mut report = Vec::new();
        let mut visited = HashSet::new();
        self.trace(id, Vec::new(), &mut visited, &mut report);
        report
    }

    fn trace(
        &self,
        current: NodeId,
        path: Vec<NodeId>,
        visited: &mut HashSet<NodeId>,
        report: &mut Vec<ProvenanceEntry>,
    ) {
        if !visited.insert(current) {
            return;
        }

        let Some(node) = self.nodes.get(&current) else {
            return;
        };

        report.push(ProvenanceEntry {
            id: current,
            payload: node.payload.clone(),
            source: node.source,
            capabilities: node.capabilities.sorted(),
            transformation: node.transformation.clone(),
            path: path.clone(),
        });

        for parent in &node.parents {
            let mut parent_path = path.clone();
            parent_path.push(current);
            self.trace(*parent, parent_path, visited, report);
        }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no nodes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
