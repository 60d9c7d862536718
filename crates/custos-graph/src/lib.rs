//! # custos-graph
//!
//! The provenance-tracking data flow graph for the CUSTOS runtime.
//!
//! ## Overview
//!
//! Data entering the system is recorded as a node with a capability set;
//! data computed from it is recorded as a derived node whose capability
//! set is the intersection of its parents' sets. Trust only narrows
//! through derivation — this is the attenuation invariant the execution
//! engine relies on when it annotates proposed actions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_graph::DataFlowGraph;
//!
//! let mut graph = DataFlowGraph::new();
//! let query = graph.create_node(payload, DataSource::ExternalInput, caps);
//! let summary = graph.create_derived_node(summary_payload, &[query], "summarize");
//! assert!(graph.get_capabilities(summary).is_subset(&graph.get_capabilities(query)));
//! ```

pub mod graph;

pub use graph::DataFlowGraph;

// ── Tests ─────────────────────────────────────────────────────────────────────
