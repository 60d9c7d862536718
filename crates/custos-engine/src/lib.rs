//! # custos-engine
//!
//! The deterministic gating and execution runtime for CUSTOS plans.
//!
//! This crate provides:
//! - The `ToolHandler` and `AuditSink` traits at the trust boundary
//! - The `ToolRegistry` (name → handler + accepted capability set)
//! - The `EngineContext` holding the registries one plan reads from
//! - The `Interpreter` that gates and executes a plan, producing one
//!   outcome record per action
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_engine::{EngineContext, Interpreter, ToolRegistry};
//!
//! let ctx = EngineContext::new(tools, policies);
//! let records = Interpreter::new(&ctx).run(&plan)?;
//! ```

pub mod context;
pub mod interpreter;
pub mod registry;
pub mod traits;

pub use context::EngineContext;
pub use interpreter::{AnnotatedAction, GateDecision, Interpreter, PlanGraph};
pub use registry::{RegisteredTool, ToolRegistry};
pub use traits::{AuditSink, ToolError, ToolHandler};
