//! # custos-policy
//!
//! Fail-closed policy registry for the CUSTOS runtime.
//!
//! ## Overview
//!
//! A policy is a named, pure predicate over action parameters. Tools are
//! bound to the policies that constrain them via a TOML-loadable table;
//! [`PolicyRegistry::enforce`] is the single question the execution engine
//! asks: "do all policies bound to this tool pass for these parameters?"
//!
//! Every uncertain condition resolves to denial: unknown policy names
//! evaluate to false, and panicking predicates are caught and treated as
//! violations.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use custos_policy::{PolicyRegistry, builtin::EmailDomainPolicy};
//!
//! let mut registry = PolicyRegistry::new();
//! registry.register("email_domain_policy", EmailDomainPolicy::default());
//! registry.bind("send_email", vec!["email_domain_policy".to_string()]);
//! assert!(registry.enforce("send_email", &params));
//! ```

pub mod bindings;
pub mod builtin;
pub mod registry;

pub use bindings::PolicyBindings;
pub use builtin::{AttachmentPolicy, EmailDomainPolicy, QuerySanitizationPolicy};
pub use registry::{ActionPolicy, PolicyRegistry};

// ── Tests ─────────────────────────────────────────────────────────────────────
