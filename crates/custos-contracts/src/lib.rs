//! # custos-contracts
//!
//! Shared types, schemas, and contracts for the CUSTOS capability runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod capability;
pub mod error;
pub mod node;
pub mod plan;

#[cfg(test)]
mod tests {
    use super::*;
    use capability::{Capability, CapabilitySet};
    use error::CustosError;
    use node::NodeId;
    use plan::{ActionOutcome, ActionParams, DenialReason, PlanId, ProposedAction};

    // ── CapabilitySet ────────────────────────────────────────────────────────

    #[test]
    fn capability_set_grant_and_has() {
        let mut caps = CapabilitySet::new();
        let query = Capability::new("user_query");
        let email = Capability::new("trusted_email");

        assert!(!caps.has(&query));
        assert!(!caps.has(&email));

        caps.grant(query.clone());
        assert!(caps.has(&query));
        assert!(!caps.has(&email));

        caps.grant(email.clone());
        assert!(caps.has(&query));
        assert!(caps.has(&email));
    }

    #[test]
    fn capability_set_duplicate_grant_is_idempotent() {
        let mut caps = CapabilitySet::new();
        caps.grant(Capability::new("user_query"));
        caps.grant(Capability::new("user_query"));

        assert_eq!(caps.len(), 1);
    }

    #[test]
    fn capability_set_revoke_reports_absence() {
        let mut caps: CapabilitySet = ["a", "b"].into_iter().collect();

        assert!(caps.revoke(&Capability::new("a")));
        // Already gone — a second revoke must say so.
        assert!(!caps.revoke(&Capability::new("a")));
        assert!(caps.has(&Capability::new("b")));
    }

    #[test]
    fn capability_set_intersection_attenuates() {
        let left: CapabilitySet = ["a", "b"].into_iter().collect();
        let right: CapabilitySet = ["b", "c"].into_iter().collect();

        let shared = left.intersection(&right);
        assert_eq!(shared.sorted(), vec![Capability::new("b")]);

        // Intersecting with an empty set always attenuates to empty.
        let nothing = left.intersection(&CapabilitySet::new());
        assert!(nothing.is_empty());
    }

    #[test]
    fn capability_set_serializes_sorted() {
        let caps: CapabilitySet = ["zeta", "alpha", "mid"].into_iter().collect();
        let json = serde_json::to_string(&caps).unwrap();

        // Canonical form: lexicographic order regardless of insertion order.
        assert_eq!(json, r#"["alpha","mid","zeta"]"#);

        let decoded: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, caps);
    }

    // ── Outcomes ─────────────────────────────────────────────────────────────

    #[test]
    fn denial_reason_display_strings() {
        assert_eq!(DenialReason::UnknownTool.to_string(), "unknown tool");
        assert_eq!(
            DenialReason::CapabilityMismatch.to_string(),
            "capability mismatch"
        );
        assert_eq!(
            DenialReason::PolicyViolation.to_string(),
            "policy violation"
        );
    }

    #[test]
    fn outcome_terminal_states() {
        assert!(!ActionOutcome::Pending.is_terminal());
        assert!(!ActionOutcome::Permitted.is_terminal());
        assert!(ActionOutcome::Denied {
            reason: DenialReason::UnknownTool
        }
        .is_terminal());
        assert!(ActionOutcome::Executed {
            result: serde_json::Value::Null
        }
        .is_terminal());
        assert!(ActionOutcome::ExecutionError {
            message: "boom".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn outcome_round_trips_through_json() {
        let outcomes = vec![
            ActionOutcome::Pending,
            ActionOutcome::Permitted,
            ActionOutcome::Denied {
                reason: DenialReason::PolicyViolation,
            },
            ActionOutcome::Executed {
                result: serde_json::json!({ "sent": true }),
            },
            ActionOutcome::ExecutionError {
                message: "smtp timeout".to_string(),
            },
        ];

        for original in outcomes {
            let json = serde_json::to_string(&original).unwrap();
            let decoded: ActionOutcome = serde_json::from_str(&json).unwrap();
            assert_eq!(original, decoded);
        }
    }

    // ── Proposed actions ─────────────────────────────────────────────────────

    #[test]
    fn proposed_action_deserializes_from_bare_planner_output() {
        // The minimal planner form: tool + params + capability.
        let json = r#"{
            "tool_name": "send_email",
            "params": { "recipient": "bob@company.com", "document": "x.txt" },
            "capability": "trusted_email"
        }"#;

        let action: ProposedAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.tool_name, "send_email");
        assert_eq!(action.capability, Some(Capability::new("trusted_email")));
        assert!(action.id.is_none());
        assert!(action.depends_on.is_empty());
    }

    #[test]
    fn proposed_action_capability_defaults_to_absent() {
        let json = r#"{ "tool_name": "search_document" }"#;
        let action: ProposedAction = serde_json::from_str(json).unwrap();

        assert!(action.capability.is_none());
        assert_eq!(action.params, ActionParams::new());
    }

    // ── IDs ──────────────────────────────────────────────────────────────────

    #[test]
    fn node_and_plan_ids_are_unique() {
        let nodes: std::collections::HashSet<String> =
            (0..100).map(|_| NodeId::new().to_string()).collect();
        assert_eq!(nodes.len(), 100);

        let plans: std::collections::HashSet<String> =
            (0..100).map(|_| PlanId::new().to_string()).collect();
        assert_eq!(plans.len(), 100);
    }

    // ── CustosError display messages ─────────────────────────────────────────

    #[test]
    fn error_malformed_plan_display() {
        let err = CustosError::MalformedPlan {
            reason: "duplicate action id 'action-0'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("malformed plan"));
        assert!(msg.contains("action-0"));
    }

    #[test]
    fn error_config_display() {
        let err = CustosError::ConfigError {
            reason: "missing bindings file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("missing bindings file"));
    }

    #[test]
    fn error_audit_write_failed_display() {
        let err = CustosError::AuditWriteFailed {
            reason: "ledger lock poisoned".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("audit write failed"));
        assert!(msg.contains("ledger lock poisoned"));
    }
}
