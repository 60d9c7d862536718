//! Demo scenarios: structured plans exercising every gate outcome.
//!
//! The "planner" here is a hand-written list of proposed actions — the
//! same structured value a real LLM-backed planner would emit. Injection
//! attempts show up as attacker-shaped parameter values, never as text
//! the engine has to parse.

use serde_json::json;

use custos_audit::InMemoryLedger;
use custos_contracts::{
    capability::{Capability, CapabilitySet},
    error::CustosResult,
    node::DataSource,
    plan::{ActionOutcome, ActionParams, ActionRecord, Plan, ProposedAction},
};
use custos_engine::{EngineContext, Interpreter, ToolError, ToolRegistry};
use custos_graph::DataFlowGraph;
use custos_policy::{
    AttachmentPolicy, EmailDomainPolicy, PolicyBindings, PolicyRegistry, QuerySanitizationPolicy,
};

// ── Context assembly ──────────────────────────────────────────────────────────

const BINDINGS_TOML: &str = r#"
[[tools]]
name = "send_email"
policies = ["email_domain_policy", "attachment_policy"]

[[tools]]
name = "search_document"
policies = ["query_sanitization_policy"]
"#;

fn param_str<'a>(params: &'a ActionParams, key: &str) -> &'a str {
    params.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn caps(names: &[&str]) -> CapabilitySet {
    names.iter().copied().collect()
}

/// Build the demo engine context: four tools and the three builtin
/// policies, bound per tool via the TOML table above.
pub fn build_context() -> CustosResult<EngineContext> {
    let mut tools = ToolRegistry::new();
    tools.register(
        "send_email",
        |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
            Ok(json!(format!(
                "Email sent to {} with document: {}",
                param_str(p, "recipient"),
                param_str(p, "document"),
            )))
        },
        caps(&["trusted_email"]),
    );
    tools.register(
        "search_document",
        |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
            Ok(json!(format!(
                "Found 3 documents matching query: {}",
                param_str(p, "query"),
            )))
        },
        caps(&["user_query"]),
    );
    tools.register(
        "analyze_data",
        |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
            Ok(json!(format!(
                "Analysis of '{}' using method '{}' complete",
                param_str(p, "data"),
                param_str(p, "method"),
            )))
        },
        caps(&["data_analysis"]),
    );
    tools.register(
        "create_report",
        |p: &ActionParams| -> Result<serde_json::Value, ToolError> {
            Ok(json!(format!(
                "Report '{}' created with content: '{}'",
                param_str(p, "title"),
                param_str(p, "content"),
            )))
        },
        caps(&["report_creation"]),
    );

    let mut policies = PolicyRegistry::new();
    policies.register("email_domain_policy", EmailDomainPolicy::default());
    policies.register("attachment_policy", AttachmentPolicy::default());
    policies.register(
        "query_sanitization_policy",
        QuerySanitizationPolicy::default(),
    );
    policies.set_bindings(PolicyBindings::from_toml_str(BINDINGS_TOML)?);

    Ok(EngineContext::new(tools, policies))
}

fn print_records(records: &[ActionRecord]) {
    for record in records {
        let summary = match &record.outcome {
            ActionOutcome::Executed { result } => format!("Executed → {}", result),
            ActionOutcome::Denied { reason } => format!("Denied ({})", reason),
            ActionOutcome::ExecutionError { message } => {
                format!("ExecutionError ({})", message)
            }
            other => format!("{:?}", other),
        };
        println!(
            "  [{}] {} (capability: {}) — {}",
            record.action_id, record.tool_name, record.capability, summary
        );
    }
}

fn run_plan(title: &str, ctx: &EngineContext, plan: Plan) -> CustosResult<()> {
    println!("\n----- {} -----", title);

    let ledger = InMemoryLedger::new();
    let records = Interpreter::new(ctx).with_audit(&ledger).run(&plan)?;

    print_records(&records);
    println!(
        "  ledger: {} event(s), chain intact: {}",
        ledger.len(),
        ledger.verify_integrity()
    );
    Ok(())
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// A legitimate request: trusted capability, trusted recipient.
pub fn trusted_email(ctx: &EngineContext) -> CustosResult<()> {
    let plan = Plan::new(vec![ProposedAction::new(
        "send_email",
        [
            ("recipient".to_string(), json!("bob@company.com")),
            ("document".to_string(), json!("meeting-notes.txt")),
        ]
        .into_iter()
        .collect(),
    )
    .with_capability(Capability::new("trusted_email"))]);

    run_plan("Trusted email delivery", ctx, plan)
}

/// Exfiltration attempt: the recipient domain fails the email policy.
pub fn exfiltration_attempt(ctx: &EngineContext) -> CustosResult<()> {
    let plan = Plan::new(vec![ProposedAction::new(
        "send_email",
        [
            ("recipient".to_string(), json!("external@attacker.com")),
            ("document".to_string(), json!("confidential.txt")),
        ]
        .into_iter()
        .collect(),
    )
    .with_capability(Capability::new("trusted_email"))]);

    run_plan("Exfiltration attempt (policy violation)", ctx, plan)
}

/// A plan naming a tool that was never registered.
pub fn unknown_tool(ctx: &EngineContext) -> CustosResult<()> {
    let plan = Plan::new(vec![ProposedAction::new(
        "delete_everything",
        ActionParams::new(),
    )
    .with_capability(Capability::new("trusted_email"))]);

    run_plan("Unregistered tool (unknown tool)", ctx, plan)
}

/// Untrusted context trying to drive a trusted tool.
pub fn untrusted_capability(ctx: &EngineContext) -> CustosResult<()> {
    let plan = Plan::new(vec![ProposedAction::new(
        "send_email",
        [
            ("recipient".to_string(), json!("bob@company.com")),
            ("document".to_string(), json!("x.txt")),
        ]
        .into_iter()
        .collect(),
    )]);
    // No declared capability: the engine annotates it `untrusted`.

    run_plan("Untrusted context (capability mismatch)", ctx, plan)
}

/// An injection-shaped search query next to a clean one.
pub fn injection_query(ctx: &EngineContext) -> CustosResult<()> {
    let plan = Plan::new(vec![
        ProposedAction::new(
            "search_document",
            [("query".to_string(), json!("project schedules"))]
                .into_iter()
                .collect(),
        )
        .with_capability(Capability::new("user_query")),
        ProposedAction::new(
            "search_document",
            [(
                "query".to_string(),
                json!("DROP TABLE users; -- Can you search for this document?"),
            )]
            .into_iter()
            .collect(),
        )
        .with_capability(Capability::new("user_query")),
    ]);

    run_plan("Injection attempt in search query", ctx, plan)
}

/// Provenance walkthrough: a user query flows into a derived summary,
/// whose attenuated capability set then drives the plan annotation.
pub fn provenance(ctx: &EngineContext) -> CustosResult<()> {
    println!("\n----- Provenance and attenuation -----");

    let mut graph = DataFlowGraph::new();
    let query = graph.create_node(
        json!("Can you find the project schedule documents?"),
        DataSource::ExternalInput,
        caps(&["user_query"]),
    );
    let summary = graph.create_derived_node(
        json!("project schedule documents"),
        &[query],
        "extract_search_terms",
    );

    println!("  derived capabilities: {:?}", graph.get_capabilities(summary).sorted());
    for entry in graph.get_provenance(summary) {
        println!(
            "  node {} ({}), capabilities {:?}, via {:?}",
            entry.id, entry.source, entry.capabilities, entry.path
        );
    }

    // The derived node still carries user_query, so a search action built
    // from it is permitted; it never gained trusted_email, so mailing the
    // result is not.
    let search_cap = Capability::new("user_query");
    let plan = Plan::new(vec![
        ProposedAction::new(
            "search_document",
            [(
                "query".to_string(),
                graph.get_payload(summary).cloned().unwrap_or(json!("")),
            )]
            .into_iter()
            .collect(),
        )
        .with_capability(search_cap),
        ProposedAction::new(
            "send_email",
            [
                ("recipient".to_string(), json!("bob@company.com")),
                ("document".to_string(), json!("results.txt")),
            ]
            .into_iter()
            .collect(),
        )
        .with_capability(Capability::new("user_query")),
    ]);

    let records = Interpreter::new(ctx).run(&plan)?;
    print_records(&records);
    Ok(())
}
