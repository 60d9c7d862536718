//! CUSTOS — Prompt-Injection Defense Demo CLI
//!
//! Runs one or all of the demo scenarios. Each scenario wires real CUSTOS
//! components (tool registry, policy registry, interpreter, outcome ledger,
//! data flow graph) against a hand-written structured plan.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- trusted-email
//!   cargo run -p demo -- exfiltration
//!   cargo run -p demo -- provenance

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custos_contracts::error::CustosResult;
use custos_engine::EngineContext;

mod scenarios;

// ── CLI definition ────────────────────────────────────────────────────────────

/// CUSTOS — capability-tracked, policy-gated tool execution demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CUSTOS prompt-injection defense demo",
    long_about = "Runs CUSTOS demo scenarios showing capability gating, policy\n\
                  enforcement, provenance attenuation, and the hash-chained\n\
                  outcome ledger."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// A legitimate trusted email is permitted and executed.
    TrustedEmail,
    /// An exfiltration attempt is denied by the email domain policy.
    Exfiltration,
    /// A plan naming an unregistered tool is denied fail-closed.
    UnknownTool,
    /// An untrusted context cannot drive a trusted tool.
    UntrustedCapability,
    /// A SQL-shaped search query is denied by query sanitization.
    InjectionQuery,
    /// Capability attenuation through a derived data node.
    Provenance,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for the gate trace.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = scenarios::build_context().and_then(|ctx| match cli.command {
        Command::RunAll => run_all(&ctx),
        Command::TrustedEmail => scenarios::trusted_email(&ctx),
        Command::Exfiltration => scenarios::exfiltration_attempt(&ctx),
        Command::UnknownTool => scenarios::unknown_tool(&ctx),
        Command::UntrustedCapability => scenarios::untrusted_capability(&ctx),
        Command::InjectionQuery => scenarios::injection_query(&ctx),
        Command::Provenance => scenarios::provenance(&ctx),
    });

    match result {
        Ok(()) => println!("\nAll selected scenarios completed."),
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all(ctx: &EngineContext) -> CustosResult<()> {
    scenarios::trusted_email(ctx)?;
    scenarios::exfiltration_attempt(ctx)?;
    scenarios::unknown_tool(ctx)?;
    scenarios::untrusted_capability(ctx)?;
    scenarios::injection_query(ctx)?;
    scenarios::provenance(ctx)
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("CUSTOS — Capability-Tracked Tool Execution");
    println!("Prompt-Injection Defense Demo");
    println!("==========================================");
    println!();
    println!("Gate applied to every proposed action:");
    println!("  [1] Tool lookup — unregistered tools are denied (unknown tool)");
    println!("  [2] Capability check — the action's capability must be accepted by the tool");
    println!("  [3] Policy check — every policy bound to the tool must pass");
    println!("  [4] Execution — capability key stripped; failures stay per-action");
    println!("  [5] One outcome record per action, hash-chained in the ledger");
    println!();
}
