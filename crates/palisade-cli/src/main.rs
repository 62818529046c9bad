//! `palisade` — screen one input through the policy gate.
//!
//! Exit codes: 0 the input may proceed, 1 the input was blocked,
//! 2 the evaluator was unavailable (infrastructure error, not a verdict).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use palisade_core::{GateDecision, PolicyCatalog};
use palisade_runtime::{GateConfig, PolicyGate, ProviderRegistry};

#[derive(Parser, Debug)]
#[command(name = "palisade", version, about = "Policy enforcement guardrail for untrusted input")]
struct Cli {
    /// Input to screen; read from stdin when omitted
    input: Option<String>,

    /// Policy catalog file (.yaml/.yml or .json); built-in catalog when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Evaluator provider
    #[arg(long, default_value = "gemini")]
    provider: String,

    /// Evaluator model
    #[arg(long)]
    model: Option<String>,

    /// Custom API endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Total invocation budget (first attempt plus retries)
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Print the decision as JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let decision = match run(&cli).await {
        Ok(decision) => decision,
        Err(e) => {
            // Infrastructure failure is not a verdict: report and let the
            // caller apply its own fallback.
            eprintln!("palisade: {e:#}");
            return ExitCode::from(2);
        }
    };

    print_decision(&decision, cli.json);
    if decision.proceed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

async fn run(cli: &Cli) -> Result<GateDecision> {
    let input = read_input(cli)?;
    let catalog = load_catalog(cli.catalog.as_deref())?;
    tracing::debug!(directives = catalog.len(), "catalog loaded");

    let registry = ProviderRegistry::with_defaults();
    let mut provider_config = serde_json::Map::new();
    if let Some(base_url) = &cli.base_url {
        provider_config.insert("base_url".to_string(), base_url.clone().into());
    }
    let provider = registry
        .create(&cli.provider, &provider_config.into())
        .with_context(|| format!("failed to configure provider '{}'", cli.provider))?;

    let mut config = GateConfig {
        max_attempts: cli.max_attempts,
        attempt_timeout: Duration::from_secs(cli.timeout_secs),
        ..GateConfig::default()
    };
    if let Some(model) = &cli.model {
        config.completion.model = model.clone();
    }

    let gate = PolicyGate::builder()
        .provider(provider)
        .catalog(catalog)
        .config(config)
        .build()?;

    Ok(gate.evaluate(&input).await?)
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(input) = &cli.input {
        return Ok(input.clone());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read input from stdin")?;
    if buf.trim().is_empty() {
        bail!("no input: pass it as an argument or on stdin");
    }
    Ok(buf)
}

fn load_catalog(path: Option<&Path>) -> Result<PolicyCatalog> {
    let Some(path) = path else {
        return Ok(PolicyCatalog::baseline());
    };

    let catalog = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => PolicyCatalog::from_json_file(path),
        _ => PolicyCatalog::from_yaml_file(path),
    };
    catalog.with_context(|| format!("failed to load catalog from {}", path.display()))
}

fn print_decision(decision: &GateDecision, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(decision) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("palisade: failed to serialize decision: {e}"),
        }
        return;
    }

    if decision.proceed {
        println!("PROCEED: {}", decision.message);
    } else {
        println!("BLOCKED: {}", decision.message);
        for directive in &decision.triggered {
            println!("  - {} (directive {})", directive.name, directive.ordinal);
        }
    }
}
