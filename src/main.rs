//! Bridge Orchestrator CLI
//!
//! ```text
//! bridge-orchestrator serve    [--env dev]
//! bridge-orchestrator transfer --from 1 --to 137 --asset wbtc --amount 0.1 \
//!                              --recipient 0x... [--retries 2] [--env dev]
//! ```
//!
//! `serve` runs the simulated transfer backend; `transfer` drives one
//! transfer through the orchestrator and prints every state change.

use anyhow::{Context, Result, bail};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use bridge_orchestrator::bridge::{ChainId, TransactionOrchestrator, Transition};
use bridge_orchestrator::{AppConfig, TransactionState, TransferRequest};

// ============================================================
// ARGUMENTS
// ============================================================

fn get_arg(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn require_arg(args: &[String], name: &str) -> Result<String> {
    get_arg(args, &[name]).with_context(|| format!("missing required argument {}", name))
}

fn get_env(args: &[String]) -> String {
    get_arg(args, &["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

fn parse_request(args: &[String]) -> Result<TransferRequest> {
    let from = require_arg(args, "--from")?
        .parse::<ChainId>()
        .context("--from must be a chain id")?;
    let to = require_arg(args, "--to")?
        .parse::<ChainId>()
        .context("--to must be a chain id")?;

    Ok(TransferRequest::new(
        from,
        to,
        require_arg(args, "--asset")?,
        require_arg(args, "--amount")?,
        require_arg(args, "--recipient")?,
    ))
}

// ============================================================
// COMMANDS
// ============================================================

#[cfg(feature = "mock-api")]
async fn run_serve(config: &AppConfig) -> Result<()> {
    bridge_orchestrator::simulator::serve(config.simulator.clone())
        .await
        .context("simulated backend stopped")
}

#[cfg(not(feature = "mock-api"))]
async fn run_serve(_config: &AppConfig) -> Result<()> {
    bail!("built without the mock-api feature; the simulated backend is unavailable")
}

fn print_transition(t: &Transition) {
    match &t.to {
        TransactionState::Pending { transaction_id, .. } => {
            println!("  {} -> {}  ({})", t.from, t.to, transaction_id)
        }
        TransactionState::Failed { reason, .. } => {
            println!("  {} -> {}  ({})", t.from, t.to, reason)
        }
        _ => println!("  {} -> {}", t.from, t.to),
    }
}

/// Print transitions until the attempt lands in CONFIRMED or FAILED
async fn follow_until_terminal(feed: &mut broadcast::Receiver<Transition>) -> Result<()> {
    loop {
        match feed.recv().await {
            Ok(t) => {
                print_transition(&t);
                if t.to.is_terminal() {
                    return Ok(());
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Transition feed lagged"),
            Err(RecvError::Closed) => bail!("transition feed closed"),
        }
    }
}

async fn run_transfer(config: &AppConfig, args: &[String]) -> Result<()> {
    let request = parse_request(args)?;
    let retries: u32 = get_arg(args, &["--retries"])
        .map(|r| r.parse::<u32>())
        .transpose()
        .context("--retries must be a number")?
        .unwrap_or(0);

    let orchestrator = TransactionOrchestrator::from_config(&config.orchestrator)?;
    let mut feed = orchestrator.subscribe_transitions();

    orchestrator.submit(request).await;
    follow_until_terminal(&mut feed).await?;

    for attempt in 1..=retries {
        if !orchestrator.can_retry() {
            break;
        }
        info!(attempt, retries, "Retrying transfer");
        orchestrator.retry_transaction().await;
        follow_until_terminal(&mut feed).await?;
    }

    match orchestrator.state() {
        TransactionState::Confirmed { transaction_id, .. } => {
            println!("✅ Transfer confirmed: {}", transaction_id);
            Ok(())
        }
        state => bail!(
            "transfer ended in {}: {}",
            state,
            state.error().unwrap_or("unknown error")
        ),
    }
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let env = get_env(&args);

    let config = AppConfig::load(&env).with_context(|| format!("loading config for '{}'", env))?;
    let _guard = bridge_orchestrator::logging::init_logging(&config);

    info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        "Bridge orchestrator starting"
    );

    match args.get(1).map(String::as_str) {
        Some("serve") => run_serve(&config).await,
        Some("transfer") => run_transfer(&config, &args).await,
        _ => bail!("usage: bridge-orchestrator <serve|transfer> [options]"),
    }
}
