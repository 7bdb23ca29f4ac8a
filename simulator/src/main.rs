//! Passbook Simulator
//!
//! Drives the ledger with seeded random workloads or named scenarios.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passbook_ledger::{EntryType, FileStore, LedgerConfig};

mod controller;
mod metrics;
mod scenario;

use controller::{SimulationConfig, SimulationController};
use scenario::Scenario;

/// Passbook Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "passbook-sim")]
#[command(about = "Passbook ledger workload simulator")]
struct Args {
    /// Number of accounts to operate on
    #[arg(short, long, default_value = "4")]
    accounts: usize,

    /// Number of random operations to issue
    #[arg(short, long, default_value = "1000")]
    operations: u64,

    /// Scenario to run instead of the random workload
    #[arg(short, long)]
    scenario: Option<String>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Data file (overrides PASSBOOK_DATA_FILE)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Restore the bank from the data file before running
    #[arg(long)]
    resume: bool,

    /// Save the bank to the data file after running
    #[arg(long)]
    save: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = LedgerConfig::from_env();
    if let Some(path) = &args.data_file {
        config.data_file = path.clone();
    }

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    if std::env::var_os("PASSBOOK_LOG_JSON").is_some() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    info!("Starting Passbook Simulator");
    info!(data_file = %config.data_file.display(), "Data file");

    let store = FileStore::from_config(&config);
    let mut controller =
        SimulationController::new(SimulationConfig::default(), args.seed).with_store(store);

    if args.resume {
        controller.resume()?;
    }

    if let Some(scenario_name) = &args.scenario {
        let scenario = Scenario::load(scenario_name)?;
        controller.run_scenario(&scenario)?;
        info!("Scenario {} passed", scenario.name);
    } else {
        controller.initialize(args.accounts)?;
        controller.run(args.operations)?;
    }

    if args.save || config.save_on_exit {
        controller.save()?;
    }

    let metrics = controller.metrics();
    let bank = controller.bank();

    if args.json {
        let accounts: Vec<_> = bank
            .accounts()
            .map(|a| {
                serde_json::json!({
                    "name": a.name(),
                    "balance": a.balance(),
                    "entries": a.history().len(),
                })
            })
            .collect();
        let report = serde_json::json!({
            "metrics": metrics,
            "accounts": accounts,
            "total_funds": bank.total_funds().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!("Simulation complete");
        info!("Total operations: {}", metrics.total_operations);
        info!("Successful: {}", metrics.successful_operations);
        info!("Rejected: {}", metrics.rejected_operations);
        for (code, count) in &metrics.rejections_by_code {
            info!("  {}: {}", code, count);
        }
        info!("Success rate: {:.1}%", metrics.success_rate() * 100.0);
        for account in bank.accounts() {
            let debits = account
                .history()
                .iter()
                .filter(|e| e.kind() == EntryType::Debit)
                .count();
            info!(
                account = %account.name(),
                balance = account.balance(),
                credits = account.history().len() - debits,
                debits,
                "Final balance"
            );
        }
        info!("Total funds: {}", bank.total_funds());
    }

    Ok(())
}
