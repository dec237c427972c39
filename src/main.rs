//! Generate ledger balance assertions for entries due today.
//!
//! Usage:
//!   autobalance --config config.toml
//!   autobalance --config config.toml --date 2024-03-05 --date 2024-03-06
//!
//! Environment Variables:
//!   BSC_ENDPOINT / ETH_ENDPOINT - override the configured RPC endpoints

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use autobalance::healthcheck::HealthcheckNotifier;
use autobalance::{process_due_entries, BalanceResolver, Config};

#[derive(Parser, Debug)]
#[command(name = "autobalance")]
#[command(about = "Generate balance assertions for matching config entries")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the beancount output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// ISO date (YYYY-MM-DD) to process instead of today; repeatable
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    dates: Vec<NaiveDate>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_tracing(&args.log_level);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let config = Config::load(&args.config)?;
    let healthcheck = HealthcheckNotifier::new(config.healthcheck_url.as_deref());

    if config.entries.is_empty() {
        info!("no balance entries configured; nothing to do");
        healthcheck.notify_success().await;
        return Ok(true);
    }

    let ledger_path = args
        .output
        .unwrap_or_else(|| config.beancount_output.clone());
    let dates = if args.dates.is_empty() {
        vec![Local::now().date_naive()]
    } else {
        args.dates
    };

    let resolver = BalanceResolver::default();
    let outcome = match process_due_entries(&config, &resolver, &ledger_path, &dates).await {
        Ok(outcome) => outcome,
        Err(err) => {
            healthcheck.notify_failure().await;
            return Err(err.into());
        }
    };

    for (account, err) in &outcome.errors {
        error!(account = %account, error = %err, "failed fetching balance");
    }
    if outcome.written.is_empty() {
        info!(skipped = outcome.skipped, "no balance assertions written");
    } else {
        info!(
            count = outcome.written.len(),
            ledger = %ledger_path.display(),
            "wrote balance assertions"
        );
    }

    if outcome.is_clean() {
        healthcheck.notify_success().await;
    } else {
        healthcheck.notify_failure().await;
    }
    Ok(outcome.is_clean())
}

fn init_tracing(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
