//! One-shot token balance fetch over the configured RPC endpoints.
//!
//! Usage:
//!   fetch_balance BNB bsc 0xb794f5ea0ba39494ce839613fffba74279579268
//!   fetch_balance USDT ethereum 0x... --json
//!
//! Endpoint precedence: --endpoint, then BSC_ENDPOINT / ETH_ENDPOINT, then
//! the config file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::json;

use autobalance::config::endpoint_env_var;
use autobalance::{BalanceResolver, Chain, Config};

#[derive(Parser, Debug)]
#[command(name = "fetch_balance")]
#[command(about = "Fetch a token balance via the configured RPC endpoints")]
struct Args {
    /// Token symbol (e.g. BNB, USDT)
    token: String,

    /// Chain identifier (e.g. bsc, ethereum)
    chain: String,

    /// Wallet address (0x...) to query
    address: String,

    /// Explicit RPC endpoint URL (overrides config and environment)
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to TOML configuration file with endpoint defaults
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let chain = Chain::parse(&args.chain)?;
    let endpoint = resolve_endpoint(args, chain)?;

    let resolver = BalanceResolver::new(Duration::from_secs(args.timeout));
    let balance = resolver
        .resolve(&args.token, chain, &args.address, &endpoint)
        .await?;

    if args.json {
        println!(
            "{}",
            json!({
                "token": args.token,
                "chain": args.chain,
                "address": args.address,
                "balance": balance.to_string(),
            })
        );
    } else {
        println!("Token: {}", args.token);
        println!("Chain: {}", args.chain);
        println!("Address: {}", args.address);
        println!("Balance: {balance}");
    }
    Ok(())
}

/// --endpoint beats the environment, which beats the config file.
fn resolve_endpoint(args: &Args, chain: Chain) -> anyhow::Result<String> {
    if let Some(endpoint) = &args.endpoint {
        return Ok(endpoint.clone());
    }
    if args.config.exists() {
        // Config::load folds the environment overrides in.
        let config = Config::load(&args.config)?;
        if let Some(endpoint) = config.endpoints().for_chain(chain) {
            return Ok(endpoint.to_string());
        }
    } else if let Ok(endpoint) = std::env::var(endpoint_env_var(chain)) {
        if !endpoint.trim().is_empty() {
            return Ok(endpoint);
        }
    }
    anyhow::bail!(
        "no RPC endpoint for {chain}: pass --endpoint, set {}, or add it to {}",
        endpoint_env_var(chain),
        args.config.display()
    )
}
