//! Live balance resolution over chain JSON-RPC endpoints.
//!
//! Each supported (token, chain) pair maps to a read strategy: native coins
//! go through `eth_getBalance`, contract tokens through `eth_call` with
//! balanceOf calldata. Raw quantities are scaled to human-readable units
//! using the token's decimal places.

mod rpc;

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ResolutionError;

/// Chains with a configured JSON-RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Bsc,
    Ethereum,
}

impl Chain {
    pub fn parse(value: &str) -> Result<Chain, ResolutionError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bsc" => Ok(Chain::Bsc),
            "ethereum" | "eth" => Ok(Chain::Ethereum),
            other => Err(ResolutionError::UnknownChain(other.to_string())),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Bsc => write!(f, "BSC"),
            Chain::Ethereum => write!(f, "Ethereum"),
        }
    }
}

/// Token contract addresses on BSC.
pub mod bsc_contracts {
    pub const USDT: &str = "0x55d398326f99059fF775485246999027B3197955";
    pub const USDC: &str = "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d";
}

/// Token contract addresses on Ethereum mainnet.
pub mod eth_contracts {
    pub const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
    pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
}

/// How a token balance is read on its chain.
#[derive(Debug, Clone, Copy)]
pub enum TokenSource {
    /// Native coin via eth_getBalance.
    Native { decimals: u32 },
    /// ERC-20 style contract via eth_call balanceOf.
    Contract {
        address: &'static str,
        decimals: u32,
    },
}

impl TokenSource {
    fn decimals(&self) -> u32 {
        match *self {
            TokenSource::Native { decimals } => decimals,
            TokenSource::Contract { decimals, .. } => decimals,
        }
    }
}

/// Read strategy for `token` on `chain`, if supported.
pub fn token_source(token: &str, chain: Chain) -> Option<TokenSource> {
    match (chain, token.trim().to_ascii_uppercase().as_str()) {
        (Chain::Bsc, "BNB") => Some(TokenSource::Native { decimals: 18 }),
        (Chain::Bsc, "USDT") => Some(TokenSource::Contract {
            address: bsc_contracts::USDT,
            decimals: 18,
        }),
        (Chain::Bsc, "USDC") => Some(TokenSource::Contract {
            address: bsc_contracts::USDC,
            decimals: 18,
        }),
        (Chain::Ethereum, "ETH") => Some(TokenSource::Native { decimals: 18 }),
        (Chain::Ethereum, "USDT") => Some(TokenSource::Contract {
            address: eth_contracts::USDT,
            decimals: 6,
        }),
        (Chain::Ethereum, "USDC") => Some(TokenSource::Contract {
            address: eth_contracts::USDC,
            decimals: 6,
        }),
        _ => None,
    }
}

/// Fetches and normalizes token balances. Stateless beyond the HTTP client;
/// endpoints are passed per call.
pub struct BalanceResolver {
    client: reqwest::Client,
}

impl BalanceResolver {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Fetch the balance of `address` for `token` on `chain` and scale it to
    /// human-readable token units.
    pub async fn resolve(
        &self,
        token: &str,
        chain: Chain,
        address: &str,
        endpoint: &str,
    ) -> Result<Decimal, ResolutionError> {
        let source = token_source(token, chain).ok_or_else(|| ResolutionError::UnsupportedToken {
            token: token.to_string(),
            chain: chain.to_string(),
        })?;
        let wallet = rpc::checked_address(address)?;

        let raw = match source {
            TokenSource::Native { .. } => {
                rpc::native_balance(&self.client, endpoint, &wallet).await?
            }
            TokenSource::Contract { address: contract, .. } => {
                rpc::token_balance(&self.client, endpoint, contract, &wallet).await?
            }
        };
        let amount = rpc::scale_units(&raw, source.decimals())?;
        debug!(token, %chain, %amount, "resolved balance");
        Ok(amount)
    }
}

impl Default for BalanceResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}
