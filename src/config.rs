//! TOML configuration for tracked accounts and chain endpoints.
//!
//! Endpoint values can be overridden through `BSC_ENDPOINT` / `ETH_ENDPOINT`
//! environment variables at load time; after loading, endpoints travel as an
//! explicit [`Endpoints`] value rather than process-global state.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::resolver::Chain;
use crate::schedule::ScheduleDay;

/// Display precision for static amounts without an explicit override.
pub const DEFAULT_PRECISION: u32 = 2;

/// Environment variable that overrides the endpoint for `chain`.
pub fn endpoint_env_var(chain: Chain) -> &'static str {
    match chain {
        Chain::Bsc => "BSC_ENDPOINT",
        Chain::Ethereum => "ETH_ENDPOINT",
    }
}

/// One tracked account with a recurrence schedule and a balance source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalanceEntry {
    pub account: String,
    /// Commodity of the assertion; falls back to `default_currency`.
    #[serde(default)]
    pub currency: String,
    pub schedule_day: ScheduleDay,
    /// Chain identifier for live lookup, paired with `address`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Fixed amount asserted when no live lookup is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_amount: Option<Decimal>,
    /// Display precision override for the written amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl BalanceEntry {
    /// Live-lookup parameters, when configured.
    pub fn live_source(&self) -> Option<(&str, &str)> {
        match (self.chain.as_deref(), self.address.as_deref()) {
            (Some(chain), Some(address)) => Some((chain, address)),
            _ => None,
        }
    }
}

/// RPC endpoints, passed explicitly into resolution calls.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    pub bsc: Option<String>,
    pub eth: Option<String>,
}

impl Endpoints {
    pub fn for_chain(&self, chain: Chain) -> Option<&str> {
        match chain {
            Chain::Bsc => self.bsc.as_deref(),
            Chain::Ethereum => self.eth.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Ledger file that assertions are appended to.
    #[serde(default = "default_output", alias = "ledger")]
    pub beancount_output: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bsc_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_endpoint: Option<String>,
    /// Monitoring ping target; `<url>` on success, `<url>/fail` on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck_url: Option<String>,
    #[serde(default)]
    pub entries: Vec<BalanceEntry>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("beancount_output")
}

impl Config {
    /// Load, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit environment lookup, so tests
    /// can run isolated from the real process environment.
    pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env_overrides(&lookup);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Endpoint set handed to the resolver.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            bsc: self.bsc_endpoint.clone(),
            eth: self.eth_endpoint.clone(),
        }
    }

    fn apply_env_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: &String| !value.trim().is_empty();
        if let Some(value) = lookup(endpoint_env_var(Chain::Bsc)).filter(non_empty) {
            self.bsc_endpoint = Some(value);
        }
        if let Some(value) = lookup(endpoint_env_var(Chain::Ethereum)).filter(non_empty) {
            self.eth_endpoint = Some(value);
        }
    }

    fn normalize(&mut self) {
        self.default_currency = self.default_currency.trim().to_uppercase();
        for entry in &mut self.entries {
            let currency = entry.currency.trim();
            entry.currency = if currency.is_empty() {
                self.default_currency.clone()
            } else {
                currency.to_uppercase()
            };
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, entry) in self.entries.iter().enumerate() {
            let fail = |reason: String| ConfigError::Entry {
                index,
                account: entry.account.clone(),
                reason,
            };

            if entry.account.trim().is_empty() {
                return Err(fail("missing account".to_string()));
            }
            if entry.currency.is_empty() {
                return Err(fail("missing currency and no default_currency".to_string()));
            }
            if let ScheduleDay::DayOfMonth(day) = entry.schedule_day {
                if !(1..=31).contains(&day) {
                    return Err(fail(format!("schedule_day {day} out of range 1-31")));
                }
            }
            if entry.chain.is_some() != entry.address.is_some() {
                return Err(fail("chain and address must be set together".to_string()));
            }
            match (entry.live_source(), entry.static_amount.is_some()) {
                (Some(_), true) => {
                    return Err(fail(
                        "both static_amount and chain/address set; pick one".to_string(),
                    ));
                }
                (None, false) => {
                    return Err(fail(
                        "no balance source: set static_amount or chain + address".to_string(),
                    ));
                }
                _ => {}
            }
            if let Some((chain, _)) = entry.live_source() {
                if let Err(err) = Chain::parse(chain) {
                    return Err(fail(err.to_string()));
                }
            }
        }
        Ok(())
    }
}
