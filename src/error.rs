use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems. Fatal: the run aborts before any ledger write.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Validation failure naming the offending entry.
    #[error("entry {index} ({account}): {reason}")]
    Entry {
        index: usize,
        account: String,
        reason: String,
    },
}

/// Per-entry resolution failures. Recoverable: the entry is skipped and the
/// run continues with the remaining entries.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("unknown chain '{0}'")]
    UnknownChain(String),

    #[error("no balance fetcher for token {token} on {chain}")]
    UnsupportedToken { token: String, chain: String },

    #[error("no RPC endpoint configured for {chain}")]
    MissingEndpoint { chain: String },

    #[error("invalid address '{0}': expected 40 hex chars")]
    InvalidAddress(String),

    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error: {message}")]
    Rpc { message: String },

    #[error("malformed RPC response: {reason}")]
    MalformedResponse { reason: String },

    #[error("balance {raw} does not fit the supported decimal range")]
    AmountOutOfRange { raw: String },
}

/// Ledger file problems. Fatal: the run stops at the first failed write.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to ledger {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
