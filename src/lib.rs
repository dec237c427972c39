//! Scheduled beancount balance assertions.
//!
//! Reads a TOML list of tracked accounts, decides which are due on a given
//! day, resolves live balances over chain JSON-RPC where configured, and
//! appends duplicate-guarded balance assertions to the ledger file.

pub mod config;
pub mod error;
pub mod healthcheck;
pub mod ledger;
pub mod pipeline;
pub mod resolver;
pub mod schedule;

pub use config::{BalanceEntry, Config, Endpoints};
pub use error::{ConfigError, ResolutionError, WriteError};
pub use ledger::{Appended, LedgerRecord};
pub use pipeline::{process_due_entries, RunOutcome};
pub use resolver::{BalanceResolver, Chain};
pub use schedule::ScheduleDay;
