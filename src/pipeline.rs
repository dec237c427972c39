//! Run orchestration: filter due entries, resolve balances, write assertions.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::{BalanceEntry, Config, Endpoints, DEFAULT_PRECISION};
use crate::error::{ResolutionError, WriteError};
use crate::ledger::{self, Appended, LedgerRecord};
use crate::resolver::{BalanceResolver, Chain};
use crate::schedule::due_entries;

/// What a run produced: written records plus per-entry failures.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub written: Vec<LedgerRecord>,
    /// Assertions already present in the ledger (idempotent re-runs).
    pub skipped: usize,
    pub errors: Vec<(String, ResolutionError)>,
}

impl RunOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Process every entry due on the given dates.
///
/// All balances are resolved before the first write, so ledger order follows
/// config declaration order regardless of RPC timing. A failed resolution
/// skips that entry only; a failed write aborts the run.
pub async fn process_due_entries(
    config: &Config,
    resolver: &BalanceResolver,
    ledger_path: &Path,
    dates: &[NaiveDate],
) -> Result<RunOutcome, WriteError> {
    let endpoints = config.endpoints();
    let mut outcome = RunOutcome::default();

    for &date in dates {
        let due = due_entries(&config.entries, date);
        info!(%date, due = due.len(), "processing due entries");

        let mut resolved = Vec::with_capacity(due.len());
        for (_, entry) in due {
            match resolve_entry(resolver, &endpoints, entry, date).await {
                Ok(record) => resolved.push(record),
                Err(err) => {
                    warn!(account = %entry.account, error = %err, "balance resolution failed");
                    outcome.errors.push((entry.account.clone(), err));
                }
            }
        }

        for record in resolved {
            match ledger::append_if_new(ledger_path, &record)? {
                Appended::Written => {
                    info!(account = %record.account, amount = %record.amount, "wrote balance assertion");
                    outcome.written.push(record);
                }
                Appended::Skipped => outcome.skipped += 1,
            }
        }
    }

    Ok(outcome)
}

async fn resolve_entry(
    resolver: &BalanceResolver,
    endpoints: &Endpoints,
    entry: &BalanceEntry,
    date: NaiveDate,
) -> Result<LedgerRecord, ResolutionError> {
    let (amount, precision) = if let Some((chain_name, address)) = entry.live_source() {
        let chain = Chain::parse(chain_name)?;
        let endpoint = endpoints
            .for_chain(chain)
            .ok_or_else(|| ResolutionError::MissingEndpoint {
                chain: chain.to_string(),
            })?;
        let amount = resolver
            .resolve(&entry.currency, chain, address, endpoint)
            .await?;
        (amount, entry.precision)
    } else {
        // Exactly-one-source is enforced at config load.
        let amount = entry.static_amount.unwrap_or_default();
        (amount, Some(entry.precision.unwrap_or(DEFAULT_PRECISION)))
    };

    Ok(LedgerRecord {
        date,
        account: entry.account.clone(),
        amount,
        currency: entry.currency.clone(),
        precision,
    })
}
