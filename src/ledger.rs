//! Append-only ledger output with duplicate-guarded writes.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::WriteError;

/// A single balance assertion destined for the ledger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub date: NaiveDate,
    pub account: String,
    pub amount: Decimal,
    pub currency: String,
    /// Fixed display precision; `None` prints the amount's natural form.
    pub precision: Option<u32>,
}

/// Outcome of a duplicate-guarded append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    Written,
    Skipped,
}

impl LedgerRecord {
    /// Render the assertion line, without a trailing newline.
    pub fn to_line(&self) -> String {
        let amount = match self.precision {
            Some(places) => format!("{:.prec$}", self.amount, prec = places as usize),
            None => self.amount.to_string(),
        };
        format!(
            "{} balance {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.account,
            amount,
            self.currency
        )
    }
}

/// Append `record` unless an assertion for the same (date, account, currency)
/// already exists in the file. Re-running a day is therefore a no-op.
pub fn append_if_new(path: &Path, record: &LedgerRecord) -> Result<Appended, WriteError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(WriteError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let duplicate = existing
        .lines()
        .filter_map(assertion_key)
        .any(|(date, account, currency)| {
            date == record.date && account == record.account && currency == record.currency
        });
    if duplicate {
        debug!(account = %record.account, date = %record.date, "assertion already present, skipping");
        return Ok(Appended::Skipped);
    }

    let append = |source| WriteError::Append {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(append)?;
    writeln!(file, "{}", record.to_line()).map_err(append)?;
    Ok(Appended::Written)
}

/// Duplicate-detection key of a ledger line, if it is a balance assertion.
fn assertion_key(line: &str) -> Option<(NaiveDate, &str, &str)> {
    let mut parts = line.split_whitespace();
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y-%m-%d").ok()?;
    if parts.next()? != "balance" {
        return None;
    }
    let account = parts.next()?;
    let _amount = parts.next()?;
    let currency = parts.next()?;
    Some((date, account, currency))
}
