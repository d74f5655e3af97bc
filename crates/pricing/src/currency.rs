//! Currency conversion through a reference currency.

use roomberg_core::config::CurrencyRateTable;
use roomberg_core::{Error, Result};
use tracing::debug;

/// Converts amounts between currencies listed in a rate table.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    table: CurrencyRateTable,
}

impl CurrencyConverter {
    /// Create a converter over a rate table.
    pub fn new(table: CurrencyRateTable) -> Self {
        Self { table }
    }

    /// Best-effort conversion.
    ///
    /// Returns `amount` unchanged when it or either code is absent, when the
    /// codes match, or when a code is not in the table.
    pub fn convert(&self, amount: Option<f64>, from: Option<&str>, to: Option<&str>) -> Option<f64> {
        let (Some(value), Some(from), Some(to)) = (amount, non_empty(from), non_empty(to)) else {
            return amount;
        };
        match self.try_convert(value, from, to) {
            Ok(converted) => Some(converted),
            Err(e) => {
                debug!(from, to, error = %e, "skipping currency conversion");
                amount
            }
        }
    }

    /// Strict conversion: unknown codes are an error.
    pub fn try_convert(&self, amount: f64, from: &str, to: &str) -> Result<f64> {
        let (from, to) = (from.trim(), to.trim());
        if from.eq_ignore_ascii_case(to) {
            return Ok(amount);
        }
        let from_rate = self
            .table
            .rate(from)
            .ok_or_else(|| Error::unknown_currency(from))?;
        let to_rate = self.table.rate(to).ok_or_else(|| Error::unknown_currency(to))?;

        Ok(amount / from_rate * to_rate)
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new(CurrencyRateTable::default())
    }
}

fn non_empty(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}
