//! Grid-wide pricing stats.

use roomberg_core::{CellCategory, NormalizedCell, StatsEntry};

/// Cell counts by stats bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingStats {
    /// All cells seen.
    pub total: usize,
    /// `Error` and `PriceValueError`.
    pub errors: usize,
    /// `NoMarketPrice` and `NoMarketRateZero`.
    pub no_market: usize,
    /// `NA`.
    pub no_rate: usize,
    /// Margin cells.
    pub margins: usize,
}

impl PricingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one cell.
    pub fn add(&mut self, cell: &NormalizedCell) {
        self.total += 1;
        match cell.category() {
            CellCategory::Rate => self.margins += 1,
            CellCategory::NoMarket => self.no_market += 1,
            CellCategory::NoRate => self.no_rate += 1,
            CellCategory::Error => self.errors += 1,
        }
    }

    /// Count a sequence of cells.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a NormalizedCell>) -> Self {
        let mut stats = Self::new();
        for cell in cells {
            stats.add(cell);
        }
        stats
    }

    /// Cells with a rate: margins plus market-less rates.
    #[inline]
    pub fn has_rate(&self) -> usize {
        self.margins + self.no_market
    }

    /// Entries in display order: error, no market, no rate, has rate.
    pub fn entries(&self) -> Vec<StatsEntry> {
        vec![
            StatsEntry::new("error", self.errors, self.total),
            StatsEntry::new("no market", self.no_market, self.total),
            StatsEntry::new("no rate", self.no_rate, self.total),
            StatsEntry::new("has rate", self.has_rate(), self.total),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bucket_counts() {
        let cells = [
            NormalizedCell::margin(-0.1),
            NormalizedCell::margin(0.2),
            NormalizedCell::NoMarketPrice,
            NormalizedCell::NoMarketRateZero,
            NormalizedCell::NA,
            NormalizedCell::Error,
            NormalizedCell::PriceValueError,
            NormalizedCell::NA,
        ];
        let stats = PricingStats::from_cells(&cells);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.no_market, 2);
        assert_eq!(stats.no_rate, 2);
        assert_eq!(stats.margins, 2);
        assert_eq!(stats.has_rate(), 4);

        let entries = stats.entries();
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["error", "no market", "no rate", "has rate"]);
        assert_relative_eq!(entries[0].ratio, 0.25);
        assert_relative_eq!(entries[3].ratio, 0.5);
    }

    #[test]
    fn test_empty_grid_ratios_are_zero() {
        let entries = PricingStats::new().entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.count == 0 && e.ratio == 0.0));
    }
}
