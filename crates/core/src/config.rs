//! Configuration structures for the Roomberg heatmap pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration for the heatmap pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Margin extras and currency conversion.
    pub pricing: PricingConfig,
    /// Availability search defaults.
    pub availability: AvailabilityDefaults,
    /// Where extracts live.
    pub sources: SourceConfig,
}

impl Config {
    /// Parse a JSON configuration; missing sections and fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.pricing.validate()?;
        self.availability.validate()?;
        Ok(())
    }
}

/// Pricing configuration: extras applied to the net price and the rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Commission percentage (e.g., 5.0 for 5%).
    pub commission_pct: f64,
    /// Card fee percentage.
    pub card_fee_pct: f64,
    /// Tax percentage levied on the commission.
    pub tax_pct: f64,
    /// Mark cells with an unknown currency as errors instead of skipping conversion.
    pub strict_currency: bool,
    /// Currency rates.
    pub rates: CurrencyRateTable,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            commission_pct: 5.0,
            card_fee_pct: 2.5,
            tax_pct: 20.0,
            strict_currency: false,
            rates: CurrencyRateTable::default(),
        }
    }
}

impl PricingConfig {
    /// Total extras percentage added on top of the net price.
    ///
    /// Tax is charged on the commission, so with 5% commission, 20% tax and
    /// a 2.5% card fee this is 5 * 0.2 + 5 + 2.5 = 8.5.
    pub fn total_extras_pct(&self) -> f64 {
        self.commission_pct * (self.tax_pct / 100.0) + self.commission_pct + self.card_fee_pct
    }

    fn validate(&self) -> Result<()> {
        let pcts = [
            ("commission_pct", self.commission_pct),
            ("card_fee_pct", self.card_fee_pct),
            ("tax_pct", self.tax_pct),
        ];
        for (name, value) in pcts {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config(format!("{name} must be a non-negative number")));
            }
        }
        self.rates.validate()
    }
}

/// Rates relative to a reference currency.
///
/// A rate is the number of units of the listed currency that one unit of the
/// reference currency buys, so `amount_in_reference = amount / rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyRateTable {
    /// Reference currency code (implicit rate 1).
    pub reference: String,
    /// Currency code -> rate.
    pub rates: BTreeMap<String, f64>,
}

impl Default for CurrencyRateTable {
    fn default() -> Self {
        let rates = [("GBP", 0.8819), ("USD", 1.0850), ("CHF", 0.9420), ("AED", 3.9850)]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect();
        Self {
            reference: "EUR".to_string(),
            rates,
        }
    }
}

impl CurrencyRateTable {
    /// Rate for a currency code (case-insensitive). The reference currency is always 1.
    pub fn rate(&self, code: &str) -> Option<f64> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(&self.reference) {
            return Some(1.0);
        }
        self.rates
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(code))
            .map(|(_, rate)| *rate)
    }

    fn validate(&self) -> Result<()> {
        if self.reference.trim().is_empty() {
            return Err(Error::config("reference currency must not be empty"));
        }
        match self.rates.iter().find(|(_, rate)| !rate.is_finite() || **rate <= 0.0) {
            Some((code, _)) => Err(Error::config(format!("rate for {code} must be positive"))),
            None => Ok(()),
        }
    }
}

/// Defaults for availability search criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityDefaults {
    /// Days between window starts.
    pub lead_jump_days: u32,
    /// Nights per window.
    pub stay_length_nights: u32,
    /// How far ahead window starts may go (days).
    pub lead_end_days: u32,
    /// Rooms needed for a window to count as available.
    pub rooms_required: u32,
}

impl Default for AvailabilityDefaults {
    fn default() -> Self {
        Self {
            lead_jump_days: 7,
            stay_length_nights: 3,
            lead_end_days: 365,
            rooms_required: 10,
        }
    }
}

impl AvailabilityDefaults {
    fn validate(&self) -> Result<()> {
        let values = [
            ("lead_jump_days", self.lead_jump_days),
            ("stay_length_nights", self.stay_length_nights),
            ("lead_end_days", self.lead_end_days),
            ("rooms_required", self.rooms_required),
        ];
        match values.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(Error::config(format!("{name} must be at least 1"))),
            None => Ok(()),
        }
    }
}

/// Extract locations, relative to the output root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding batch directories and loose extracts.
    pub output_dir: String,
    /// Pricing extract file name.
    pub pricing_extract: String,
    /// Availability extract file name.
    pub availability_extract: String,
    /// Hotel summary locations, tried in order.
    pub summary_candidates: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            output_dir: "output_sheets".to_string(),
            pricing_extract: "kuoni_pricing_heatmap.csv".to_string(),
            availability_extract: "bookings_search_availability.csv".to_string(),
            summary_candidates: vec![
                "kuoni_hotel_summary_with_kuoni.csv".to_string(),
                "reference_sheets/kuoni_hotel_summary_with_kuoni.csv".to_string(),
                "web/reference_sheets/kuoni_hotel_summary_with_kuoni.csv".to_string(),
                "reference_sheets/kuoni_hotel_summary.csv".to_string(),
                "web/reference_sheets/kuoni_hotel_summary.csv".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pricing.commission_pct, 5.0);
        assert_eq!(config.availability.rooms_required, 10);
        assert_eq!(config.sources.output_dir, "output_sheets");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_total_extras() {
        let pricing = PricingConfig::default();
        assert_relative_eq!(pricing.total_extras_pct(), 8.5);
    }

    #[test]
    fn test_rate_lookup() {
        let table = CurrencyRateTable::default();
        assert_eq!(table.rate("eur"), Some(1.0));
        assert_eq!(table.rate("gbp"), Some(0.8819));
        assert_eq!(table.rate("XXX"), None);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = Config::from_json_str(r#"{"pricing": {"commission_pct": 10.0}}"#).unwrap();
        assert_eq!(config.pricing.commission_pct, 10.0);
        assert_eq!(config.pricing.card_fee_pct, 2.5);
        assert_eq!(config.pricing.rates.reference, "EUR");
        assert_eq!(config.availability, AvailabilityDefaults::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_rooms = r#"{"availability": {"rooms_required": 0}}"#;
        assert!(matches!(Config::from_json_str(zero_rooms), Err(Error::Config(_))));

        let bad_rate = r#"{"pricing": {"rates": {"reference": "EUR", "rates": {"GBP": 0.0}}}}"#;
        assert!(matches!(Config::from_json_str(bad_rate), Err(Error::Config(_))));

        assert!(matches!(Config::from_json_str("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sources": {{"output_dir": "sheets"}}}}"#).unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.sources.output_dir, "sheets");
        assert_eq!(config.sources.availability_extract, "bookings_search_availability.csv");

        let missing = Config::from_json_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
