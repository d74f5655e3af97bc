//! Price cell normalization.
//!
//! A raw price cell is one of: empty, a status phrase from the scraper
//! ("no rates found", "No market rate"), or a dictionary literal with the
//! market price and the Kuoni net price. Normalization maps every cell onto
//! a [`NormalizedCell`] and never fails: unreadable cells become
//! `Error`/`PriceValueError`.

use roomberg_core::config::PricingConfig;
use roomberg_core::NormalizedCell;
use roomberg_ingestion::literal::parse_mapping;
use serde_json::{Map, Value};

use crate::currency::CurrencyConverter;

const MARKET_AMOUNT_KEYS: [&str; 2] = ["Market", "market"];
const MARKET_CURRENCY_KEYS: [&str; 2] = ["MarketCurrency", "market_currency"];
const NET_AMOUNT_KEYS: [&str; 2] = ["Kuoni", "kuoni"];
const NET_CURRENCY_KEYS: [&str; 2] = ["KuoniCurrency", "kuoni_currency"];

/// Prices pulled out of a price mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuote {
    pub market: Option<f64>,
    pub market_currency: Option<String>,
    pub net: Option<f64>,
    pub net_currency: Option<String>,
}

impl PriceQuote {
    /// Read the quote fields from a parsed mapping.
    pub fn from_mapping(map: &Map<String, Value>) -> Self {
        Self {
            market: lookup(map, &MARKET_AMOUNT_KEYS).and_then(coerce_amount),
            market_currency: lookup(map, &MARKET_CURRENCY_KEYS).and_then(coerce_currency),
            net: lookup(map, &NET_AMOUNT_KEYS).and_then(coerce_amount),
            net_currency: lookup(map, &NET_CURRENCY_KEYS).and_then(coerce_currency),
        }
    }
}

/// Turns raw price cells into normalized cells.
#[derive(Debug, Clone)]
pub struct PriceNormalizer {
    converter: CurrencyConverter,
    /// `1 + total extras / 100`, applied to the net price.
    extras_multiplier: f64,
    strict_currency: bool,
}

impl PriceNormalizer {
    /// Create a normalizer from pricing configuration.
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            converter: CurrencyConverter::new(config.rates.clone()),
            extras_multiplier: 1.0 + config.total_extras_pct() / 100.0,
            strict_currency: config.strict_currency,
        }
    }

    /// Normalize one raw cell.
    pub fn normalize(&self, raw: Option<&str>) -> NormalizedCell {
        let text = raw.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return NormalizedCell::NA;
        }

        let lower = text.to_lowercase();
        if lower == "no rates" || lower == "no rates found" {
            return NormalizedCell::NA;
        }
        if lower.contains("no market") {
            return NormalizedCell::NoMarketPrice;
        }

        match parse_mapping(text) {
            Ok(map) => self.price_margin(&PriceQuote::from_mapping(&map)),
            Err(_) if text.starts_with('{') => NormalizedCell::PriceValueError,
            Err(_) => NormalizedCell::Error,
        }
    }

    /// Margin of the net price (plus extras) against the market price.
    pub fn price_margin(&self, quote: &PriceQuote) -> NormalizedCell {
        if quote.market == Some(0.0) {
            return NormalizedCell::NoMarketRateZero;
        }
        let (Some(market), Some(net)) = (quote.market, quote.net) else {
            return NormalizedCell::Error;
        };

        let net = match (&quote.net_currency, &quote.market_currency) {
            (Some(from), Some(to)) if !from.eq_ignore_ascii_case(to) => {
                if self.strict_currency {
                    match self.converter.try_convert(net, from, to) {
                        Ok(converted) => converted,
                        Err(_) => return NormalizedCell::Error,
                    }
                } else {
                    self.converter
                        .convert(Some(net), Some(from), Some(to))
                        .unwrap_or(net)
                }
            }
            _ => net,
        };

        let gross_net = net * self.extras_multiplier;
        let margin = -(1.0 - gross_net / market);
        if margin.is_finite() {
            NormalizedCell::margin(margin)
        } else {
            NormalizedCell::Error
        }
    }
}

impl Default for PriceNormalizer {
    fn default() -> Self {
        Self::new(&PricingConfig::default())
    }
}

/// First non-null value under any of the keys.
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
}

fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|a| a.is_finite())
}

fn coerce_currency(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}
