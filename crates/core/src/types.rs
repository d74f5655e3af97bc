//! Core data types for the Roomberg heatmap pipeline.

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::calendar::{format_iso_date, week_label};

/// Signed margin ratio with ordering support.
pub type Ratio = OrderedFloat<f64>;

/// One data row of an extract: header name -> raw field, in header order.
pub type RawRow = Vec<(String, String)>;

/// Look up a field of a raw row by header name.
pub fn field<'a>(row: &'a RawRow, header: &str) -> Option<&'a str> {
    row.iter()
        .find(|(name, _)| name == header)
        .map(|(_, value)| value.as_str())
}

/// A price cell after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedCell {
    /// Net price vs. market price: negative is cheaper than market.
    Margin(Ratio),
    /// No rate for this hotel/date.
    NA,
    /// The source reported no market price.
    NoMarketPrice,
    /// Market price present but exactly zero.
    NoMarketRateZero,
    /// Cell could not be interpreted.
    Error,
    /// Cell looked like a price mapping but could not be read.
    PriceValueError,
}

/// Stats bucket a cell is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCategory {
    Rate,
    NoMarket,
    NoRate,
    Error,
}

impl NormalizedCell {
    /// Create a margin cell.
    #[inline]
    pub fn margin(ratio: f64) -> Self {
        NormalizedCell::Margin(OrderedFloat(ratio))
    }

    /// Get the margin ratio, if this is a margin cell.
    #[inline]
    pub fn as_margin(&self) -> Option<f64> {
        match self {
            NormalizedCell::Margin(ratio) => Some(ratio.into_inner()),
            _ => None,
        }
    }

    /// Display text for status cells.
    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            NormalizedCell::Margin(_) => None,
            NormalizedCell::NA => Some("NA"),
            NormalizedCell::NoMarketPrice => Some("No market price"),
            NormalizedCell::NoMarketRateZero => Some("No market rate 0"),
            NormalizedCell::Error => Some("Error"),
            NormalizedCell::PriceValueError => Some("Price value error"),
        }
    }

    pub fn category(&self) -> CellCategory {
        match self {
            NormalizedCell::Margin(_) => CellCategory::Rate,
            NormalizedCell::NoMarketPrice | NormalizedCell::NoMarketRateZero => {
                CellCategory::NoMarket
            }
            NormalizedCell::NA => CellCategory::NoRate,
            NormalizedCell::Error | NormalizedCell::PriceValueError => CellCategory::Error,
        }
    }

    /// Whether the cell counts towards `has rate` (a margin or a market-less rate).
    #[inline]
    pub fn has_rate(&self) -> bool {
        matches!(self.category(), CellCategory::Rate | CellCategory::NoMarket)
    }
}

impl Serialize for NormalizedCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match (self.as_margin(), self.status_text()) {
            (Some(ratio), _) => serializer.serialize_f64(ratio),
            (None, Some(text)) => serializer.serialize_str(text),
            (None, None) => serializer.serialize_none(),
        }
    }
}

/// A reporting column: date key plus its week label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapColumn {
    /// ISO date key.
    pub key: String,
    /// Week label, e.g. "W 07".
    pub label: String,
    /// Same ISO date as the key.
    pub date: String,
}

impl HeatmapColumn {
    /// Build a column for an ISO date key.
    pub fn for_date(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: week_label(&key),
            date: key.clone(),
            key,
        }
    }
}

/// A pricing heatmap row (one hotel).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRow {
    pub hmid: String,
    /// Kuoni id from the hotel summary (empty when unknown).
    pub kuoni_id: String,
    pub city: String,
    /// Share of columns with a rate (margin or no-market).
    pub coverage: f64,
    /// Column key -> normalized cell.
    pub values: BTreeMap<String, NormalizedCell>,
}

/// An availability heatmap row (one hotel).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRow {
    pub hotel_id: String,
    /// HMID from the hotel summary (empty when unknown).
    pub hmid: String,
    pub city: String,
    /// Share of windows meeting the rooms requirement.
    pub coverage: f64,
    /// Window start date -> minimum rooms over the stay, `None` when any night is missing.
    pub values: BTreeMap<String, Option<i64>>,
}

/// A labelled count with its share of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsEntry {
    pub label: String,
    pub count: usize,
    pub ratio: f64,
}

impl StatsEntry {
    /// Create an entry; ratio is 0 when total is 0.
    pub fn new(label: impl Into<String>, count: usize, total: usize) -> Self {
        let ratio = if total > 0 {
            count as f64 / total as f64
        } else {
            0.0
        };
        Self {
            label: label.into(),
            count,
            ratio,
        }
    }
}

/// Grid-wide availability stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityStats {
    /// Mean of all non-missing window values.
    pub avg_rooms: f64,
    /// Largest non-missing window value (0 when none).
    pub max_rooms: i64,
    /// Available windows / all windows.
    pub available_ratio: f64,
    /// Missing windows / all windows.
    pub missing_ratio: f64,
}

/// Availability search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCriteria {
    /// First window start.
    pub start_date: NaiveDate,
    /// Days between window starts.
    pub lead_jump_days: u32,
    /// Nights per window.
    pub stay_length_nights: u32,
    /// Last allowed window offset from the start, inclusive.
    pub lead_end_days: u32,
    /// Minimum rooms for a window to count as available.
    pub rooms_required: u32,
}

impl AvailabilityCriteria {
    /// One-line summary echoed back for display.
    pub fn search_summary(&self) -> String {
        [
            format!("Start: {}", format_iso_date(self.start_date)),
            format!("Jump: {}d", self.lead_jump_days),
            format!("Stay: {}n", self.stay_length_nights),
            format!("End: {}d", self.lead_end_days),
            format!("Rooms: {}+", self.rooms_required),
        ]
        .join(" | ")
    }
}

/// Pricing heatmap output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingHeatmapResult {
    /// Batch name or extract file stem.
    pub source_label: String,
    /// Extract path relative to the output root (empty when no extract).
    pub source_path: String,
    /// Summary of what the extract covers.
    pub search_params: String,
    pub columns: Vec<HeatmapColumn>,
    pub rows: Vec<PricingRow>,
    pub stats: Vec<StatsEntry>,
}

impl PricingHeatmapResult {
    /// A result with no data.
    pub fn empty(source_label: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            source_path: source_path.into(),
            search_params: "n/a".to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            stats: Vec::new(),
        }
    }

    /// Whether the result carries no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Availability heatmap output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityHeatmapResult {
    pub source_label: String,
    pub source_path: String,
    pub search_params: String,
    pub criteria: AvailabilityCriteria,
    pub columns: Vec<HeatmapColumn>,
    pub rows: Vec<AvailabilityRow>,
    pub stats: AvailabilityStats,
    /// Same as `stats.max_rooms`; the table colour scale reads it directly.
    pub max_rooms: i64,
}

impl AvailabilityHeatmapResult {
    /// A result with no data for the given criteria.
    pub fn empty(
        source_label: impl Into<String>,
        source_path: impl Into<String>,
        criteria: AvailabilityCriteria,
    ) -> Self {
        Self {
            source_label: source_label.into(),
            source_path: source_path.into(),
            search_params: criteria.search_summary(),
            criteria,
            columns: Vec::new(),
            rows: Vec::new(),
            stats: AvailabilityStats::default(),
            max_rooms: 0,
        }
    }

    /// Whether the result carries no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_serialization() {
        let cells = vec![
            NormalizedCell::margin(-0.25),
            NormalizedCell::NA,
            NormalizedCell::NoMarketPrice,
            NormalizedCell::PriceValueError,
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[-0.25,"NA","No market price","Price value error"]"#);
    }

    #[test]
    fn test_cell_categories() {
        assert_eq!(NormalizedCell::margin(0.1).category(), CellCategory::Rate);
        assert_eq!(NormalizedCell::NoMarketRateZero.category(), CellCategory::NoMarket);
        assert_eq!(NormalizedCell::NA.category(), CellCategory::NoRate);
        assert_eq!(NormalizedCell::PriceValueError.category(), CellCategory::Error);
        assert!(NormalizedCell::NoMarketPrice.has_rate());
        assert!(!NormalizedCell::Error.has_rate());
    }

    #[test]
    fn test_stats_entry_ratio() {
        let entry = StatsEntry::new("error", 3, 12);
        assert!((entry.ratio - 0.25).abs() < 1e-12);
        assert_eq!(StatsEntry::new("error", 0, 0).ratio, 0.0);
    }

    #[test]
    fn test_column_for_date() {
        let column = HeatmapColumn::for_date("2024-01-01");
        assert_eq!(column.key, "2024-01-01");
        assert_eq!(column.date, "2024-01-01");
        assert_eq!(column.label, "W 01");
    }

    #[test]
    fn test_search_summary() {
        let criteria = AvailabilityCriteria {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            lead_jump_days: 7,
            stay_length_nights: 3,
            lead_end_days: 365,
            rooms_required: 10,
        };
        assert_eq!(
            criteria.search_summary(),
            "Start: 2024-03-04 | Jump: 7d | Stay: 3n | End: 365d | Rooms: 10+"
        );
    }

    #[test]
    fn test_raw_row_field() {
        let row: RawRow = vec![
            ("hmid".to_string(), "H1".to_string()),
            ("price".to_string(), "NA".to_string()),
        ];
        assert_eq!(field(&row, "price"), Some("NA"));
        assert_eq!(field(&row, "city"), None);
    }
}
