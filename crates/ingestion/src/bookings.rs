//! Availability extract building from saved booking-search responses.
//!
//! The booking-search run stores one JSON object per line:
//! `{"hotel_id": "...", "response": {...}}`. This module turns those lines
//! into the availability extract (`hotel_id, coverage, <dates...>`) that the
//! availability heatmap reads.

use roomberg_core::Result;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::csv::{write_rows, Dialect};

/// Nightly room counts per hotel: hotel id -> ISO date -> rooms.
pub type HotelNightlyMap = BTreeMap<String, BTreeMap<String, i64>>;

/// Decode JSON lines, skipping blank and undecodable lines.
pub fn read_jsonl(text: &str) -> Vec<Value> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(line = index + 1, error = %e, "skipping undecodable search record");
                None
            }
        })
        .collect()
}

/// Nightly room counts from one booking-search response.
///
/// Counts come from each rate's `nightly` mapping and from each room's
/// `nightly` entries. When a date appears more than once the largest count
/// wins, so rooms offered under several rates are not added together.
pub fn extract_nightly_counts(response: &Value) -> BTreeMap<String, i64> {
    let mut nightly = BTreeMap::new();
    if !is_truthy(response.get("success")) {
        return nightly;
    }

    let mut update = |date: Option<&str>, count: Option<i64>| {
        if let (Some(date), Some(count)) = (date.filter(|d| !d.is_empty()), count) {
            nightly
                .entry(date.to_string())
                .and_modify(|current: &mut i64| *current = (*current).max(count))
                .or_insert(count);
        }
    };

    for hotel in array(response.get("hotels")) {
        for rate in array(hotel.get("rates")) {
            if let Some(Value::Object(rate_nightly)) = rate.get("nightly") {
                for (date, count) in rate_nightly {
                    update(Some(date.as_str()), coerce_int(count));
                }
            }
            for room in array(rate.get("rooms")) {
                for night in array(room.get("nightly")) {
                    update(
                        night.get("date").and_then(Value::as_str),
                        night.get("rooms").and_then(coerce_int),
                    );
                }
            }
        }
    }

    nightly
}

/// Build the per-hotel map from JSON-lines text. A repeated hotel id replaces the earlier entry.
pub fn build_hotel_map(text: &str) -> HotelNightlyMap {
    let mut hotels = HotelNightlyMap::new();
    for record in read_jsonl(text) {
        let hotel_id = match record.get("hotel_id") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        if hotel_id.is_empty() {
            debug!("skipping search record without hotel_id");
            continue;
        }
        let response = record.get("response").unwrap_or(&Value::Null);
        hotels.insert(hotel_id, extract_nightly_counts(response));
    }
    hotels
}

/// One hotel line of the availability extract.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRow {
    pub hotel_id: String,
    /// Share of extract dates with at least one room, rounded to 4 decimals.
    pub coverage: f64,
    pub counts: BTreeMap<String, i64>,
}

/// The availability extract: sorted date columns and one row per hotel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityExtract {
    pub dates: Vec<String>,
    pub rows: Vec<ExtractRow>,
}

impl AvailabilityExtract {
    /// Lay out the hotel map as an extract. Hotels and dates come out sorted.
    pub fn from_hotel_map(hotels: &HotelNightlyMap) -> Self {
        let dates: Vec<String> = hotels
            .values()
            .flat_map(|nightly| nightly.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = hotels
            .iter()
            .map(|(hotel_id, nightly)| {
                let available = dates
                    .iter()
                    .filter(|date| nightly.get(*date).is_some_and(|count| *count > 0))
                    .count();
                let coverage = if dates.is_empty() {
                    0.0
                } else {
                    (available as f64 / dates.len() as f64 * 10_000.0).round() / 10_000.0
                };
                ExtractRow {
                    hotel_id: hotel_id.clone(),
                    coverage,
                    counts: nightly.clone(),
                }
            })
            .collect();

        Self { dates, rows }
    }

    /// Convenience: JSON-lines text straight to an extract.
    pub fn from_jsonl(text: &str) -> Self {
        Self::from_hotel_map(&build_hotel_map(text))
    }

    /// Render as CSV text with a `hotel_id, coverage, <dates...>` header.
    pub fn to_csv(&self) -> Result<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);

        let mut header = vec!["hotel_id".to_string(), "coverage".to_string()];
        header.extend(self.dates.iter().cloned());
        lines.push(header);

        for row in &self.rows {
            let mut line = vec![row.hotel_id.clone(), format!("{:?}", row.coverage)];
            line.extend(self.dates.iter().map(|date| {
                row.counts
                    .get(date)
                    .map(|count| count.to_string())
                    .unwrap_or_default()
            }));
            lines.push(line);
        }

        write_rows(&lines, &Dialect::default())
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Null) | None => false,
    }
}

/// Integer room count from a JSON value; fractional numbers truncate.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
