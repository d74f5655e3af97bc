//! Per-hotel window evaluation.

use roomberg_core::RawRow;
use std::collections::{BTreeMap, HashMap};

use crate::window::{StayWindow, WindowPlan};

/// Rooms per night for one hotel, keyed by ISO date. Missing nights are absent.
pub type NightlyCounts = HashMap<String, i64>;

/// Parse one extract cell. Empty and non-numeric cells are missing; decimals truncate.
pub fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
    })
}

/// Nightly counts for the given date columns of an extract record.
pub fn nightly_counts(record: &RawRow, date_columns: &[String]) -> NightlyCounts {
    record
        .iter()
        .filter(|(name, _)| date_columns.contains(name))
        .filter_map(|(name, raw)| parse_count(raw).map(|count| (name.clone(), count)))
        .collect()
}

/// Fewest rooms over the window's nights; `None` when any night is missing.
pub fn window_minimum(counts: &NightlyCounts, window: &StayWindow) -> Option<i64> {
    window
        .nights
        .iter()
        .map(|night| counts.get(night).copied())
        .try_fold(None, |min: Option<i64>, count| {
            let count = count?;
            Some(Some(min.map_or(count, |m| m.min(count))))
        })
        .flatten()
}

/// One hotel's windows.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelWindows {
    /// Window start key -> minimum rooms.
    pub values: BTreeMap<String, Option<i64>>,
    /// Windows meeting the rooms requirement.
    pub available: usize,
    /// Windows with a missing night.
    pub missing: usize,
    /// `available / windows`, 0 with no windows.
    pub coverage: f64,
}

impl HotelWindows {
    /// Evaluate every planned window against the nightly counts.
    pub fn evaluate(counts: &NightlyCounts, plan: &WindowPlan, rooms_required: u32) -> Self {
        let mut values = BTreeMap::new();
        let mut available = 0;
        let mut missing = 0;

        for window in plan.windows() {
            let value = window_minimum(counts, &window);
            match value {
                Some(rooms) if rooms >= i64::from(rooms_required) => available += 1,
                Some(_) => {}
                None => missing += 1,
            }
            values.insert(window.key, value);
        }

        let coverage = if plan.is_empty() {
            0.0
        } else {
            available as f64 / plan.len() as f64
        };

        Self {
            values,
            available,
            missing,
            coverage,
        }
    }

    /// Non-missing window values in start order.
    pub fn present(&self) -> impl Iterator<Item = i64> + '_ {
        self.values.values().filter_map(|value| *value)
    }
}
