//! Availability search criteria from query parameters.

use chrono::NaiveDate;
use roomberg_core::calendar::parse_iso_date;
use roomberg_core::config::AvailabilityDefaults;
use roomberg_core::AvailabilityCriteria;
use serde::Deserialize;

/// Raw query parameters, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CriteriaQuery {
    /// First window start, `YYYY-MM-DD`.
    pub start: Option<String>,
    /// Days between window starts.
    pub jump: Option<String>,
    /// Nights per window.
    pub nights: Option<String>,
    /// Last window offset, in days.
    pub end: Option<String>,
    /// Rooms required.
    pub rooms: Option<String>,
}

impl CriteriaQuery {
    /// Collect the known parameters from key/value pairs; later keys win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "start" => &mut query.start,
                "jump" => &mut query.jump,
                "nights" => &mut query.nights,
                "end" => &mut query.end,
                "rooms" => &mut query.rooms,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        query
    }

    /// Resolve into criteria, falling back to `defaults` and `today`.
    pub fn resolve(&self, defaults: &AvailabilityDefaults, today: NaiveDate) -> AvailabilityCriteria {
        AvailabilityCriteria {
            start_date: self
                .start
                .as_deref()
                .and_then(|s| parse_iso_date(s).ok())
                .unwrap_or(today),
            lead_jump_days: normalize_int(self.jump.as_deref(), defaults.lead_jump_days, 1),
            stay_length_nights: normalize_int(self.nights.as_deref(), defaults.stay_length_nights, 1),
            lead_end_days: normalize_int(self.end.as_deref(), defaults.lead_end_days, 1),
            rooms_required: normalize_int(self.rooms.as_deref(), defaults.rooms_required, 1),
        }
    }
}

/// Parse a decimal number and floor it; `fallback` when absent, non-finite or below `min`.
pub fn normalize_int(value: Option<&str>, fallback: u32, min: u32) -> u32 {
    let Some(parsed) = value.and_then(|v| v.trim().parse::<f64>().ok()) else {
        return fallback;
    };
    if !parsed.is_finite() {
        return fallback;
    }
    let floored = parsed.floor();
    if floored < f64::from(min) {
        return fallback;
    }
    floored.min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_normalize_int() {
        assert_eq!(normalize_int(None, 7, 1), 7);
        assert_eq!(normalize_int(Some("14"), 7, 1), 14);
        assert_eq!(normalize_int(Some(" 3.9 "), 7, 1), 3);
        assert_eq!(normalize_int(Some("1e1"), 7, 1), 10);
        assert_eq!(normalize_int(Some("0.5"), 7, 1), 7);
        assert_eq!(normalize_int(Some("-2"), 7, 1), 7);
        assert_eq!(normalize_int(Some(""), 7, 1), 7);
        assert_eq!(normalize_int(Some("abc"), 7, 1), 7);
        assert_eq!(normalize_int(Some("inf"), 7, 1), 7);
        assert_eq!(normalize_int(Some("NaN"), 7, 1), 7);
    }

    #[test]
    fn test_defaults_when_empty() {
        let criteria = CriteriaQuery::default().resolve(&AvailabilityDefaults::default(), today());
        assert_eq!(criteria.start_date, today());
        assert_eq!(criteria.lead_jump_days, 7);
        assert_eq!(criteria.stay_length_nights, 3);
        assert_eq!(criteria.lead_end_days, 365);
        assert_eq!(criteria.rooms_required, 10);
    }

    #[test]
    fn test_from_pairs() {
        let query = CriteriaQuery::from_pairs([
            ("start", "2024-06-01"),
            ("jump", "14"),
            ("nights", "2"),
            ("end", "60"),
            ("rooms", "5"),
            ("unrelated", "x"),
        ]);
        let criteria = query.resolve(&AvailabilityDefaults::default(), today());
        assert_eq!(criteria.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(
            criteria.search_summary(),
            "Start: 2024-06-01 | Jump: 14d | Stay: 2n | End: 60d | Rooms: 5+"
        );
    }

    #[test]
    fn test_bad_start_falls_back_to_today() {
        for start in ["2024-6-1", "2024-02-30", "tomorrow", " 2024-06-01"] {
            let query = CriteriaQuery::from_pairs([("start", start)]);
            let criteria = query.resolve(&AvailabilityDefaults::default(), today());
            assert_eq!(criteria.start_date, today(), "{start}");
        }
    }
}
