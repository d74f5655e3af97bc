//! Grid-wide availability metrics.

use roomberg_core::AvailabilityStats;
use statrs::statistics::Statistics;

use crate::grid::HotelWindows;

/// Accumulates window values across hotels.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityMetrics {
    values: Vec<f64>,
    available: usize,
    missing: usize,
    cells: usize,
}

impl AvailabilityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hotel's windows.
    pub fn add_hotel(&mut self, hotel: &HotelWindows) {
        self.values.extend(hotel.present().map(|rooms| rooms as f64));
        self.available += hotel.available;
        self.missing += hotel.missing;
        self.cells += hotel.values.len();
    }

    /// Final stats. Averages and ratios are 0 when there is nothing to divide by.
    pub fn calculate(&self) -> AvailabilityStats {
        let (avg_rooms, max_rooms) = if self.values.is_empty() {
            (0.0, 0)
        } else {
            let max = Statistics::max(self.values.iter());
            (Statistics::mean(self.values.iter()), (max as i64).max(0))
        };

        AvailabilityStats {
            avg_rooms,
            max_rooms,
            available_ratio: ratio(self.available, self.cells),
            missing_ratio: ratio(self.missing, self.cells),
        }
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total > 0 {
        count as f64 / total as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn hotel(values: &[Option<i64>], rooms_required: i64) -> HotelWindows {
        let available = values
            .iter()
            .filter(|v| v.is_some_and(|rooms| rooms >= rooms_required))
            .count();
        let missing = values.iter().filter(|v| v.is_none()).count();
        HotelWindows {
            values: values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("2024-01-{:02}", i + 1), *v))
                .collect::<BTreeMap<_, _>>(),
            available,
            missing,
            coverage: available as f64 / values.len() as f64,
        }
    }

    #[test]
    fn test_empty_metrics() {
        let stats = AvailabilityMetrics::new().calculate();
        assert_eq!(stats, AvailabilityStats::default());
    }

    #[test]
    fn test_grid_metrics() {
        let mut metrics = AvailabilityMetrics::new();
        metrics.add_hotel(&hotel(&[Some(12), None, Some(4)], 10));
        metrics.add_hotel(&hotel(&[Some(20), Some(0), None], 10));

        let stats = metrics.calculate();
        assert_relative_eq!(stats.avg_rooms, 9.0);
        assert_eq!(stats.max_rooms, 20);
        assert_relative_eq!(stats.available_ratio, 2.0 / 6.0);
        assert_relative_eq!(stats.missing_ratio, 2.0 / 6.0);
    }

    #[test]
    fn test_all_missing() {
        let mut metrics = AvailabilityMetrics::new();
        metrics.add_hotel(&hotel(&[None, None], 10));
        let stats = metrics.calculate();
        assert_eq!(stats.avg_rooms, 0.0);
        assert_eq!(stats.max_rooms, 0);
        assert_eq!(stats.missing_ratio, 1.0);
    }

    #[test]
    fn test_max_floored_at_zero() {
        let mut metrics = AvailabilityMetrics::new();
        metrics.add_hotel(&hotel(&[Some(-3), Some(-1)], 10));
        let stats = metrics.calculate();
        assert_eq!(stats.max_rooms, 0);
        assert_relative_eq!(stats.avg_rooms, -2.0);
    }
}
