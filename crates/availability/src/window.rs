//! Stay-window planning.
//!
//! A window starts every `lead_jump_days` from the start date, as long as the
//! offset stays within `lead_end_days`, and covers `stay_length_nights`
//! consecutive nights. Windows are produced on demand; the plan itself only
//! holds the start date, the step and the window count.

use chrono::NaiveDate;
use roomberg_core::calendar::{add_days, format_iso_date};
use roomberg_core::AvailabilityCriteria;

/// One stay window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayWindow {
    pub start: NaiveDate,
    /// Start date as an ISO key.
    pub key: String,
    /// ISO keys of every night in the stay, in order.
    pub nights: Vec<String>,
}

/// All windows for a set of criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    start: NaiveDate,
    jump: u32,
    stay_length_nights: u32,
    count: usize,
}

impl WindowPlan {
    /// Plan windows at offsets `0, jump, 2*jump, ...` up to and including `lead_end_days`.
    ///
    /// Offsets past the last representable calendar date are left out.
    pub fn new(criteria: &AvailabilityCriteria) -> Self {
        let jump = criteria.lead_jump_days.max(1);
        let days_left = NaiveDate::MAX
            .signed_duration_since(criteria.start_date)
            .num_days()
            .max(0);
        let last_offset = i64::from(criteria.lead_end_days).min(days_left);

        Self {
            start: criteria.start_date,
            jump,
            stay_length_nights: criteria.stay_length_nights,
            count: (last_offset / i64::from(jump)) as usize + 1,
        }
    }

    /// Windows in start order.
    pub fn windows(&self) -> impl Iterator<Item = StayWindow> + '_ {
        (0..self.count).map_while(move |index| {
            // index * jump <= lead_end_days, so this fits in u32.
            let offset = index as u32 * self.jump;
            let start = add_days(self.start, offset)?;
            let nights = (0..self.stay_length_nights)
                .map_while(|night| add_days(start, night).map(format_iso_date))
                .collect();
            Some(StayWindow {
                start,
                key: format_iso_date(start),
                nights,
            })
        })
    }

    /// Window start keys in order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.windows().map(|w| w.key)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
