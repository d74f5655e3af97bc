//! Availability heatmap for the Roomberg pipeline.
//!
//! This crate provides:
//! - Search criteria from query parameters
//! - Stay-window planning from the start date
//! - Per-hotel window minimums and coverage
//! - Grid-wide availability metrics
//! - The availability heatmap pipeline (extract -> columns, rows, stats)

pub mod criteria;
pub mod grid;
pub mod metrics;
pub mod pipeline;
pub mod window;

pub use criteria::CriteriaQuery;
pub use grid::{HotelWindows, NightlyCounts};
pub use metrics::AvailabilityMetrics;
pub use pipeline::AvailabilityHeatmap;
pub use window::WindowPlan;
