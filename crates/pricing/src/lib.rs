//! Pricing heatmap for the Roomberg pipeline.
//!
//! This crate handles:
//! - Currency conversion against a reference-currency rate table
//! - Price cell normalization (margin ratio or status)
//! - Grid-wide status stats
//! - The pricing heatmap pipeline (extract -> columns, rows, stats)

pub mod currency;
pub mod engine;
pub mod normalizer;
pub mod stats;

pub use currency::CurrencyConverter;
pub use engine::PricingHeatmap;
pub use normalizer::PriceNormalizer;
pub use stats::PricingStats;
