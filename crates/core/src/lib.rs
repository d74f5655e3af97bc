//! Core types and configuration for the Roomberg heatmap pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Normalized heatmap cells, rows, columns and stats
//! - Availability search criteria
//! - Configuration structures (pricing extras, currency rates, sources)
//! - ISO calendar helpers (week labels, strict date parsing)
//! - Common error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
