//! Extract ingestion for the Roomberg heatmap pipeline.
//!
//! This crate handles:
//! - Delimited-text parsing (quoted fields, embedded line breaks)
//! - Reading the dictionary literals found in price cells
//! - Hotel summary lookups (city, cross-reference ids)
//! - Locating extracts in dated batch directories
//! - Building availability extracts from saved booking-search responses

pub mod bookings;
pub mod csv;
pub mod literal;
pub mod source;
pub mod summary;

pub use bookings::{AvailabilityExtract, HotelNightlyMap};
pub use csv::{Dialect, Table};
pub use source::{ResolvedSource, SourceResolver};
pub use summary::{HotelSummary, SummaryEntry};
