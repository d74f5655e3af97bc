//! Hotel summary lookup.
//!
//! The summary sheet cross-references the two hotel id schemes (HMID and the
//! Kuoni id) and carries the city label shown next to each heatmap row.

use roomberg_core::{field, RawRow, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::csv::{parse_table, Dialect, Table};

/// What the summary knows about one hotel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryEntry {
    pub city: String,
    pub hmid: String,
    pub kuoni_id: String,
}

/// Summary entries indexed by both id schemes.
#[derive(Debug, Clone, Default)]
pub struct HotelSummary {
    /// Keyed by the first non-empty of `kuoni_id`, `hotel_id`, `hmid`.
    by_hotel_id: HashMap<String, SummaryEntry>,
    /// Keyed by `hmid`.
    by_hmid: HashMap<String, SummaryEntry>,
}

impl HotelSummary {
    /// Build the lookup from a parsed summary table. Later rows win on duplicate keys.
    pub fn from_table(table: &Table) -> Self {
        let mut summary = Self::default();
        for record in &table.records {
            let entry = SummaryEntry {
                city: trimmed(record, "city"),
                hmid: trimmed(record, "hmid"),
                kuoni_id: first_non_empty(record, &["kuoni_id", "hotel_id"]),
            };

            let hotel_key = first_non_empty(record, &["kuoni_id", "hotel_id", "hmid"]);
            if hotel_key.is_empty() {
                continue;
            }
            if !entry.hmid.is_empty() {
                summary.by_hmid.insert(entry.hmid.clone(), entry.clone());
            }
            summary.by_hotel_id.insert(hotel_key, entry);
        }
        summary
    }

    /// Parse summary text.
    pub fn parse(text: &str) -> Self {
        Self::from_table(&parse_table(text, &Dialect::default()))
    }

    /// Read a summary file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Look up by availability hotel id (Kuoni id).
    pub fn by_hotel_id(&self, hotel_id: &str) -> Option<&SummaryEntry> {
        self.by_hotel_id.get(hotel_id.trim())
    }

    /// Look up by HMID.
    pub fn by_hmid(&self, hmid: &str) -> Option<&SummaryEntry> {
        self.by_hmid.get(hmid.trim())
    }

    /// Number of hotels keyed by hotel id.
    pub fn len(&self) -> usize {
        self.by_hotel_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hotel_id.is_empty()
    }
}

fn trimmed(record: &RawRow, name: &str) -> String {
    field(record, name).unwrap_or_default().trim().to_string()
}

fn first_non_empty(record: &RawRow, names: &[&str]) -> String {
    names
        .iter()
        .map(|name| trimmed(record, name))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "hmid,kuoni_id,hotel_name,city\n\
                           101, K-1 ,Grand,Paris\n\
                           102,,Plaza,Rome\n\
                           ,K-3,Annex,Oslo\n\
                           ,,Orphan,Nowhere\n";

    #[test]
    fn test_lookup_by_hotel_id() {
        let summary = HotelSummary::parse(SUMMARY);
        assert_eq!(summary.len(), 3);

        let grand = summary.by_hotel_id("K-1").unwrap();
        assert_eq!(grand.city, "Paris");
        assert_eq!(grand.hmid, "101");

        // No kuoni_id: the HMID is the key.
        assert_eq!(summary.by_hotel_id("102").unwrap().city, "Rome");
        assert_eq!(summary.by_hotel_id("K-3").unwrap().hmid, "");
        assert!(summary.by_hotel_id("Nowhere").is_none());
    }

    #[test]
    fn test_lookup_by_hmid() {
        let summary = HotelSummary::parse(SUMMARY);
        assert_eq!(summary.by_hmid(" 101 ").unwrap().kuoni_id, "K-1");
        assert_eq!(summary.by_hmid("102").unwrap().kuoni_id, "");
        assert!(summary.by_hmid("K-3").is_none());
    }

    #[test]
    fn test_hotel_id_column_fallback() {
        let summary = HotelSummary::parse("hotel_id,city\nH9,Lima\n");
        assert_eq!(summary.by_hotel_id("H9").unwrap().city, "Lima");
        assert_eq!(summary.by_hotel_id("H9").unwrap().kuoni_id, "H9");
    }

    #[test]
    fn test_later_rows_win() {
        let summary = HotelSummary::parse("kuoni_id,city\nK1,Old\nK1,New\n");
        assert_eq!(summary.by_hotel_id("K1").unwrap().city, "New");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HotelSummary::read(dir.path().join("absent.csv")).is_err());
    }
}
