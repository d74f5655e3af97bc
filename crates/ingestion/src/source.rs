//! Locating extracts on disk.
//!
//! Extract runs write into dated batch directories under the output
//! directory (`output_sheets/2024_mar_04/<extract>.csv`); a loose extract
//! directly under the output directory takes precedence over batches when no
//! specific batch is requested.

use chrono::NaiveDate;
use roomberg_core::config::SourceConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::summary::HotelSummary;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a batch directory name of the form `YYYY_mon_dd`.
pub fn parse_batch_slug(slug: &str) -> Option<NaiveDate> {
    let mut parts = slug.split('_');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(year, 4) || !all_digits(day, 2) || month.len() != 3 {
        return None;
    }

    let month = month.to_ascii_lowercase();
    let month_index = MONTHS.iter().position(|m| *m == month)?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month_index as u32 + 1, day.parse().ok()?)
}

/// Where an extract was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Extract path, `None` when nothing was found.
    pub data_path: Option<PathBuf>,
    /// Batch name, or the file stem for a loose extract.
    pub label: String,
}

/// Resolves extract and summary paths under an output root.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    root: PathBuf,
    output_dir: PathBuf,
    summary_candidates: Vec<String>,
}

impl SourceResolver {
    /// Create a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, config: &SourceConfig) -> Self {
        let root = root.into();
        Self {
            output_dir: root.join(&config.output_dir),
            root,
            summary_candidates: config.summary_candidates.clone(),
        }
    }

    /// Find an extract file, preferring the requested batch.
    ///
    /// Order: the requested batch, a loose file in the output directory, the
    /// most recent dated batch holding the file.
    pub fn resolve(&self, file_name: &str, batch: Option<&str>) -> ResolvedSource {
        if let Some(batch) = batch.filter(|b| is_plain_name(b)) {
            let candidate = self.output_dir.join(batch).join(file_name);
            if candidate.is_file() {
                return ResolvedSource {
                    data_path: Some(candidate),
                    label: batch.to_string(),
                };
            }
            debug!(batch, file_name, "requested batch has no extract");
        }

        let loose = self.output_dir.join(file_name);
        if loose.is_file() {
            let label = loose
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            return ResolvedSource {
                data_path: Some(loose),
                label,
            };
        }

        if let Some(latest) = self.latest_batch(file_name) {
            return ResolvedSource {
                data_path: Some(self.output_dir.join(&latest).join(file_name)),
                label: latest,
            };
        }

        ResolvedSource {
            data_path: None,
            label: batch.unwrap_or_default().to_string(),
        }
    }

    /// Most recent dated batch directory holding `file_name`.
    ///
    /// Falls back to the first such directory by name when none is dated.
    pub fn latest_batch(&self, file_name: &str) -> Option<String> {
        let entries = std::fs::read_dir(&self.output_dir).ok()?;
        let mut candidates: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| self.output_dir.join(name).join(file_name).is_file())
            .collect();
        candidates.sort();

        let mut latest: Option<(NaiveDate, &String)> = None;
        for name in &candidates {
            if let Some(date) = parse_batch_slug(name) {
                if latest.map_or(true, |(best, _)| date > best) {
                    latest = Some((date, name));
                }
            }
        }

        latest
            .map(|(_, name)| name.clone())
            .or_else(|| candidates.first().cloned())
    }

    /// First hotel summary file that exists.
    pub fn summary_path(&self) -> Option<PathBuf> {
        self.summary_candidates
            .iter()
            .map(|candidate| self.root.join(candidate))
            .find(|path| path.is_file())
    }

    /// Load the first hotel summary found; empty when there is none or it cannot be read.
    pub fn load_summary(&self) -> HotelSummary {
        let Some(path) = self.summary_path() else {
            return HotelSummary::default();
        };
        HotelSummary::read(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "hotel summary unreadable");
            HotelSummary::default()
        })
    }

    /// Display form of a path relative to the root.
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const EXTRACT: &str = "bookings_search_availability.csv";

    fn resolver(root: &Path) -> SourceResolver {
        SourceResolver::new(root, &SourceConfig::default())
    }

    fn write_extract(root: &Path, batch: Option<&str>) -> PathBuf {
        let mut dir = root.join("output_sheets");
        if let Some(batch) = batch {
            dir = dir.join(batch);
        }
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(EXTRACT);
        fs::write(&path, "hotel_id\n").unwrap();
        path
    }

    #[test]
    fn test_parse_batch_slug() {
        assert_eq!(parse_batch_slug("2024_mar_04"), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(parse_batch_slug("2024_DEC_31"), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(parse_batch_slug("2024_feb_30"), None);
        assert_eq!(parse_batch_slug("2024_xyz_01"), None);
        assert_eq!(parse_batch_slug("2024_mar_4"), None);
        assert_eq!(parse_batch_slug("2024_mar_04_extra"), None);
        assert_eq!(parse_batch_slug("latest"), None);
    }

    #[test]
    fn test_requested_batch_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), None);
        let wanted = write_extract(dir.path(), Some("2024_jan_05"));

        let resolved = resolver(dir.path()).resolve(EXTRACT, Some("2024_jan_05"));
        assert_eq!(resolved.data_path, Some(wanted));
        assert_eq!(resolved.label, "2024_jan_05");
    }

    #[test]
    fn test_loose_extract_before_batches() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), Some("2024_jan_05"));
        let loose = write_extract(dir.path(), None);

        let resolved = resolver(dir.path()).resolve(EXTRACT, Some("2023_jan_01"));
        assert_eq!(resolved.data_path, Some(loose));
        assert_eq!(resolved.label, "bookings_search_availability");
    }

    #[test]
    fn test_latest_dated_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), Some("2024_jan_05"));
        write_extract(dir.path(), Some("2024_mar_01"));
        write_extract(dir.path(), Some("2023_dec_30"));
        write_extract(dir.path(), Some("scratch"));
        fs::create_dir_all(dir.path().join("output_sheets/2025_jan_01")).unwrap();

        let resolver = resolver(dir.path());
        assert_eq!(resolver.latest_batch(EXTRACT).as_deref(), Some("2024_mar_01"));

        let resolved = resolver.resolve(EXTRACT, None);
        assert_eq!(resolved.label, "2024_mar_01");
        assert_eq!(
            resolver.relative_path(resolved.data_path.as_deref().unwrap()),
            Path::new("output_sheets")
                .join("2024_mar_01")
                .join(EXTRACT)
                .to_string_lossy()
        );
    }

    #[test]
    fn test_undated_batch_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), Some("zeta"));
        write_extract(dir.path(), Some("alpha"));
        assert_eq!(resolver(dir.path()).latest_batch(EXTRACT).as_deref(), Some("alpha"));
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolver(dir.path()).resolve(EXTRACT, Some("2024_jan_05"));
        assert_eq!(resolved.data_path, None);
        assert_eq!(resolved.label, "2024_jan_05");
    }

    #[test]
    fn test_batch_must_be_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), Some("2024_jan_05"));
        let resolved = resolver(dir.path()).resolve(EXTRACT, Some("../output_sheets/2024_jan_05"));
        // Falls through to the latest batch instead of following the path.
        assert_eq!(resolved.label, "2024_jan_05");
    }

    #[test]
    fn test_summary_candidates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path());
        assert_eq!(resolver.summary_path(), None);

        let fallback = dir.path().join("reference_sheets/kuoni_hotel_summary.csv");
        fs::create_dir_all(fallback.parent().unwrap()).unwrap();
        fs::write(&fallback, "hmid,city\n").unwrap();
        assert_eq!(resolver.summary_path(), Some(fallback));

        let preferred = dir.path().join("kuoni_hotel_summary_with_kuoni.csv");
        fs::write(&preferred, "hmid,kuoni_id,city\n7,K7,Faro\n").unwrap();
        assert_eq!(resolver.summary_path(), Some(preferred));
        assert_eq!(resolver.load_summary().by_hmid("7").unwrap().city, "Faro");
    }
}
