//! Availability heatmap pipeline.
//!
//! Reads the availability extract (`hotel_id, coverage, <dates...>`), plans
//! stay windows from the criteria, and reports each hotel's fewest rooms per
//! window.

use chrono::NaiveDate;
use roomberg_core::config::{AvailabilityDefaults, SourceConfig};
use roomberg_core::{
    field, AvailabilityCriteria, AvailabilityHeatmapResult, AvailabilityRow, Config,
    HeatmapColumn,
};
use roomberg_ingestion::csv::{parse_table, Dialect, Table};
use roomberg_ingestion::{HotelSummary, SourceResolver};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::criteria::CriteriaQuery;
use crate::grid::{nightly_counts, HotelWindows};
use crate::metrics::AvailabilityMetrics;
use crate::window::WindowPlan;

const NON_DATE_COLUMNS: [&str; 2] = ["hotel_id", "coverage"];

/// Builds availability heatmaps from extracts.
#[derive(Debug, Clone)]
pub struct AvailabilityHeatmap {
    defaults: AvailabilityDefaults,
    sources: SourceConfig,
    dialect: Dialect,
}

impl AvailabilityHeatmap {
    /// Create a pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            defaults: config.availability.clone(),
            sources: config.sources.clone(),
            dialect: Dialect::default(),
        }
    }

    /// Criteria for a query, with configured defaults and `today` as the fallback start.
    pub fn criteria(&self, query: &CriteriaQuery, today: NaiveDate) -> AvailabilityCriteria {
        query.resolve(&self.defaults, today)
    }

    /// Build a heatmap from a parsed extract.
    ///
    /// Source label and path are left empty; the `load_*` methods fill them.
    pub fn build(
        &self,
        table: &Table,
        summary: &HotelSummary,
        criteria: &AvailabilityCriteria,
    ) -> AvailabilityHeatmapResult {
        let date_columns = date_columns(table);
        if date_columns.is_empty() {
            debug!(headers = ?table.headers, "availability extract has no date columns");
            return AvailabilityHeatmapResult::empty("", "", criteria.clone());
        }
        let hotel_id_column = table
            .headers
            .iter()
            .find(|h| h.eq_ignore_ascii_case("hotel_id"));
        if hotel_id_column.is_none() {
            debug!("availability extract has no hotel_id column, every row is dropped");
        }

        let plan = WindowPlan::new(criteria);
        let mut metrics = AvailabilityMetrics::new();
        let mut rows = Vec::with_capacity(table.records.len());

        for (line, record) in table.records.iter().enumerate() {
            let hotel_id = hotel_id_column
                .and_then(|column| field(record, column))
                .unwrap_or_default()
                .trim();
            if hotel_id.is_empty() {
                debug!(line = line + 2, "dropping availability row without hotel_id");
                continue;
            }

            let counts = nightly_counts(record, &date_columns);
            let windows = HotelWindows::evaluate(&counts, &plan, criteria.rooms_required);
            metrics.add_hotel(&windows);

            let entry = summary.by_hotel_id(hotel_id);
            rows.push(AvailabilityRow {
                hotel_id: hotel_id.to_string(),
                hmid: entry.map(|e| e.hmid.clone()).unwrap_or_default(),
                city: entry.map(|e| e.city.clone()).unwrap_or_default(),
                coverage: windows.coverage,
                values: windows.values,
            });
        }

        let stats = metrics.calculate();
        let columns: Vec<HeatmapColumn> = plan.keys().map(HeatmapColumn::for_date).collect();

        info!(
            hotels = rows.len(),
            windows = columns.len(),
            dates = date_columns.len(),
            "built availability heatmap"
        );

        AvailabilityHeatmapResult {
            source_label: String::new(),
            source_path: String::new(),
            search_params: criteria.search_summary(),
            criteria: criteria.clone(),
            columns,
            rows,
            max_rooms: stats.max_rooms,
            stats,
        }
    }

    /// Build a heatmap from extract text.
    pub fn build_from_text(
        &self,
        text: &str,
        summary: &HotelSummary,
        criteria: &AvailabilityCriteria,
    ) -> AvailabilityHeatmapResult {
        self.build(&parse_table(text, &self.dialect), summary, criteria)
    }

    /// Build a heatmap from an extract file.
    ///
    /// A missing or unreadable file gives an empty result labelled with the file stem.
    pub fn load_file(
        &self,
        path: &Path,
        summary: &HotelSummary,
        criteria: &AvailabilityCriteria,
    ) -> AvailabilityHeatmapResult {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let shown = path.to_string_lossy().into_owned();

        match std::fs::read_to_string(path) {
            Ok(text) => AvailabilityHeatmapResult {
                source_label: label,
                source_path: shown,
                ..self.build_from_text(&text, summary, criteria)
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "availability extract unreadable");
                AvailabilityHeatmapResult::empty(label, shown, criteria.clone())
            }
        }
    }

    /// Locate the availability extract under `root` (optionally in `batch`) and build it.
    pub fn load_batch(
        &self,
        root: &Path,
        batch: Option<&str>,
        criteria: &AvailabilityCriteria,
    ) -> AvailabilityHeatmapResult {
        let resolver = SourceResolver::new(root, &self.sources);
        let resolved = resolver.resolve(&self.sources.availability_extract, batch);
        let Some(path) = resolved.data_path else {
            warn!(root = %root.display(), batch = ?batch, "no availability extract found");
            return AvailabilityHeatmapResult::empty(resolved.label, "", criteria.clone());
        };

        let summary = resolver.load_summary();
        let result = self.load_file(&path, &summary, criteria);
        AvailabilityHeatmapResult {
            source_label: if resolved.label.is_empty() {
                result.source_label.clone()
            } else {
                resolved.label
            },
            source_path: resolver.relative_path(&path),
            ..result
        }
    }
}

impl Default for AvailabilityHeatmap {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Every non-empty header other than the hotel id and coverage columns.
fn date_columns(table: &Table) -> Vec<String> {
    table
        .headers
        .iter()
        .filter(|h| {
            !h.is_empty()
                && !NON_DATE_COLUMNS
                    .iter()
                    .any(|name| h.eq_ignore_ascii_case(name))
        })
        .cloned()
        .collect()
}
