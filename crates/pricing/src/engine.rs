//! Pricing heatmap pipeline.
//!
//! Reads a pricing extract, normalizes every price cell, and lays the cells
//! out as one row per hotel and one column per check-in date.

use roomberg_core::calendar::{format_iso_date, parse_iso_date};
use roomberg_core::config::SourceConfig;
use roomberg_core::{
    field, Config, HeatmapColumn, NormalizedCell, PricingHeatmapResult, PricingRow, RawRow,
};
use roomberg_ingestion::csv::{parse_table, Dialect, Table};
use roomberg_ingestion::{HotelSummary, SourceResolver};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::normalizer::PriceNormalizer;
use crate::stats::PricingStats;

/// How the extract lays out its price cells.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtractLayout {
    /// One line per hotel/date: `hmid`, `check_in`, `price` columns.
    Long {
        hmid: String,
        check_in: String,
        price: String,
    },
    /// One line per hotel with one ISO-date column per check-in.
    Wide { hmid: String, dates: Vec<String> },
}

impl ExtractLayout {
    fn detect(table: &Table) -> Option<Self> {
        let hmid = header_named(table, "hmid")?;
        if let (Some(check_in), Some(price)) =
            (header_named(table, "check_in"), header_named(table, "price"))
        {
            return Some(Self::Long {
                hmid,
                check_in,
                price,
            });
        }

        let dates: Vec<String> = table
            .headers
            .iter()
            .filter(|h| parse_iso_date(h).is_ok())
            .cloned()
            .collect();
        if dates.is_empty() {
            None
        } else {
            Some(Self::Wide { hmid, dates })
        }
    }
}

/// Hotels in first-appearance order with their cells by date.
#[derive(Debug, Default)]
struct CellGrid {
    hotels: Vec<(String, BTreeMap<String, NormalizedCell>)>,
    index: HashMap<String, usize>,
    dates: BTreeSet<String>,
}

impl CellGrid {
    /// Record a cell; a later cell for the same hotel/date replaces the earlier one.
    fn insert(&mut self, hmid: &str, date: String, cell: NormalizedCell) {
        let position = match self.index.get(hmid) {
            Some(position) => *position,
            None => {
                self.hotels.push((hmid.to_string(), BTreeMap::new()));
                self.index.insert(hmid.to_string(), self.hotels.len() - 1);
                self.hotels.len() - 1
            }
        };
        self.dates.insert(date.clone());
        self.hotels[position].1.insert(date, cell);
    }
}

/// Builds pricing heatmaps from extracts.
#[derive(Debug, Clone)]
pub struct PricingHeatmap {
    normalizer: PriceNormalizer,
    sources: SourceConfig,
    dialect: Dialect,
}

impl PricingHeatmap {
    /// Create a pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: PriceNormalizer::new(&config.pricing),
            sources: config.sources.clone(),
            dialect: Dialect::default(),
        }
    }

    /// Build a heatmap from a parsed extract.
    ///
    /// Source label and path are left empty; the `load_*` methods fill them.
    pub fn build(&self, table: &Table, summary: &HotelSummary) -> PricingHeatmapResult {
        let Some(layout) = ExtractLayout::detect(table) else {
            debug!(headers = ?table.headers, "unrecognised pricing extract header");
            return PricingHeatmapResult::empty("", "");
        };

        let grid = self.collect_cells(table, &layout);
        if grid.dates.is_empty() {
            return PricingHeatmapResult::empty("", "");
        }

        let columns: Vec<HeatmapColumn> =
            grid.dates.iter().map(HeatmapColumn::for_date).collect();

        let mut stats = PricingStats::new();
        let rows: Vec<PricingRow> = grid
            .hotels
            .iter()
            .map(|(hmid, cells)| {
                let mut row_stats = PricingStats::new();
                let values: BTreeMap<String, NormalizedCell> = columns
                    .iter()
                    .map(|column| {
                        let cell = cells.get(&column.key).copied().unwrap_or(NormalizedCell::NA);
                        row_stats.add(&cell);
                        stats.add(&cell);
                        (column.key.clone(), cell)
                    })
                    .collect();

                let entry = summary.by_hmid(hmid);
                PricingRow {
                    hmid: hmid.clone(),
                    kuoni_id: entry.map(|e| e.kuoni_id.clone()).unwrap_or_default(),
                    city: entry.map(|e| e.city.clone()).unwrap_or_default(),
                    coverage: row_stats.has_rate() as f64 / columns.len() as f64,
                    values,
                }
            })
            .collect();

        let search_params = format!(
            "Hotels: {} | Check-in: {} to {}",
            rows.len(),
            columns.first().map(|c| c.key.as_str()).unwrap_or_default(),
            columns.last().map(|c| c.key.as_str()).unwrap_or_default(),
        );

        info!(
            hotels = rows.len(),
            columns = columns.len(),
            errors = stats.errors,
            "built pricing heatmap"
        );

        PricingHeatmapResult {
            source_label: String::new(),
            source_path: String::new(),
            search_params,
            columns,
            rows,
            stats: stats.entries(),
        }
    }

    /// Build a heatmap from extract text.
    pub fn build_from_text(&self, text: &str, summary: &HotelSummary) -> PricingHeatmapResult {
        self.build(&parse_table(text, &self.dialect), summary)
    }

    /// Build a heatmap from an extract file.
    ///
    /// A missing or unreadable file gives an empty result labelled with the file stem.
    pub fn load_file(&self, path: &Path, summary: &HotelSummary) -> PricingHeatmapResult {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let shown = path.to_string_lossy().into_owned();

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "pricing extract unreadable");
                return PricingHeatmapResult::empty(label, shown);
            }
        };

        PricingHeatmapResult {
            source_label: label,
            source_path: shown,
            ..self.build_from_text(&text, summary)
        }
    }

    /// Locate the pricing extract under `root` (optionally in `batch`) and build it.
    pub fn load_batch(&self, root: &Path, batch: Option<&str>) -> PricingHeatmapResult {
        let resolver = SourceResolver::new(root, &self.sources);
        let resolved = resolver.resolve(&self.sources.pricing_extract, batch);
        let Some(path) = resolved.data_path else {
            warn!(root = %root.display(), batch = ?batch, "no pricing extract found");
            return PricingHeatmapResult::empty(resolved.label, "");
        };

        let summary = resolver.load_summary();
        PricingHeatmapResult {
            source_label: resolved.label,
            source_path: resolver.relative_path(&path),
            ..self.load_file(&path, &summary)
        }
    }

    fn collect_cells(&self, table: &Table, layout: &ExtractLayout) -> CellGrid {
        let mut grid = CellGrid::default();
        for (line, record) in table.records.iter().enumerate() {
            match layout {
                ExtractLayout::Long {
                    hmid,
                    check_in,
                    price,
                } => {
                    let Some(hotel) = non_empty(record, hmid) else {
                        debug!(line = line + 2, "dropping pricing row without hmid");
                        continue;
                    };
                    let raw_date = field(record, check_in).unwrap_or_default().trim();
                    let Ok(date) = parse_iso_date(raw_date) else {
                        debug!(line = line + 2, check_in = raw_date, "dropping pricing row with bad check_in");
                        continue;
                    };
                    let cell = self.normalizer.normalize(field(record, price));
                    grid.insert(hotel, format_iso_date(date), cell);
                }
                ExtractLayout::Wide { hmid, dates } => {
                    let Some(hotel) = non_empty(record, hmid) else {
                        debug!(line = line + 2, "dropping pricing row without hmid");
                        continue;
                    };
                    for date in dates {
                        let cell = self.normalizer.normalize(field(record, date));
                        grid.insert(hotel, date.clone(), cell);
                    }
                }
            }
        }
        grid
    }
}

impl Default for PricingHeatmap {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Actual header text matching `name` case-insensitively.
fn header_named(table: &Table, name: &str) -> Option<String> {
    table
        .headers
        .iter()
        .find(|h| h.eq_ignore_ascii_case(name))
        .cloned()
}

fn non_empty<'a>(record: &'a RawRow, name: &str) -> Option<&'a str> {
    field(record, name).map(str::trim).filter(|v| !v.is_empty())
}
