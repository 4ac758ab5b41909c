use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use super::document::RawTable;
use super::header::ColumnMap;
use super::normalizer::{normalize_cell, NormalizedValue, ValueSource};
use crate::models::{FinancialSeries, Metric};

/// Per-cell provenance collected while building a series.
///
/// The values in the series are unaffected; this only tells a true zero apart
/// from a missing column or an unreadable cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDiagnostics {
    /// Source of every value, aligned with `FinancialSeries::fiscal_years`
    pub sources: BTreeMap<Metric, Vec<ValueSource>>,
    /// Body rows dropped for having too few cells
    pub skipped_rows: usize,
    /// Metrics with no matching column
    pub unresolved: Vec<Metric>,
}

impl ExtractionDiagnostics {
    pub fn count(&self, source: ValueSource) -> usize {
        self.sources
            .values()
            .flat_map(|v| v.iter())
            .filter(|s| **s == source)
            .count()
    }
}

pub struct SeriesBuilder;

impl SeriesBuilder {
    /// Walk the table body into an oldest-first [`FinancialSeries`].
    pub fn build(ticker: &str, table: &RawTable, column_map: &ColumnMap) -> FinancialSeries {
        Self::build_with_diagnostics(ticker, table, column_map).0
    }

    #[instrument(skip(table, column_map), fields(rows = table.rows.len(), mapped = column_map.len()))]
    pub fn build_with_diagnostics(
        ticker: &str,
        table: &RawTable,
        column_map: &ColumnMap,
    ) -> (FinancialSeries, ExtractionDiagnostics) {
        let max_index = column_map.values().copied().max().unwrap_or(0);

        let mut years: Vec<String> = Vec::new();
        let mut columns: BTreeMap<Metric, Vec<f64>> = BTreeMap::new();
        let mut diagnostics = ExtractionDiagnostics {
            unresolved: Metric::ALL
                .into_iter()
                .filter(|m| !column_map.contains_key(m))
                .collect(),
            ..Default::default()
        };

        if !diagnostics.unresolved.is_empty() {
            info!(
                "No column for {:?}; those metrics will be zero",
                diagnostics.unresolved
            );
        }

        for (row_idx, row) in table.body().iter().enumerate() {
            if row.len() <= max_index {
                debug!(
                    "Row {} has {} cells, need {}; skipping",
                    row_idx + 1,
                    row.len(),
                    max_index + 1
                );
                diagnostics.skipped_rows += 1;
                continue;
            }

            let year = &row[0];
            years.push(year.clone());

            for metric in Metric::ALL {
                let cell = match column_map.get(&metric) {
                    Some(&idx) => {
                        let cell = normalize_cell(&row[idx]);
                        if cell.source == ValueSource::Unparsable {
                            warn!(
                                "Unreadable {} value '{}' for {} (column {}), using 0",
                                metric, row[idx], year, idx
                            );
                        }
                        cell
                    }
                    None => NormalizedValue {
                        value: 0.0,
                        source: ValueSource::MissingColumn,
                    },
                };

                columns.entry(metric).or_default().push(cell.value);
                diagnostics.sources.entry(metric).or_default().push(cell.source);
            }
        }

        // Source tables list the newest year first
        years.reverse();
        for values in columns.values_mut() {
            values.reverse();
        }
        for sources in diagnostics.sources.values_mut() {
            sources.reverse();
        }

        debug!(
            "Built {} fiscal years ({} rows skipped)",
            years.len(),
            diagnostics.skipped_rows
        );

        (
            FinancialSeries::from_columns(ticker, years, columns),
            diagnostics,
        )
    }
}
