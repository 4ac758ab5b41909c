use tracing::{debug, instrument, warn};

use super::document::{Document, RawTable};
use super::error::ExtractError;
use super::header::{ColumnMap, MetricAliases};

/// Header cell that marks the fiscal-year axis of the financial table.
pub const YEAR_AXIS_MARKER: &str = "年度";

/// Select the first table whose header row has a cell equal to the
/// year-axis marker and resolve its columns. No fallback table is tried.
#[instrument(skip(document, aliases), fields(tables = document.tables.len()))]
pub fn locate<'a>(
    document: &'a Document,
    aliases: &MetricAliases,
) -> Result<(&'a RawTable, ColumnMap), ExtractError> {
    let (idx, table) = document
        .tables
        .iter()
        .enumerate()
        .find(|(_, table)| {
            table
                .header()
                .is_some_and(|cells| cells.iter().any(|cell| cell == YEAR_AXIS_MARKER))
        })
        .ok_or_else(|| {
            warn!("No table with a '{}' header cell found", YEAR_AXIS_MARKER);
            ExtractError::TableNotFound {
                marker: YEAR_AXIS_MARKER,
            }
        })?;

    let header = table.header().unwrap_or_default();
    let column_map = aliases.resolve(header);
    debug!(
        "Selected table {} with {} columns, resolved {} metrics",
        idx,
        header.len(),
        column_map.len()
    );

    Ok((table, column_map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_locate_picks_first_table_with_marker() {
        let doc = Document::new(vec![
            table(&[&["銘柄", "株価"]]),
            table(&[&["年度", "売上高"], &["2024", "100"]]),
            table(&[&["年度", "EPS"], &["2024", "5"]]),
        ]);

        let (found, map) = locate(&doc, &MetricAliases::default()).unwrap();
        assert_eq!(found, &doc.tables[1]);
        assert_eq!(map.get(&Metric::Revenue), Some(&1));
        assert_eq!(map.get(&Metric::Eps), None);
    }

    #[test]
    fn test_marker_must_be_whole_cell() {
        let doc = Document::new(vec![table(&[&["年度別推移", "売上高"]])]);
        let result = locate(&doc, &MetricAliases::default());
        assert!(matches!(result, Err(ExtractError::TableNotFound { .. })));
    }

    #[test]
    fn test_marker_only_checked_in_first_row() {
        let doc = Document::new(vec![table(&[&["期間", "売上高"], &["年度", "100"]])]);
        assert!(locate(&doc, &MetricAliases::default()).is_err());
    }

    #[test]
    fn test_empty_document_fails() {
        let doc = Document::default();
        assert!(matches!(
            locate(&doc, &MetricAliases::default()),
            Err(ExtractError::TableNotFound { marker: YEAR_AXIS_MARKER })
        ));
    }
}
