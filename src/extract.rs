// Financial table extraction
//
// Turns an already-fetched results page into a FinancialSeries:
// Document -> locator (table + column map) -> series builder, with the
// normalizer applied to every mapped cell.

pub mod document;
pub mod error;
pub mod header;
pub mod locator;
pub mod normalizer;
pub mod series_builder;

pub use document::{Document, RawTable};
pub use error::ExtractError;
pub use header::{ColumnClaim, ColumnMap, MetricAliases};
pub use series_builder::{ExtractionDiagnostics, SeriesBuilder};

use tracing::{info, instrument};

use crate::models::FinancialSeries;

/// Extraction pipeline bound to one alias configuration.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    aliases: MetricAliases,
}

impl Extractor {
    pub fn new(aliases: MetricAliases) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &MetricAliases {
        &self.aliases
    }

    pub fn extract(&self, ticker: &str, document: &Document) -> Result<FinancialSeries, ExtractError> {
        self.extract_with_diagnostics(ticker, document)
            .map(|(series, _)| series)
    }

    #[instrument(skip(self, document))]
    pub fn extract_with_diagnostics(
        &self,
        ticker: &str,
        document: &Document,
    ) -> Result<(FinancialSeries, ExtractionDiagnostics), ExtractError> {
        let (table, column_map) = locator::locate(document, &self.aliases)?;
        let (series, diagnostics) = SeriesBuilder::build_with_diagnostics(ticker, table, &column_map);

        info!(
            "Extracted {} fiscal years for {} ({} unreadable cells)",
            series.year_count(),
            ticker,
            diagnostics.count(normalizer::ValueSource::Unparsable)
        );

        Ok((series, diagnostics))
    }

    pub fn extract_html(&self, ticker: &str, html: &str) -> Result<FinancialSeries, ExtractError> {
        self.extract(ticker, &Document::parse_html(html))
    }
}

/// Extract a series from a parsed document with the default aliases.
pub fn extract(ticker: &str, document: &Document) -> Result<FinancialSeries, ExtractError> {
    Extractor::default().extract(ticker, document)
}

/// Parse an HTML page and extract a series with the default aliases.
pub fn extract_html(ticker: &str, html: &str) -> Result<FinancialSeries, ExtractError> {
    Extractor::default().extract_html(ticker, html)
}
