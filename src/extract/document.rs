use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, instrument};

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("static selector 'table' is valid"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("static selector 'tr' is valid"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("static selector 'th, td' is valid"));

/// One table as rows of trimmed cell text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// A parsed page reduced to its tables, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub tables: Vec<RawTable>,
}

impl Document {
    pub fn new(tables: Vec<RawTable>) -> Self {
        Self { tables }
    }

    /// Parse an HTML page and collect the text of every `th`/`td` cell,
    /// grouped by `tr` and `table`.
    #[instrument(skip(html), fields(html_size = html.len()))]
    pub fn parse_html(html: &str) -> Self {
        let page = Html::parse_document(html);

        let tables: Vec<RawTable> = page
            .select(&TABLE_SELECTOR)
            .map(|table| {
                let rows = table
                    .select(&ROW_SELECTOR)
                    .map(|row| row.select(&CELL_SELECTOR).map(cell_text).collect())
                    .collect();
                RawTable::new(rows)
            })
            .collect();

        debug!("Found {} tables in document", tables.len());
        Self { tables }
    }
}

/// Text content with each text node trimmed, then concatenated.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}
