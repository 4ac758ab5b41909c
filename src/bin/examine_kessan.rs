use std::env;
use stock_score_service::extract::normalizer::ValueSource;
use stock_score_service::extract::{locator, Document, Extractor};
use stock_score_service::models::Metric;
use stock_score_service::scoring;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        eprintln!("Usage: examine-kessan <saved-kessan-page.html> [ticker]");
        std::process::exit(2);
    };
    let ticker = args.get(2).map(String::as_str).unwrap_or("0000");

    println!("Opening page: {file_path}");
    let html = std::fs::read_to_string(file_path)?;
    let document = Document::parse_html(&html);

    println!("\nFound {} tables", document.tables.len());
    println!("{}", "=".repeat(100));
    for (i, table) in document.tables.iter().enumerate() {
        println!("--- Table {i} ({} rows) ---", table.rows.len());
        for (j, row) in table.rows.iter().enumerate().take(4) {
            println!("Row {j}: {row:?}");
        }
    }

    let extractor = Extractor::default();
    let (table, column_map) = locator::locate(&document, extractor.aliases())?;

    println!("\n{}", "=".repeat(100));
    println!("Column map:");
    println!("{}", "=".repeat(100));
    let header = table.header().unwrap_or_default();
    for metric in Metric::ALL {
        match column_map.get(&metric) {
            Some(&idx) => println!("{:<20} -> col {:3} [{}]", metric.name(), idx, header[idx]),
            None => println!("{:<20} -> (unresolved)", metric.name()),
        }
    }

    let (series, diagnostics) = extractor.extract_with_diagnostics(ticker, &document)?;

    println!("\n{}", "=".repeat(100));
    println!(
        "Series: {} fiscal years, {} rows skipped",
        series.year_count(),
        diagnostics.skipped_rows
    );
    println!("{}", "=".repeat(100));
    println!("Years: {:?}", series.fiscal_years);
    for metric in Metric::ALL {
        println!("{:<20} {:?}", metric.name(), series.values(metric));
    }

    let unparsable = diagnostics.count(ValueSource::Unparsable);
    if unparsable > 0 {
        println!("\nUnreadable cells ({unparsable}):");
        for (metric, sources) in &diagnostics.sources {
            for (i, source) in sources.iter().enumerate() {
                if *source == ValueSource::Unparsable {
                    println!("  {} {}", metric.name(), series.fiscal_years[i]);
                }
            }
        }
    }

    let result = scoring::score(&series);
    println!("\nScore: {}", result.total_score);
    for (metric, points) in &result.breakdown {
        println!("  {:<20} {}", metric.name(), points);
    }

    Ok(())
}
