use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stock_score_service::cache::FileCache;
use stock_score_service::fetcher::KessanFetcher;
use stock_score_service::models::{Metric, ScoreResult};
use stock_score_service::services::AnalysisService;
use tracing::info;

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Score tickers against the nine financial heuristics and rank them", long_about = None)]
struct Cli {
    /// Securities codes to analyze (e.g. 7203 8411 130A)
    #[arg(required_unless_present = "ticker_file")]
    tickers: Vec<String>,

    /// File containing tickers, one per line ('#' starts a comment)
    #[arg(long)]
    ticker_file: Option<PathBuf>,

    /// Source site serving {base}/{ticker}/kessan pages
    #[arg(long, env = "SOURCE_BASE_URL", default_value = "https://irbank.net")]
    base_url: String,

    /// Directory for cached series
    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    cache_dir: PathBuf,

    /// Hours a cached series stays fresh
    #[arg(long, default_value = "24")]
    cache_ttl_hours: i64,

    /// Delay after each page fetch, in milliseconds
    #[arg(long, default_value = "1000")]
    request_delay_ms: u64,

    /// Number of tickers analyzed concurrently. The request delay applies per
    /// worker, so values above 1 send concurrent requests to the source site
    #[arg(long, default_value = "1")]
    parallel: usize,

    /// Score only the most recent N fiscal years
    #[arg(long)]
    years: Option<usize>,

    /// Print full results as JSON instead of a ranking table
    #[arg(long)]
    json: bool,
}

fn read_ticker_file(path: &PathBuf) -> Result<Vec<String>, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn print_ranking(results: &[ScoreResult]) {
    let header: Vec<String> = Metric::ALL.iter().map(|m| m.name().to_string()).collect();
    println!("{:>4}  {:<6}  {:>5}  {:>5}  {}", "Rank", "Ticker", "Score", "Years", header.join(" "));
    println!("{}", "=".repeat(100));

    for (rank, result) in results.iter().enumerate() {
        let points: Vec<String> = Metric::ALL
            .iter()
            .map(|m| format!("{:>w$}", result.breakdown.get(m).copied().unwrap_or(0.0), w = m.name().len()))
            .collect();
        println!(
            "{:>4}  {:<6}  {:>5}  {:>5}  {}",
            rank + 1,
            result.ticker,
            result.total_score,
            result.financial_data.year_count(),
            points.join(" ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut tickers = cli.tickers.clone();
    if let Some(path) = &cli.ticker_file {
        tickers.extend(read_ticker_file(path)?);
    }
    info!("Analyzing {} tickers", tickers.len());

    let cache = FileCache::new(&cli.cache_dir, chrono::Duration::hours(cli.cache_ttl_hours));
    let fetcher = KessanFetcher::new(cli.base_url.clone())
        .with_request_delay(Duration::from_millis(cli.request_delay_ms));
    let service = AnalysisService::new(Arc::new(cache), fetcher).with_score_window(cli.years);

    let pb = ProgressBar::new(tickers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let outcomes: Vec<_> = stream::iter(tickers)
        .map(|ticker| {
            let service = service.clone();
            async move {
                let outcome = service.analyze(&ticker).await;
                (ticker, outcome)
            }
        })
        .buffer_unordered(cli.parallel.max(1))
        .inspect(|(ticker, _)| {
            pb.set_message(ticker.clone());
            pb.inc(1);
        })
        .collect()
        .await;
    pb.finish_and_clear();

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for (ticker, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => failures.push((ticker, e)),
        }
    }

    results.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_ranking(&results);
    }

    if !failures.is_empty() {
        eprintln!("\n{} ticker(s) could not be analyzed:", failures.len());
        for (ticker, e) in &failures {
            eprintln!("  {ticker}: {e}");
        }
    }

    Ok(())
}
