pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod extract;
pub mod fetch_error;
pub mod fetcher;
pub mod models;
pub mod scoring;
pub mod services;
pub mod utils;

pub use extract::{extract, extract_html};
pub use scoring::score;
