use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub source_base_url: String,
    pub cache_dir: String,
    pub cache_ttl_hours: i64,
    pub request_delay_ms: u64,
    pub fetch_max_retries: usize,
    pub score_window_years: Option<usize>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            source_base_url: env::var("SOURCE_BASE_URL")
                .unwrap_or_else(|_| "https://irbank.net".to_string()),
            cache_dir: env::var("CACHE_DIR").unwrap_or_else(|_| "cache".to_string()),
            cache_ttl_hours: env::var("CACHE_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            request_delay_ms: env::var("REQUEST_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            fetch_max_retries: env::var("FETCH_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            score_window_years: env::var("SCORE_WINDOW_YEARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|years| *years > 0),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_ttl_hours)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
