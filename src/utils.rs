//! Shared utility functions for the stock score service
use regex::Regex;
use std::sync::LazyLock;

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9][0-9A-Z]{3}$").expect("ticker pattern is valid"));

/// Normalize a Tokyo Stock Exchange securities code
///
/// Codes are four characters: a digit followed by three digits or letters
/// (newer listings such as "130A" include a letter). Input may carry
/// surrounding whitespace, lower-case letters, or a ".T" exchange suffix
/// as used by price data providers.
///
/// # Examples
///
/// ```
/// use stock_score_service::utils::normalize_ticker;
///
/// assert_eq!(normalize_ticker("7203").unwrap(), "7203");
/// assert_eq!(normalize_ticker(" 7203.T ").unwrap(), "7203");
/// assert_eq!(normalize_ticker("130a").unwrap(), "130A");
/// assert!(normalize_ticker("../etc").is_err());
/// ```
pub fn normalize_ticker(value: &str) -> Result<String, &'static str> {
    let upper = value.trim().to_ascii_uppercase();
    let code = upper.strip_suffix(".T").unwrap_or(&upper);

    if TICKER_PATTERN.is_match(code) {
        Ok(code.to_string())
    } else {
        Err("Ticker must be a 4-character securities code")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker_numeric() {
        assert_eq!(normalize_ticker("8411").unwrap(), "8411");
    }

    #[test]
    fn test_normalize_ticker_with_suffix() {
        assert_eq!(normalize_ticker("8411.T").unwrap(), "8411");
        assert_eq!(normalize_ticker("8411.t").unwrap(), "8411");
    }

    #[test]
    fn test_normalize_ticker_alphanumeric() {
        assert_eq!(normalize_ticker("285a").unwrap(), "285A");
    }

    #[test]
    fn test_normalize_ticker_too_short() {
        assert!(normalize_ticker("123").is_err());
    }

    #[test]
    fn test_normalize_ticker_too_long() {
        assert!(normalize_ticker("12345").is_err());
    }

    #[test]
    fn test_normalize_ticker_leading_letter() {
        assert!(normalize_ticker("A123").is_err());
    }

    #[test]
    fn test_normalize_ticker_rejects_path_characters() {
        assert!(normalize_ticker("72/3").is_err());
        assert!(normalize_ticker("").is_err());
    }
}
