//! Value normalization for financial-statement cells.
//!
//! Cells carry localized numbers: thousands separators, a unit glyph
//! (兆 = 10^12, 億 = 10^8, 万 = 10^4), a percent sign, or a dash meaning
//! "no data". Anything that still fails to parse becomes 0.0.
use serde::Serialize;

const TRILLION: &str = "兆";
const HUNDRED_MILLION: &str = "億";
const TEN_THOUSAND: &str = "万";
const PERCENT: &str = "%";

/// Unit glyphs in match priority order. Only the first one present is applied.
const UNITS: [(&str, f64); 4] = [
    (TRILLION, 1_000_000_000_000.0),
    (HUNDRED_MILLION, 100_000_000.0),
    (TEN_THOUSAND, 10_000.0),
    (PERCENT, 1.0),
];

/// Where a normalized value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// The cell parsed as a number
    Parsed,
    /// Empty cell or a dash placeholder
    Placeholder,
    /// The cell had text that could not be read as a number
    Unparsable,
    /// No column for this metric exists in the table
    MissingColumn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedValue {
    pub value: f64,
    pub source: ValueSource,
}

impl NormalizedValue {
    fn zero(source: ValueSource) -> Self {
        Self { value: 0.0, source }
    }
}

/// Convert a cell's text into a number, zero when absent or unreadable.
///
/// ```
/// use stock_score_service::extract::normalizer::normalize;
///
/// assert_eq!(normalize("1,234"), 1234.0);
/// assert_eq!(normalize("5億"), 500_000_000.0);
/// assert_eq!(normalize("12.5%"), 12.5);
/// assert_eq!(normalize("-"), 0.0);
/// ```
pub fn normalize(text: &str) -> f64 {
    normalize_cell(text).value
}

/// Same as [`normalize`], but also reports whether the zero fallback was used.
pub fn normalize_cell(text: &str) -> NormalizedValue {
    if is_placeholder(text) {
        return NormalizedValue::zero(ValueSource::Placeholder);
    }

    let mut clean = text.replace(',', "");
    let mut multiplier = 1.0;

    if let Some((glyph, unit)) = UNITS.iter().find(|(glyph, _)| clean.contains(glyph)) {
        clean = clean.replace(glyph, "");
        multiplier = *unit;
    }

    match fold_digits(clean.trim()).parse::<f64>() {
        Ok(number) if (number * multiplier).is_finite() => NormalizedValue {
            value: number * multiplier,
            source: ValueSource::Parsed,
        },
        // "NaN", "inf" and overflowing exponents parse but are not figures
        _ => NormalizedValue::zero(ValueSource::Unparsable),
    }
}

/// Full-width digits (U+FF10..=U+FF19) to ASCII. Full-width signs and
/// decimal points are left alone and still fail to parse.
fn fold_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF10}'..='\u{FF19}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

fn is_placeholder(text: &str) -> bool {
    matches!(text, "" | "-" | "－")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_separated_numbers() {
        assert_eq!(normalize("1,234"), 1234.0);
        assert_eq!(normalize("1,234,567.5"), 1_234_567.5);
        assert_eq!(normalize("-42.5"), -42.5);
    }

    #[test]
    fn test_placeholders_are_zero() {
        for text in ["", "-", "－"] {
            let cell = normalize_cell(text);
            assert_eq!(cell.value, 0.0);
            assert_eq!(cell.source, ValueSource::Placeholder);
        }
    }

    #[test]
    fn test_unit_multipliers() {
        assert_eq!(normalize("5億"), 500_000_000.0);
        assert_eq!(normalize("1.5兆"), 1_500_000_000_000.0);
        assert_eq!(normalize("3万"), 30_000.0);
        assert_eq!(normalize("1,200億"), 120_000_000_000.0);
    }

    #[test]
    fn test_percent_is_kept_as_given() {
        assert_eq!(normalize("8.5%"), 8.5);
        assert_eq!(normalize("40%"), 40.0);
    }

    #[test]
    fn test_only_highest_priority_unit_is_stripped() {
        // 兆 wins; the remaining 億 makes the token unreadable
        let cell = normalize_cell("1兆2000億");
        assert_eq!(cell.value, 0.0);
        assert_eq!(cell.source, ValueSource::Unparsable);
    }

    #[test]
    fn test_unparsable_falls_back_to_zero() {
        for text in ["n/a", "赤字", "１２．５", "－５", "--"] {
            let cell = normalize_cell(text);
            assert_eq!(cell.value, 0.0, "{text}");
            assert_eq!(cell.source, ValueSource::Unparsable, "{text}");
        }
    }

    #[test]
    fn test_full_width_digits() {
        let cell = normalize_cell("１２３");
        assert_eq!(cell.value, 123.0);
        assert_eq!(cell.source, ValueSource::Parsed);
        assert_eq!(normalize("１,２３４"), 1234.0);
        assert_eq!(normalize("１２億"), 1_200_000_000.0);
    }

    #[test]
    fn test_non_finite_numbers_are_unparsable() {
        for text in ["NaN", "nan", "inf", "-infinity", "1e400", "1e300兆"] {
            let cell = normalize_cell(text);
            assert_eq!(cell.value, 0.0, "{text}");
            assert_eq!(cell.source, ValueSource::Unparsable, "{text}");
        }
    }

    #[test]
    fn test_negative_with_unit() {
        assert_eq!(normalize("-2.5億"), -250_000_000.0);
    }
}
