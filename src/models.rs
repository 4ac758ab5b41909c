use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The nine financial metrics tracked per fiscal year.
///
/// Declaration order is the metric priority order used by header resolution
/// and the key order of score breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Revenue,
    Eps,
    TotalAssets,
    OperatingCf,
    CashEquivalents,
    Roe,
    EquityRatio,
    DividendPerShare,
    DividendPayoutRatio,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Revenue,
        Metric::Eps,
        Metric::TotalAssets,
        Metric::OperatingCf,
        Metric::CashEquivalents,
        Metric::Roe,
        Metric::EquityRatio,
        Metric::DividendPerShare,
        Metric::DividendPayoutRatio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Eps => "eps",
            Metric::TotalAssets => "totalAssets",
            Metric::OperatingCf => "operatingCf",
            Metric::CashEquivalents => "cashEquivalents",
            Metric::Roe => "roe",
            Metric::EquityRatio => "equityRatio",
            Metric::DividendPerShare => "dividendPerShare",
            Metric::DividendPayoutRatio => "dividendPayoutRatio",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Multi-year financial time series for one issuer, oldest year first.
///
/// Every metric vector has the same length as `fiscal_years`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSeries {
    pub ticker: String,
    pub fiscal_years: Vec<String>,
    pub revenue: Vec<f64>,
    pub eps: Vec<f64>,
    pub total_assets: Vec<f64>,
    pub operating_cf: Vec<f64>,
    pub cash_equivalents: Vec<f64>,
    pub roe: Vec<f64>,
    pub equity_ratio: Vec<f64>,
    pub dividend_per_share: Vec<f64>,
    pub dividend_payout_ratio: Vec<f64>,
}

impl FinancialSeries {
    /// Assemble a series from per-metric columns. Metrics missing from
    /// `columns` are filled with zeros.
    pub fn from_columns(
        ticker: impl Into<String>,
        fiscal_years: Vec<String>,
        mut columns: BTreeMap<Metric, Vec<f64>>,
    ) -> Self {
        let len = fiscal_years.len();
        let mut take = |metric: Metric| columns.remove(&metric).unwrap_or_else(|| vec![0.0; len]);

        Self {
            ticker: ticker.into(),
            revenue: take(Metric::Revenue),
            eps: take(Metric::Eps),
            total_assets: take(Metric::TotalAssets),
            operating_cf: take(Metric::OperatingCf),
            cash_equivalents: take(Metric::CashEquivalents),
            roe: take(Metric::Roe),
            equity_ratio: take(Metric::EquityRatio),
            dividend_per_share: take(Metric::DividendPerShare),
            dividend_payout_ratio: take(Metric::DividendPayoutRatio),
            fiscal_years,
        }
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Revenue => &self.revenue,
            Metric::Eps => &self.eps,
            Metric::TotalAssets => &self.total_assets,
            Metric::OperatingCf => &self.operating_cf,
            Metric::CashEquivalents => &self.cash_equivalents,
            Metric::Roe => &self.roe,
            Metric::EquityRatio => &self.equity_ratio,
            Metric::DividendPerShare => &self.dividend_per_share,
            Metric::DividendPayoutRatio => &self.dividend_payout_ratio,
        }
    }

    pub fn year_count(&self) -> usize {
        self.fiscal_years.len()
    }

    /// True when every metric vector matches the number of fiscal years.
    /// Series loaded from an external cache are not guaranteed to hold this.
    pub fn is_consistent(&self) -> bool {
        let n = self.fiscal_years.len();
        Metric::ALL.iter().all(|m| self.values(*m).len() == n)
    }

    /// Copy of the series restricted to the most recent `years` entries.
    pub fn recent(&self, years: usize) -> Self {
        let tail = |v: &[f64]| v[v.len().saturating_sub(years)..].to_vec();
        let start = self.fiscal_years.len().saturating_sub(years);

        Self {
            ticker: self.ticker.clone(),
            fiscal_years: self.fiscal_years[start..].to_vec(),
            revenue: tail(&self.revenue),
            eps: tail(&self.eps),
            total_assets: tail(&self.total_assets),
            operating_cf: tail(&self.operating_cf),
            cash_equivalents: tail(&self.cash_equivalents),
            roe: tail(&self.roe),
            equity_ratio: tail(&self.equity_ratio),
            dividend_per_share: tail(&self.dividend_per_share),
            dividend_payout_ratio: tail(&self.dividend_payout_ratio),
        }
    }
}

/// Outcome of scoring one series. `total_score` is the sum of `breakdown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub ticker: String,
    pub total_score: f64,
    pub breakdown: BTreeMap<Metric, f64>,
    pub financial_data: FinancialSeries,
}
