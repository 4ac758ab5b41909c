//! Header resolution: binds each metric to a column of the financial table.
//!
//! Column wording differs between issuers (banks report 経常収益 instead of
//! 売上高, IFRS filers use longer labels), so every metric carries an ordered
//! list of alias substrings. Resolution is first-match-wins: scanning columns
//! left to right, a metric binds to the first column containing one of its
//! aliases and is never rebound.
use std::collections::BTreeMap;

use crate::models::Metric;

/// Mapping from metric to column index within one table. May be partial.
pub type ColumnMap = BTreeMap<Metric, usize>;

/// How a column that already satisfied one metric is treated for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnClaim {
    /// Any number of metrics may bind to the same column
    #[default]
    Shared,
    /// Once a metric binds a column, lower-priority metrics skip it
    Exclusive,
}

/// Ordered alias configuration. Entry order is the metric priority order:
/// when several unresolved metrics match the same column, they are checked
/// in this order.
#[derive(Debug, Clone)]
pub struct MetricAliases {
    entries: Vec<(Metric, Vec<String>)>,
    claim: ColumnClaim,
}

impl Default for MetricAliases {
    fn default() -> Self {
        let entries: [(Metric, &[&str]); 9] = [
            (Metric::Revenue, &["売上高", "営業収益", "経常収益", "売上"]),
            (
                Metric::Eps,
                &["EPS", "一株利益", "基本的1株当たり当期利益", "一株当たり当期純利益"],
            ),
            (Metric::TotalAssets, &["総資産", "資産合計"]),
            (
                Metric::OperatingCf,
                &[
                    "営業CF",
                    "営業キャッシュフロー",
                    "営業活動によるキャッシュ・フロー",
                    "営業活動によるキャッシュフロー",
                ],
            ),
            (
                Metric::CashEquivalents,
                &["現金等", "現金残高", "現金及び現金同等物", "現金及び預金"],
            ),
            (
                Metric::Roe,
                &["ROE", "自己資本利益率", "親会社所有者帰属持分当期利益率", "当期純利益率"],
            ),
            (
                Metric::EquityRatio,
                &["自己資本比率", "親会社所有者帰属持分比率", "資本比率"],
            ),
            (Metric::DividendPerShare, &["配当", "一株配当", "1株当たり配当額"]),
            (Metric::DividendPayoutRatio, &["配当性向", "配当性向(%)"]),
        ];

        Self::new(
            entries
                .into_iter()
                .map(|(metric, aliases)| (metric, aliases.iter().map(|a| a.to_string()).collect()))
                .collect(),
        )
    }
}

impl MetricAliases {
    /// Build from `(metric, aliases)` pairs in priority order. A metric listed
    /// twice keeps only its first entry.
    pub fn new(entries: Vec<(Metric, Vec<String>)>) -> Self {
        let mut seen = Vec::with_capacity(entries.len());
        let entries = entries
            .into_iter()
            .filter(|(metric, _)| {
                if seen.contains(metric) {
                    false
                } else {
                    seen.push(*metric);
                    true
                }
            })
            .map(|(metric, aliases)| (metric, aliases.iter().map(|a| fold_width(a)).collect()))
            .collect();

        Self {
            entries,
            claim: ColumnClaim::default(),
        }
    }

    pub fn with_claim(mut self, claim: ColumnClaim) -> Self {
        self.claim = claim;
        self
    }

    pub fn claim(&self) -> ColumnClaim {
        self.claim
    }

    /// Metrics in priority order.
    pub fn priority(&self) -> impl Iterator<Item = Metric> + '_ {
        self.entries.iter().map(|(metric, _)| *metric)
    }

    fn matches(aliases: &[String], cell: &str) -> bool {
        aliases.iter().any(|alias| cell.contains(alias.as_str()))
    }

    /// Resolve a header row into a column map.
    pub fn resolve<S: AsRef<str>>(&self, header_cells: &[S]) -> ColumnMap {
        let mut map = ColumnMap::new();

        for (idx, cell) in header_cells.iter().enumerate() {
            let cell = fold_width(cell.as_ref());

            for (metric, aliases) in &self.entries {
                if map.contains_key(metric) {
                    continue;
                }
                if Self::matches(aliases, &cell) {
                    map.insert(*metric, idx);
                    if self.claim == ColumnClaim::Exclusive {
                        break;
                    }
                }
            }
        }

        map
    }
}

/// Resolve a header row with the default alias configuration.
pub fn resolve(header_cells: &[String]) -> ColumnMap {
    MetricAliases::default().resolve(header_cells)
}

/// Fold full-width ASCII variants (U+FF01..=U+FF5E) and the ideographic space
/// to their half-width forms.
pub fn fold_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}
