use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Content rating assigned to an item. Declared in lexicographic order so the
/// derived `Ord` doubles as the deterministic category ordering.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    G,
    P,
    R,
    X,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::G, Category::P, Category::R, Category::X];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::G => "G",
            Self::P => "P",
            Self::R => "R",
            Self::X => "X",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(token: &str) -> Result<Self> {
        match token.trim() {
            "G" => Ok(Self::G),
            "P" => Ok(Self::P),
            "R" => Ok(Self::R),
            "X" => Ok(Self::X),
            other => bail!("unknown category token: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub worker_id: String,
    pub item_id: String,
    pub category: Category,
}

impl Label {
    pub fn new(worker_id: &str, item_id: &str, category: Category) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            item_id: item_id.to_string(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldItem {
    pub item_id: String,
    pub true_category: Category,
}

impl GoldItem {
    pub fn new(item_id: &str, true_category: Category) -> Self {
        Self {
            item_id: item_id.to_string(),
            true_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerProfile {
    pub worker_id: String,
    pub gold_ratings_count: u32,
    pub gold_correct_count: u32,
    pub accuracy: f64,
    pub odds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPrediction {
    pub item_id: String,
    pub top_category: Category,
    pub top_odds: f64,
    /// Ranking score behind `top_category`; stays finite when `top_odds`
    /// overflows.
    pub top_log_odds: f64,
}

/// Contingency table of predictions under two reliability thresholds,
/// spanning the full category enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonMatrix {
    pub counts: BTreeMap<Category, BTreeMap<Category, usize>>,
}

impl ComparisonMatrix {
    pub fn empty() -> Self {
        let counts = Category::ALL
            .iter()
            .map(|row| {
                let columns: BTreeMap<Category, usize> =
                    Category::ALL.iter().map(|column| (*column, 0)).collect();
                (*row, columns)
            })
            .collect();
        Self { counts }
    }

    pub fn record(&mut self, row: Category, column: Category) {
        *self
            .counts
            .entry(row)
            .or_default()
            .entry(column)
            .or_default() += 1;
    }

    pub fn cell(&self, row: Category, column: Category) -> usize {
        self.counts
            .get(&row)
            .and_then(|columns| columns.get(&column))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, row: Category) -> usize {
        Category::ALL
            .iter()
            .map(|column| self.cell(row, *column))
            .sum()
    }

    pub fn column_total(&self, column: Category) -> usize {
        Category::ALL.iter().map(|row| self.cell(*row, column)).sum()
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|row| self.row_total(*row)).sum()
    }

    pub fn diagonal_total(&self) -> usize {
        Category::ALL
            .iter()
            .map(|category| self.cell(*category, *category))
            .sum()
    }

    pub fn agreement_rate(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            None
        } else {
            Some(self.diagonal_total() as f64 / total as f64)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowRejection {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFileSummary {
    pub path: String,
    pub sha256: String,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
    pub rejections: Vec<RowRejection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunConfigSummary {
    pub smoothing: f64,
    pub tie_policy: String,
    pub on_malformed: String,
    pub quantiles: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct RunCounts {
    pub gold_items: usize,
    pub labels: usize,
    pub labels_on_gold: usize,
    pub labels_unknown: usize,
    pub worker_profiles: usize,
    pub reliable_workers: Vec<usize>,
    pub predicted_items: Vec<usize>,
    pub compared_pairs: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub command: String,
    pub config: RunConfigSummary,
    pub inputs: Vec<InputFileSummary>,
    pub counts: RunCounts,
    pub artifacts: Vec<String>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_known_tokens_and_rejects_others() {
        assert_eq!("X".parse::<Category>().expect("X parses"), Category::X);
        assert_eq!(" g ".parse::<Category>().ok(), None);
        assert_eq!(" G ".parse::<Category>().expect("padded G parses"), Category::G);

        let error = "Y".parse::<Category>().expect_err("Y is not a category");
        assert!(error.to_string().contains("unknown category token"));
    }

    #[test]
    fn comparison_matrix_totals_follow_recorded_pairs() {
        let mut matrix = ComparisonMatrix::empty();
        matrix.record(Category::G, Category::G);
        matrix.record(Category::G, Category::P);
        matrix.record(Category::X, Category::X);

        assert_eq!(matrix.total(), 3);
        assert_eq!(matrix.row_total(Category::G), 2);
        assert_eq!(matrix.column_total(Category::P), 1);
        assert_eq!(matrix.diagonal_total(), 2);
        assert_eq!(matrix.cell(Category::R, Category::R), 0);
        let rate = matrix.agreement_rate().expect("non-empty matrix has a rate");
        assert!((rate - 2.0 / 3.0).abs() < 1e-12);
        assert!(ComparisonMatrix::empty().agreement_rate().is_none());
    }

    #[test]
    fn comparison_matrix_serializes_category_keys_as_strings() {
        let mut matrix = ComparisonMatrix::empty();
        matrix.record(Category::R, Category::X);

        let value = serde_json::to_value(&matrix).expect("matrix serializes");
        assert_eq!(value["counts"]["R"]["X"], 1);
        assert_eq!(value["counts"]["G"]["G"], 0);
    }
}
