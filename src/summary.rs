use crate::schema::TransactionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date column plus the seven numeric columns of a ledger.
pub const LEDGER_COLUMNS: usize = 8;

/// Descriptive statistics of one numeric ledger column. Every statistic is
/// `None` for an empty ledger; `std` also needs at least two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = match (mean, count) {
            (Some(mean), n) if n > 1 => {
                let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            }
            _ => None,
        };

        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }
}

// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Shape and per-column statistics of a ledger, for a first look before aggregating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub rows: usize,
    pub columns: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub column_stats: Vec<ColumnSummary>,
}

impl LedgerSummary {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let column_stats = TransactionRecord::NUMERIC_FIELDS
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values = records.iter().map(|r| r.numeric_fields()[idx].1).collect();
                ColumnSummary::from_values(name, values)
            })
            .collect();

        Self {
            rows: records.len(),
            columns: LEDGER_COLUMNS,
            first_date: records.iter().map(|r| r.date).min(),
            last_date: records.iter().map(|r| r.date).max(),
            column_stats,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.column_stats.iter().find(|c| c.column == name)
    }
}
