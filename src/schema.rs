use crate::error::{KpiError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single ledger entry, already typed and validated by the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRecord {
    #[schemars(description = "Calendar date of the transaction (YYYY-MM-DD).")]
    pub date: NaiveDate,

    #[schemars(description = "Signed transaction amount.")]
    pub transaction_amount: f64,

    pub cash_flow: f64,

    pub net_income: f64,

    pub revenue: f64,

    pub expenditure: f64,

    #[schemars(
        description = "Per-transaction problem flag in [0, 1]. 1 means the transaction was problematic, 0 means clean."
    )]
    pub transaction_outcome: f64,

    #[schemars(description = "Profit margin ratio, typically in [-1, 1].")]
    pub profit_margin: f64,
}

impl TransactionRecord {
    /// Numeric fields by name, in ledger column order.
    pub const NUMERIC_FIELDS: [&'static str; 7] = [
        "transaction_amount",
        "cash_flow",
        "net_income",
        "revenue",
        "expenditure",
        "transaction_outcome",
        "profit_margin",
    ];

    /// Numeric columns paired with their names, in `NUMERIC_FIELDS` order.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 7] {
        let values = [
            self.transaction_amount,
            self.cash_flow,
            self.net_income,
            self.revenue,
            self.expenditure,
            self.transaction_outcome,
            self.profit_margin,
        ];
        std::array::from_fn(|idx| (Self::NUMERIC_FIELDS[idx], values[idx]))
    }

    /// Rejects NaN and infinite amounts; `row` is reported back in the error.
    pub fn validate(&self, row: usize) -> Result<()> {
        match self.numeric_fields().into_iter().find(|(_, v)| !v.is_finite()) {
            Some((field, value)) => Err(KpiError::NonFiniteValue { row, field, value }),
            None => Ok(()),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(TransactionRecord)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

/// Calendar month used as the aggregation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(KpiError::InvalidPeriod(format!(
                "{:04}-{:02} is not a representable calendar month",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        crate::utils::first_day_of_month(self.year, self.month)
            .ok_or_else(|| self.out_of_range())
    }

    pub fn last_day(&self) -> Result<NaiveDate> {
        crate::utils::last_day_of_month(self.year, self.month)
            .ok_or_else(|| self.out_of_range())
    }

    /// The following calendar month. Fails past the last month chrono can represent.
    pub fn next(&self) -> Result<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    fn out_of_range(&self) -> KpiError {
        KpiError::InvalidPeriod(format!("{} is outside the supported date range", self))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self> {
        crate::utils::parse_period_string(s)
    }
}

impl TryFrom<String> for Period {
    type Error = KpiError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Raw reductions over every transaction of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub period: Period,
    pub total_amount: f64,
    pub tx_count: u64,
    pub avg_amount: f64,
    pub net_cashflow: f64,
    pub net_income: f64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    /// Mean of `transaction_outcome`, in [0, 1] for valid input.
    pub problem_rate: f64,
    /// Mean of `profit_margin`.
    pub avg_margin: f64,
}

/// A monthly aggregate enriched with the derived KPI columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyKpi {
    #[serde(flatten)]
    pub aggregate: MonthlyAggregate,
    pub profit_margin_pct: f64,
    pub problem_rate_pct: f64,
    /// `None` when the previous month had zero revenue and the growth policy is `Undefined`.
    pub revenue_growth_pct: Option<f64>,
    pub tx_growth_pct: Option<f64>,
    pub revenue_per_tx: f64,
    pub health_score: f64,
}

impl MonthlyKpi {
    pub fn period(&self) -> Period {
        self.aggregate.period
    }

    pub fn total_revenue(&self) -> f64 {
        self.aggregate.total_revenue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    #[default]
    #[schemars(
        description = "Growth against a zero previous value is reported as undefined (null)."
    )]
    Undefined,

    #[schemars(description = "Growth against a zero previous value is reported as 0.")]
    Zero,

    #[schemars(description = "Growth against a zero previous value aborts the derivation.")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KpiConfig {
    #[serde(default = "default_round_raw_aggregates")]
    #[schemars(
        description = "Round the raw monthly sums and means to 2 decimals before deriving KPIs from them. Defaults to true."
    )]
    pub round_raw_aggregates: bool,

    #[serde(default)]
    #[schemars(
        description = "How to report month-over-month growth when the previous month's value is zero."
    )]
    pub growth_policy: GrowthPolicy,
}

fn default_round_raw_aggregates() -> bool {
    true
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            round_raw_aggregates: true,
            growth_policy: GrowthPolicy::default(),
        }
    }
}

impl KpiConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(KpiConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
