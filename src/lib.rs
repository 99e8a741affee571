//! # Monthly KPI Builder
//!
//! A library for turning a ledger of dated transactions into a monthly
//! Key-Performance-Indicator table that tracks the financial health of a business.
//!
//! ## Core Concepts
//!
//! - **Transaction Records**: Typed ledger entries (amount, cash flow, income, revenue,
//!   expenditure, a problem flag and a profit margin)
//! - **Monthly Aggregates**: Sums, counts and means of every calendar month present in
//!   the ledger, rounded to cents
//! - **KPIs**: Percentages, month-over-month growth rates, revenue per transaction and a
//!   composite health score derived from the aggregates
//! - **Signals**: Green/orange/red ratings for problem rate, growth and health
//!
//! ## Example
//!
//! ```rust,ignore
//! use monthly_kpi_builder::*;
//!
//! let records = read_transactions_csv_path("accounting_data.csv")?;
//! let kpis = build_monthly_kpis(&records)?;
//!
//! for kpi in &kpis {
//!     println!(
//!         "{}: revenue {:.2}, health {:.1} ({})",
//!         kpi.period(),
//!         kpi.total_revenue(),
//!         kpi.health_score,
//!         kpi.signals().health
//!     );
//! }
//! ```

pub mod aggregator;
pub mod classification;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod schema;
pub mod summary;
pub mod synthetic;
pub mod utils;

pub use aggregator::{aggregate_monthly, MonthlyAggregator};
pub use classification::{
    classify_growth, classify_health, classify_problem_rate, KpiSignal, KpiSignals,
};
pub use engine::{derive_kpis, health_score, KpiEngine};
pub use error::{KpiError, Result};
pub use ingestion::*;
pub use report::{correlation_matrix, CorrelationMatrix, KpiMetric, KpiReport, KpiTableRow};
pub use schema::*;
pub use summary::{ColumnSummary, LedgerSummary};
pub use synthetic::SyntheticLedger;

use log::{debug, info};

pub struct KpiProcessor {
    config: KpiConfig,
}

impl KpiProcessor {
    pub fn new(config: KpiConfig) -> Self {
        Self { config }
    }

    /// Aggregates `records` by month and derives the KPI table. An empty ledger
    /// produces an empty table rather than an error.
    pub fn process(&self, records: &[TransactionRecord]) -> Result<Vec<MonthlyKpi>> {
        debug!(
            "Processing {} transaction records (rounding: {}, growth policy: {:?})",
            records.len(),
            self.config.round_raw_aggregates,
            self.config.growth_policy
        );

        let aggregates = match MonthlyAggregator::new(&self.config).aggregate(records) {
            Ok(aggregates) => aggregates,
            Err(KpiError::EmptyInput) => {
                info!("No transaction records supplied; KPI table is empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let kpis = KpiEngine::new(&self.config).derive(&aggregates)?;

        if let (Some(first), Some(last)) = (kpis.first(), kpis.last()) {
            info!(
                "Built KPI table for {} months ({} to {})",
                kpis.len(),
                first.period(),
                last.period()
            );
        }

        Ok(kpis)
    }

    pub fn report(&self, records: &[TransactionRecord]) -> Result<KpiReport> {
        let kpis = self.process(records)?;
        Ok(KpiReport::from_kpis(&kpis))
    }
}

impl Default for KpiProcessor {
    fn default() -> Self {
        Self::new(KpiConfig::default())
    }
}

pub fn build_monthly_kpis(records: &[TransactionRecord]) -> Result<Vec<MonthlyKpi>> {
    KpiProcessor::default().process(records)
}

pub fn build_monthly_kpis_with_config(
    records: &[TransactionRecord],
    config: &KpiConfig,
) -> Result<Vec<MonthlyKpi>> {
    KpiProcessor::new(config.clone()).process(records)
}
