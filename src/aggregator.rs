use crate::error::{KpiError, Result};
use crate::schema::{KpiConfig, MonthlyAggregate, Period, TransactionRecord};
use crate::utils::round2;
use log::debug;
use std::collections::BTreeMap;

pub struct MonthlyAggregator {
    round_raw_aggregates: bool,
}

// Running totals for one calendar month
#[derive(Default)]
struct MonthBucket {
    count: u64,
    amount_sum: f64,
    cash_flow_sum: f64,
    net_income_sum: f64,
    revenue_sum: f64,
    expenditure_sum: f64,
    outcome_sum: f64,
    margin_sum: f64,
}

impl MonthBucket {
    fn push(&mut self, record: &TransactionRecord) {
        self.count += 1;
        self.amount_sum += record.transaction_amount;
        self.cash_flow_sum += record.cash_flow;
        self.net_income_sum += record.net_income;
        self.revenue_sum += record.revenue;
        self.expenditure_sum += record.expenditure;
        self.outcome_sum += record.transaction_outcome;
        self.margin_sum += record.profit_margin;
    }

    fn finish(self, period: Period, round: bool) -> MonthlyAggregate {
        let n = self.count as f64;
        let r = |v: f64| if round { round2(v) } else { v };

        MonthlyAggregate {
            period,
            total_amount: r(self.amount_sum),
            tx_count: self.count,
            avg_amount: r(self.amount_sum / n),
            net_cashflow: r(self.cash_flow_sum),
            net_income: r(self.net_income_sum),
            total_revenue: r(self.revenue_sum),
            total_expenses: r(self.expenditure_sum),
            problem_rate: r(self.outcome_sum / n),
            avg_margin: r(self.margin_sum / n),
        }
    }
}

impl MonthlyAggregator {
    pub fn new(config: &KpiConfig) -> Self {
        Self {
            round_raw_aggregates: config.round_raw_aggregates,
        }
    }

    /// Groups `records` by calendar month and reduces each group. The output is
    /// ordered by period and contains only months with at least one record.
    pub fn aggregate(&self, records: &[TransactionRecord]) -> Result<Vec<MonthlyAggregate>> {
        if records.is_empty() {
            return Err(KpiError::EmptyInput);
        }

        let mut buckets: BTreeMap<Period, MonthBucket> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            record.validate(idx)?;
            buckets
                .entry(Period::from_date(record.date))
                .or_default()
                .push(record);
        }

        debug!(
            "Grouped {} records into {} monthly buckets",
            records.len(),
            buckets.len()
        );

        Ok(buckets
            .into_iter()
            .map(|(period, bucket)| bucket.finish(period, self.round_raw_aggregates))
            .collect())
    }
}

pub fn aggregate_monthly(records: &[TransactionRecord]) -> Result<Vec<MonthlyAggregate>> {
    MonthlyAggregator::new(&KpiConfig::default()).aggregate(records)
}
