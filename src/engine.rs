use crate::error::{KpiError, Result};
use crate::schema::{GrowthPolicy, KpiConfig, MonthlyAggregate, MonthlyKpi};
use crate::utils::{pct_change, round_to};
use log::debug;

/// Points awarded for a month with no problematic transactions.
const CLEANLINESS_WEIGHT: f64 = 50.0;
/// Health points per percentage point of profit margin.
const MARGIN_WEIGHT: f64 = 0.5;

pub struct KpiEngine {
    growth_policy: GrowthPolicy,
}

impl KpiEngine {
    pub fn new(config: &KpiConfig) -> Self {
        Self {
            growth_policy: config.growth_policy,
        }
    }

    /// Enriches an ordered aggregate sequence with the derived KPI columns.
    ///
    /// Growth rates compare each month with the entry immediately before it in
    /// `aggregates`; the first entry always has zero growth. An empty slice yields
    /// an empty table.
    pub fn derive(&self, aggregates: &[MonthlyAggregate]) -> Result<Vec<MonthlyKpi>> {
        validate_aggregates(aggregates)?;

        let mut kpis = Vec::with_capacity(aggregates.len());
        let mut previous: Option<&MonthlyAggregate> = None;

        for aggregate in aggregates {
            let (revenue_growth_pct, tx_growth_pct) = match previous {
                None => (Some(0.0), Some(0.0)),
                Some(prev) => (
                    self.growth(
                        aggregate,
                        "revenue",
                        prev.total_revenue,
                        aggregate.total_revenue,
                    )?,
                    self.growth(
                        aggregate,
                        "transaction count",
                        prev.tx_count as f64,
                        aggregate.tx_count as f64,
                    )?,
                ),
            };

            let profit_margin_pct = aggregate.avg_margin * 100.0;

            kpis.push(MonthlyKpi {
                aggregate: aggregate.clone(),
                profit_margin_pct,
                problem_rate_pct: aggregate.problem_rate * 100.0,
                revenue_growth_pct,
                tx_growth_pct,
                revenue_per_tx: aggregate.total_amount / aggregate.tx_count as f64,
                health_score: health_score(aggregate.problem_rate, profit_margin_pct),
            });

            previous = Some(aggregate);
        }

        debug!("Derived KPIs for {} months", kpis.len());
        Ok(kpis)
    }

    fn growth(
        &self,
        aggregate: &MonthlyAggregate,
        metric: &'static str,
        previous: f64,
        current: f64,
    ) -> Result<Option<f64>> {
        match pct_change(previous, current) {
            Some(pct) => Ok(Some(pct)),
            None => {
                debug!(
                    "Previous {} is zero before {}; applying {:?} policy",
                    metric, aggregate.period, self.growth_policy
                );
                match self.growth_policy {
                    GrowthPolicy::Undefined => Ok(None),
                    GrowthPolicy::Zero => Ok(Some(0.0)),
                    GrowthPolicy::Error => Err(KpiError::DivisionEdgeCase {
                        period: aggregate.period.to_string(),
                        metric,
                    }),
                }
            }
        }
    }
}

/// Composite health score: up to 50 points for transaction cleanliness plus half
/// the margin percentage. Not clamped; negative margins or margins above 100%
/// push the score outside 0-100.
pub fn health_score(problem_rate: f64, profit_margin_pct: f64) -> f64 {
    round_to(
        (1.0 - problem_rate) * CLEANLINESS_WEIGHT + profit_margin_pct * MARGIN_WEIGHT,
        1,
    )
}

fn validate_aggregates(aggregates: &[MonthlyAggregate]) -> Result<()> {
    for (idx, aggregate) in aggregates.iter().enumerate() {
        let fail = |details: String| KpiError::Derivation {
            period: aggregate.period.to_string(),
            details,
        };

        if aggregate.tx_count == 0 {
            return Err(fail("aggregate has zero transactions".to_string()));
        }

        let raw_fields = [
            ("total_amount", aggregate.total_amount),
            ("avg_amount", aggregate.avg_amount),
            ("net_cashflow", aggregate.net_cashflow),
            ("net_income", aggregate.net_income),
            ("total_revenue", aggregate.total_revenue),
            ("total_expenses", aggregate.total_expenses),
            ("problem_rate", aggregate.problem_rate),
            ("avg_margin", aggregate.avg_margin),
        ];
        if let Some((name, value)) = raw_fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(fail(format!("raw field {} is not finite ({})", name, value)));
        }

        if idx > 0 && aggregates[idx - 1].period >= aggregate.period {
            return Err(fail(format!(
                "periods must be strictly increasing, but {} follows {}",
                aggregate.period,
                aggregates[idx - 1].period
            )));
        }
    }

    Ok(())
}

pub fn derive_kpis(aggregates: &[MonthlyAggregate]) -> Result<Vec<MonthlyKpi>> {
    KpiEngine::new(&KpiConfig::default()).derive(aggregates)
}
