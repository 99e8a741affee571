use crate::classification::KpiSignal;
use crate::error::Result;
use crate::schema::{MonthlyKpi, Period};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// The columns a reporting or plotting consumer needs for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTableRow {
    pub period: Period,
    pub total_revenue: f64,
    pub profit_margin_pct: f64,
    pub problem_rate_pct: f64,
    pub revenue_growth_pct: Option<f64>,
    pub tx_growth_pct: Option<f64>,
    pub revenue_per_tx: f64,
    pub health_score: f64,
    pub problem_rate_signal: KpiSignal,
    pub revenue_growth_signal: Option<KpiSignal>,
    pub health_signal: KpiSignal,
}

impl From<&MonthlyKpi> for KpiTableRow {
    fn from(kpi: &MonthlyKpi) -> Self {
        let signals = kpi.signals();
        Self {
            period: kpi.period(),
            total_revenue: kpi.total_revenue(),
            profit_margin_pct: kpi.profit_margin_pct,
            problem_rate_pct: kpi.problem_rate_pct,
            revenue_growth_pct: kpi.revenue_growth_pct,
            tx_growth_pct: kpi.tx_growth_pct,
            revenue_per_tx: kpi.revenue_per_tx,
            health_score: kpi.health_score,
            problem_rate_signal: signals.problem_rate,
            revenue_growth_signal: signals.revenue_growth,
            health_signal: signals.health,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    ProfitMarginPct,
    ProblemRatePct,
    RevenueGrowthPct,
    HealthScore,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 4] = [
        KpiMetric::ProfitMarginPct,
        KpiMetric::ProblemRatePct,
        KpiMetric::RevenueGrowthPct,
        KpiMetric::HealthScore,
    ];

    pub fn value(&self, kpi: &MonthlyKpi) -> Option<f64> {
        match self {
            KpiMetric::ProfitMarginPct => Some(kpi.profit_margin_pct),
            KpiMetric::ProblemRatePct => Some(kpi.problem_rate_pct),
            KpiMetric::RevenueGrowthPct => kpi.revenue_growth_pct,
            KpiMetric::HealthScore => Some(kpi.health_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<KpiMetric>,
    /// Row-major; `None` where the correlation is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: KpiMetric, b: KpiMetric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == a)?;
        let j = self.metrics.iter().position(|m| *m == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation between every pair of KPI metrics, using the months where
/// both metrics are defined.
pub fn correlation_matrix(kpis: &[MonthlyKpi]) -> CorrelationMatrix {
    let metrics = KpiMetric::ALL.to_vec();

    let values = metrics
        .iter()
        .map(|a| {
            metrics
                .iter()
                .map(|b| {
                    let pairs: Vec<(f64, f64)> = kpis
                        .iter()
                        .filter_map(|k| Some((a.value(k)?, b.value(k)?)))
                        .collect();
                    let r = pearson(&pairs)?;
                    Some(if a == b { 1.0 } else { r })
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { metrics, values }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub rows: Vec<KpiTableRow>,
    pub correlations: CorrelationMatrix,
}

impl KpiReport {
    pub fn from_kpis(kpis: &[MonthlyKpi]) -> Self {
        Self {
            rows: kpis.iter().map(KpiTableRow::from).collect(),
            correlations: correlation_matrix(kpis),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the KPI table (without correlations) as headed CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
