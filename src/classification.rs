use crate::schema::MonthlyKpi;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Traffic-light rating used when alerting or colouring KPI charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiSignal {
    Green,
    Orange,
    Red,
}

impl KpiSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiSignal::Green => "green",
            KpiSignal::Orange => "orange",
            KpiSignal::Red => "red",
        }
    }
}

impl fmt::Display for KpiSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const PROBLEM_RATE_RED_THRESHOLD: f64 = 95.0;
pub const PROBLEM_RATE_ORANGE_THRESHOLD: f64 = 90.0;
pub const HEALTH_ORANGE_THRESHOLD: f64 = 35.0;

pub fn classify_problem_rate(pct: f64) -> KpiSignal {
    if pct > PROBLEM_RATE_RED_THRESHOLD {
        KpiSignal::Red
    } else if pct > PROBLEM_RATE_ORANGE_THRESHOLD {
        KpiSignal::Orange
    } else {
        KpiSignal::Green
    }
}

/// Any non-positive growth, including exactly zero, is red.
pub fn classify_growth(pct: f64) -> KpiSignal {
    if pct > 0.0 {
        KpiSignal::Green
    } else {
        KpiSignal::Red
    }
}

pub fn classify_health(score: f64) -> KpiSignal {
    if score < 0.0 {
        KpiSignal::Red
    } else if score < HEALTH_ORANGE_THRESHOLD {
        KpiSignal::Orange
    } else {
        KpiSignal::Green
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSignals {
    pub problem_rate: KpiSignal,
    /// `None` when revenue growth is undefined for the month.
    pub revenue_growth: Option<KpiSignal>,
    pub health: KpiSignal,
}

impl MonthlyKpi {
    pub fn signals(&self) -> KpiSignals {
        KpiSignals {
            problem_rate: classify_problem_rate(self.problem_rate_pct),
            revenue_growth: self.revenue_growth_pct.map(classify_growth),
            health: classify_health(self.health_score),
        }
    }
}
