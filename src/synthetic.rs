use crate::error::{KpiError, Result};
use crate::schema::{Period, TransactionRecord};
use chrono::{Datelike, NaiveDate};
use log::debug;
use rand::distributions::Bernoulli;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Generates reproducible transaction ledgers for demos and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticLedger {
    pub start: Period,
    pub months: u32,
    pub transactions_per_month: u32,
    pub mean_amount: f64,
    /// Relative standard deviation applied to amounts (0.0 = no variation).
    pub noise_factor: f64,
    /// Chance that a transaction is flagged as problematic.
    pub problem_probability: f64,
    pub mean_margin: f64,
    pub seed: u64,
}

impl SyntheticLedger {
    pub fn new(start: Period, months: u32, seed: u64) -> Self {
        Self {
            start,
            months,
            transactions_per_month: 40,
            mean_amount: 2_500.0,
            noise_factor: 0.2,
            problem_probability: 0.1,
            mean_margin: 0.25,
            seed,
        }
    }

    pub fn generate(&self) -> Result<Vec<TransactionRecord>> {
        if !(0.0..=1.0).contains(&self.noise_factor) {
            return Err(KpiError::InvalidNoiseFactor(self.noise_factor));
        }
        let flag = Bernoulli::new(self.problem_probability)
            .map_err(|_| KpiError::InvalidProbability(self.problem_probability))?;
        let amount_noise = Normal::new(0.0, self.noise_factor)
            .map_err(|_| KpiError::InvalidNoiseFactor(self.noise_factor))?;
        let margin_noise = Normal::new(0.0, self.noise_factor / 2.0)
            .map_err(|_| KpiError::InvalidNoiseFactor(self.noise_factor))?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records =
            Vec::with_capacity(self.months as usize * self.transactions_per_month as usize);

        let mut period = self.start;
        for month_idx in 0..self.months {
            if month_idx > 0 {
                period = period.next()?;
            }
            let days_in_month = period.last_day()?.day();

            for _ in 0..self.transactions_per_month {
                let day = rng.gen_range(1..=days_in_month);
                let date = NaiveDate::from_ymd_opt(period.year(), period.month(), day)
                    .ok_or_else(|| {
                        KpiError::DateError(format!("day {} does not exist in {}", day, period))
                    })?;

                let amount = self.mean_amount * (1.0 + amount_noise.sample(&mut rng));
                let margin = (self.mean_margin + margin_noise.sample(&mut rng)).clamp(-1.0, 1.0);
                let revenue = amount.abs();
                let expenditure = revenue * (1.0 - margin);
                let net_income = revenue - expenditure;

                records.push(TransactionRecord {
                    date,
                    transaction_amount: amount,
                    cash_flow: net_income * (1.0 + amount_noise.sample(&mut rng)),
                    net_income,
                    revenue,
                    expenditure,
                    transaction_outcome: if flag.sample(&mut rng) { 1.0 } else { 0.0 },
                    profit_margin: margin,
                });
            }
        }

        debug!(
            "Generated {} synthetic transactions over {} months starting {}",
            records.len(),
            self.months,
            self.start
        );
        Ok(records)
    }
}
